// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Member sign-up and login.
//!
//! Credentials live at `auth:<email>` as PBKDF2-HMAC-SHA256 hashes with a
//! random per-user salt. A successful login yields a session JWT.

use std::num::NonZeroU32;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::db::{keys, KvStore};
use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, AuthUser};
use crate::models::{Credential, UserProfile};
use crate::time_utils::now_rfc3339;

const PBKDF2_ITERATIONS: u32 = 100_000;
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;

/// Body of `POST /auth/signup`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(email(message = "Valid email required"))]
    pub email: String,
    #[validate(length(min = 6, max = 128, message = "Password must be 6 to 128 characters"))]
    pub password: String,
    #[serde(default)]
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: String,
}

/// Body of `POST /auth/login`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Valid email required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password required"))]
    pub password: String,
}

/// A signed-in member and their session token.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: AuthUser,
    pub access_token: String,
}

/// Turn `validator` errors into a single validation message.
pub fn validation_error(errors: validator::ValidationErrors) -> AppError {
    let message = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid {}", field))
            })
        })
        .next()
        .unwrap_or_else(|| "Invalid request".to_string());
    AppError::Validation(message)
}

fn iterations(raw: u32) -> Result<NonZeroU32> {
    NonZeroU32::new(raw)
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("PBKDF2 iterations must be non-zero")))
}

/// Account creation and password login.
#[derive(Clone)]
pub struct IdentityService {
    store: KvStore,
    jwt_signing_key: Vec<u8>,
    rng: SystemRandom,
}

impl IdentityService {
    pub fn new(store: KvStore, jwt_signing_key: Vec<u8>) -> Self {
        Self {
            store,
            jwt_signing_key,
            rng: SystemRandom::new(),
        }
    }

    /// Create a credential and a trial profile, then sign the member in.
    pub async fn signup(&self, request: &SignupRequest) -> Result<Session> {
        request.validate().map_err(validation_error)?;
        let email = request.email.trim().to_lowercase();

        let mut salt = [0u8; SALT_LEN];
        self.rng
            .fill(&mut salt)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("Failed to generate salt")))?;

        let mut hash = [0u8; HASH_LEN];
        pbkdf2::derive(
            pbkdf2::PBKDF2_HMAC_SHA256,
            iterations(PBKDF2_ITERATIONS)?,
            &salt,
            request.password.as_bytes(),
            &mut hash,
        );

        let user_id = Uuid::new_v4().to_string();
        let now = now_rfc3339();
        let credential = Credential {
            user_id: user_id.clone(),
            email: email.clone(),
            salt: STANDARD.encode(salt),
            password_hash: STANDARD.encode(hash),
            iterations: PBKDF2_ITERATIONS,
            created_at: now.clone(),
        };

        // Claiming the credential key first makes duplicate sign-ups lose cleanly.
        if !self
            .store
            .compare_and_swap_as(&keys::credential(&email), None, &credential)
            .await?
        {
            return Err(AppError::Conflict(
                "An account with this email already exists".to_string(),
            ));
        }

        let profile = UserProfile {
            id: user_id.clone(),
            email: email.clone(),
            name: request.name.trim().to_string(),
            member_since: now,
            membership_type: "trial".to_string(),
            bookings: Vec::new(),
        };
        if let Err(e) = self.store.set_as(&keys::user(&user_id), &profile).await {
            if let Err(cleanup) = self.store.delete(&keys::credential(&email)).await {
                tracing::error!(error = %cleanup, "Failed to remove credential after profile write failure");
            }
            return Err(e);
        }

        tracing::info!(user_id = %user_id, "Member signed up");
        self.issue_session(user_id, email)
    }

    /// Check a password and issue a session token.
    pub async fn login(&self, request: &LoginRequest) -> Result<Session> {
        request.validate().map_err(validation_error)?;
        let email = request.email.trim().to_lowercase();

        let Some(credential) = self
            .store
            .get_as::<Credential>(&keys::credential(&email))
            .await?
        else {
            tracing::info!("Login for unknown email");
            return Err(AppError::Unauthenticated);
        };

        let salt = STANDARD
            .decode(&credential.salt)
            .map_err(|e| AppError::Database(format!("Corrupt credential salt: {}", e)))?;
        let hash = STANDARD
            .decode(&credential.password_hash)
            .map_err(|e| AppError::Database(format!("Corrupt credential hash: {}", e)))?;

        pbkdf2::verify(
            pbkdf2::PBKDF2_HMAC_SHA256,
            iterations(credential.iterations)?,
            &salt,
            request.password.as_bytes(),
            &hash,
        )
        .map_err(|_| {
            tracing::info!(user_id = %credential.user_id, "Login with wrong password");
            AppError::Unauthenticated
        })?;

        tracing::info!(user_id = %credential.user_id, "Member logged in");
        self.issue_session(credential.user_id, credential.email)
    }

    fn issue_session(&self, user_id: String, email: String) -> Result<Session> {
        let access_token = create_jwt(&user_id, &email, &self.jwt_signing_key)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;
        Ok(Session {
            user: AuthUser { user_id, email },
            access_token,
        })
    }
}
