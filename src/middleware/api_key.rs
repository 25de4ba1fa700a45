// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API key gates for the public client key and the service role key.
//!
//! Keys are compared in constant time.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Header carrying the public or service key.
pub const API_KEY_HEADER: &str = "apikey";

fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Key from the `apikey` header, else a bearer token.
fn provided_key(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .or_else(|| {
            headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.strip_prefix("Bearer "))
        })
}

fn check_key(headers: &HeaderMap, expected: &str, gate: &'static str) -> Result<(), AppError> {
    match provided_key(headers) {
        Some(key) if constant_time_compare(key, expected) => Ok(()),
        Some(_) => {
            tracing::warn!(gate, "Rejected request with wrong API key");
            Err(AppError::Forbidden)
        }
        None => Err(AppError::Unauthenticated),
    }
}

/// Require the public client key (sign-up and login).
pub async fn require_anon_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    check_key(request.headers(), &state.config.public_anon_key, "anon")?;
    Ok(next.run(request).await)
}

/// Require the privileged service role key (admin routes).
pub async fn require_service_key(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    check_key(request.headers(), &state.config.service_role_key, "service")?;
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("anon-123", "anon-123"));
        assert!(!constant_time_compare("anon-123", "anon-124"));
        assert!(!constant_time_compare("short", "much-longer-key"));
    }

    #[test]
    fn test_check_key_outcomes() {
        let mut headers = HeaderMap::new();
        assert!(matches!(
            check_key(&headers, "k", "anon"),
            Err(AppError::Unauthenticated)
        ));

        headers.insert(API_KEY_HEADER, HeaderValue::from_static("wrong"));
        assert!(matches!(
            check_key(&headers, "k", "anon"),
            Err(AppError::Forbidden)
        ));

        headers.insert(API_KEY_HEADER, HeaderValue::from_static("k"));
        assert!(check_key(&headers, "k", "anon").is_ok());
    }

    #[test]
    fn test_bearer_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer svc"));
        assert!(check_key(&headers, "svc", "service").is_ok());
    }
}
