// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Contact form submissions and newsletter sign-ups.

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::db::{keys, KvStore};
use crate::error::Result;
use crate::models::{ContactSubmission, NewsletterSubscription};
use crate::services::identity::validation_error;
use crate::time_utils::now_rfc3339;

/// Body of `POST /contact`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ContactRequest {
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Valid email required"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 40, message = "Phone number is too long"))]
    pub phone: Option<String>,
    #[serde(default)]
    #[validate(length(max = 200, message = "Subject is too long"))]
    pub subject: Option<String>,
    #[validate(length(min = 1, max = 5000, message = "Message must be 1 to 5000 characters"))]
    pub message: String,
}

/// Body of `POST /newsletter`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewsletterRequest {
    #[validate(email(message = "Valid email required"))]
    pub email: String,
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[derive(Clone)]
pub struct InquiryService {
    store: KvStore,
}

impl InquiryService {
    pub fn new(store: KvStore) -> Self {
        Self { store }
    }

    /// Store a contact form submission with status "new".
    pub async fn submit_contact(&self, request: &ContactRequest) -> Result<ContactSubmission> {
        request.validate().map_err(validation_error)?;

        let submission = ContactSubmission {
            id: format!("contact-{}", Uuid::new_v4()),
            name: request.name.trim().to_string(),
            email: request.email.trim().to_string(),
            phone: non_empty(&request.phone),
            subject: non_empty(&request.subject),
            message: request.message.clone(),
            submitted_at: now_rfc3339(),
            status: "new".to_string(),
        };

        self.store
            .set_as(&keys::contact(&submission.id), &submission)
            .await?;
        tracing::info!(contact_id = %submission.id, "Contact form submitted");

        Ok(submission)
    }

    /// Subscribe an email. Subscribing again refreshes the existing row.
    pub async fn subscribe(&self, request: &NewsletterRequest) -> Result<NewsletterSubscription> {
        request.validate().map_err(validation_error)?;

        let subscription = NewsletterSubscription {
            email: request.email.trim().to_lowercase(),
            subscribed_at: now_rfc3339(),
            active: true,
        };

        self.store
            .set_as(&keys::newsletter(&subscription.email), &subscription)
            .await?;
        tracing::info!("Newsletter subscription added");

        Ok(subscription)
    }
}
