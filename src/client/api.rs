// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP client for the gym API, as used by the booking portal.
//!
//! Read paths retry with doubling delay. Booking writes never retry; the
//! server's error message is surfaced as-is.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::client::ClientConfig;
use crate::error::{AppError, ErrorResponse};
use crate::models::{Booking, ClassTemplate, EnrichedSlot, Testimonial, Trainer, UserProfile};
use crate::routes::auth::SessionResponse;
use crate::routes::bookings::{BookingsResponse, CreateBookingResponse, ProfileResponse};
use crate::routes::catalog::{
    ClassesResponse, ScheduleResponse, TestimonialsResponse, TrainersResponse,
};
use crate::routes::inquiries::SubmissionResponse;

/// Abort contact form submission after this long.
pub const CONTACT_TIMEOUT: Duration = Duration::from_secs(10);

/// Capped retry with doubling delay for read requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry; doubled for each one after
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (0-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        self.initial_delay
            .saturating_mul(2u32.saturating_pow(retry))
    }
}

/// Portal API client.
#[derive(Clone)]
pub struct GymApiClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    access_token: Option<String>,
    retry: RetryPolicy,
    contact_timeout: Duration,
}

impl GymApiClient {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.api_url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            access_token: None,
            retry: RetryPolicy::default(),
            contact_timeout: CONTACT_TIMEOUT,
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_contact_timeout(mut self, timeout: Duration) -> Self {
        self.contact_timeout = timeout;
        self
    }

    pub fn set_access_token(&mut self, token: Option<String>) {
        self.access_token = token;
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn require_token(&self) -> Result<&str, AppError> {
        self.access_token
            .as_deref()
            .ok_or(AppError::Unauthenticated)
    }

    // ─── Catalog (retried) ───────────────────────────────────────

    pub async fn fetch_schedule(&self) -> Result<Vec<EnrichedSlot>, AppError> {
        let body: ScheduleResponse = self.get_with_retry("/schedule").await?;
        Ok(body.schedule)
    }

    pub async fn fetch_trainers(&self) -> Result<Vec<Trainer>, AppError> {
        let body: TrainersResponse = self.get_with_retry("/trainers").await?;
        Ok(body.trainers)
    }

    pub async fn fetch_classes(&self) -> Result<Vec<ClassTemplate>, AppError> {
        let body: ClassesResponse = self.get_with_retry("/classes").await?;
        Ok(body.classes)
    }

    pub async fn fetch_testimonials(&self) -> Result<Vec<Testimonial>, AppError> {
        let body: TestimonialsResponse = self.get_with_retry("/testimonials").await?;
        Ok(body.testimonials)
    }

    // ─── Member Data ─────────────────────────────────────────────

    pub async fn fetch_my_bookings(&self) -> Result<Vec<Booking>, AppError> {
        let token = self.require_token()?;
        let response = self
            .http
            .get(self.url("/bookings"))
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport_error)?;
        let body: BookingsResponse = check_response_json(response).await?;
        Ok(body.bookings)
    }

    pub async fn fetch_profile(&self) -> Result<UserProfile, AppError> {
        let token = self.require_token()?;
        let response = self
            .http
            .get(self.url("/profile"))
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport_error)?;
        let body: ProfileResponse = check_response_json(response).await?;
        Ok(body.profile)
    }

    /// Book a slot. Never retried.
    pub async fn create_booking(
        &self,
        schedule_id: &str,
        class_type: &str,
        class_date: Option<&str>,
    ) -> Result<Booking, AppError> {
        let token = self.require_token()?;
        let body = serde_json::json!({
            "scheduleId": schedule_id,
            "classType": class_type,
            "classDate": class_date,
        });

        let response = self
            .http
            .post(self.url("/bookings"))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;
        let body: CreateBookingResponse = check_response_json(response).await?;
        Ok(body.booking)
    }

    // ─── Forms ───────────────────────────────────────────────────

    /// Send the contact form, giving up after the contact timeout.
    pub async fn submit_contact(
        &self,
        name: &str,
        email: &str,
        phone: Option<&str>,
        message: &str,
    ) -> Result<String, AppError> {
        let body = serde_json::json!({
            "name": name,
            "email": email,
            "phone": phone,
            "message": message,
        });

        let submit = async {
            let response = self
                .http
                .post(self.url("/contact"))
                .json(&body)
                .timeout(self.contact_timeout)
                .send()
                .await
                .map_err(transport_error)?;
            check_response_json::<SubmissionResponse>(response).await
        };

        match submit.await {
            Ok(body) => Ok(body.message),
            Err(AppError::Timeout(_)) => {
                tracing::warn!("Contact form submission timed out");
                Err(AppError::Timeout(
                    "Contact form submission timed out".to_string(),
                ))
            }
            Err(e) => Err(e),
        }
    }

    pub async fn subscribe_newsletter(&self, email: &str) -> Result<String, AppError> {
        let body: SubmissionResponse = self
            .post_json("/newsletter", &serde_json::json!({ "email": email }), false)
            .await?;
        Ok(body.message)
    }

    // ─── Accounts ────────────────────────────────────────────────

    /// Create an account and keep its session token on this client.
    pub async fn signup(&mut self, email: &str, password: &str, name: &str) -> Result<String, AppError> {
        let body = serde_json::json!({ "email": email, "password": password, "name": name });
        let session: SessionResponse = self.post_json("/auth/signup", &body, true).await?;
        self.access_token = Some(session.access_token);
        Ok(session.user_id)
    }

    /// Sign in and keep the session token on this client.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<String, AppError> {
        let body = serde_json::json!({ "email": email, "password": password });
        let session: SessionResponse = self.post_json("/auth/login", &body, true).await?;
        self.access_token = Some(session.access_token);
        Ok(session.user_id)
    }

    pub fn logout(&mut self) {
        self.access_token = None;
    }

    // ─── Plumbing ────────────────────────────────────────────────

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        with_anon_key: bool,
    ) -> Result<T, AppError> {
        let mut request = self.http.post(self.url(path)).json(body);
        if with_anon_key {
            request = request.header(crate::middleware::api_key::API_KEY_HEADER, &self.anon_key);
        }
        let response = request.send().await.map_err(transport_error)?;
        check_response_json(response).await
    }

    /// GET with the retry policy. Transport errors and non-2xx responses
    /// are retried; the last error is returned.
    async fn get_with_retry<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let url = self.url(path);
        let mut retry = 0;

        loop {
            let result = match self.http.get(&url).send().await {
                Ok(response) => check_response_json(response).await,
                Err(e) => Err(transport_error(e)),
            };

            match result {
                Ok(body) => return Ok(body),
                Err(e) if retry < self.retry.max_retries => {
                    let delay = self.retry.delay_for(retry);
                    tracing::warn!(
                        path,
                        retry = retry + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    retry += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn transport_error(e: reqwest::Error) -> AppError {
    if e.is_timeout() {
        AppError::Timeout(format!("Request timed out: {}", e))
    } else {
        AppError::Upstream(format!("Request failed: {}", e))
    }
}

/// Check response status and parse the JSON body.
async fn check_response_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, AppError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        let error = serde_json::from_str::<ErrorResponse>(&body).unwrap_or_else(|_| ErrorResponse {
            error: format!("HTTP {}: {}", status, body),
            code: None,
        });
        return Err(AppError::from_body(status, &error));
    }

    response.json().await.map_err(|e| {
        if e.is_timeout() {
            AppError::Timeout(format!("Request timed out: {}", e))
        } else {
            AppError::Upstream(format!("JSON parse error: {}", e))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_delay_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.delay_for(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
    }

    #[test]
    fn test_base_url_is_normalized() {
        let client = GymApiClient::new(&ClientConfig {
            api_url: "http://localhost:8080/".to_string(),
            anon_key: "anon".to_string(),
        });
        assert_eq!(client.url("/schedule"), "http://localhost:8080/schedule");
        assert!(!client.is_authenticated());
    }
}
