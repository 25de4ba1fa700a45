// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Contact form and newsletter routes.

use crate::error::Result;
use crate::routes::json_body;
use crate::services::{ContactRequest, NewsletterRequest};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/contact", post(submit_contact))
        .route("/newsletter", post(subscribe))
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SubmissionResponse {
    pub success: bool,
    pub message: String,
}

async fn submit_contact(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<ContactRequest>, JsonRejection>,
) -> Result<Json<SubmissionResponse>> {
    let request = json_body(payload)?;
    state.inquiries.submit_contact(&request).await?;
    Ok(Json(SubmissionResponse {
        success: true,
        message: "Contact form submitted".to_string(),
    }))
}

async fn subscribe(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<NewsletterRequest>, JsonRejection>,
) -> Result<Json<SubmissionResponse>> {
    let request = json_body(payload)?;
    state.inquiries.subscribe(&request).await?;
    Ok(Json(SubmissionResponse {
        success: true,
        message: "Subscribed to newsletter".to_string(),
    }))
}
