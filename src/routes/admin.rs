// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin routes, gated by the service role key.

use crate::error::Result;
use crate::middleware::api_key::require_service_key;
use crate::AppState;
use axum::{
    extract::{Query, State},
    middleware,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub fn routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/init", post(init_data))
        .route_layer(middleware::from_fn_with_state(state, require_service_key))
}

#[derive(Deserialize)]
struct InitParams {
    /// Overwrite existing catalog data and reset slot counters
    #[serde(default)]
    force: bool,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitResponse {
    pub success: bool,
    pub message: String,
    pub catalog_written: bool,
    pub slots_written: usize,
    pub slots_migrated: usize,
}

/// Seed the catalog and weekly schedule.
async fn init_data(
    State(state): State<Arc<AppState>>,
    Query(params): Query<InitParams>,
) -> Result<Json<InitResponse>> {
    tracing::info!(force = params.force, "Admin data initialization requested");
    let report = state.schedule.seed(params.force).await?;

    Ok(Json(InitResponse {
        success: true,
        message: "Data initialized successfully".to_string(),
        catalog_written: report.catalog_written,
        slots_written: report.slots_written,
        slots_migrated: report.slots_migrated,
    }))
}
