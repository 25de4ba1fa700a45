// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Public catalog routes: classes, trainers, testimonials, schedule, occupancy.

use crate::error::Result;
use crate::models::{ClassTemplate, EnrichedSlot, Testimonial, Trainer};
use crate::services::occupancy::{current_occupancy, Occupancy};
use crate::AppState;
use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/classes", get(get_classes))
        .route("/trainers", get(get_trainers))
        .route("/testimonials", get(get_testimonials))
        .route("/schedule", get(get_schedule))
        .route("/occupancy", get(get_occupancy))
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ClassesResponse {
    pub classes: Vec<ClassTemplate>,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TrainersResponse {
    pub trainers: Vec<Trainer>,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TestimonialsResponse {
    pub testimonials: Vec<Testimonial>,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ScheduleResponse {
    pub schedule: Vec<EnrichedSlot>,
}

async fn get_classes(State(state): State<Arc<AppState>>) -> Result<Json<ClassesResponse>> {
    let classes = state.schedule.list_classes().await?;
    Ok(Json(ClassesResponse { classes }))
}

async fn get_trainers(State(state): State<Arc<AppState>>) -> Result<Json<TrainersResponse>> {
    let trainers = state.schedule.list_trainers().await?;
    Ok(Json(TrainersResponse { trainers }))
}

async fn get_testimonials(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TestimonialsResponse>> {
    let testimonials = state.schedule.list_testimonials().await?;
    Ok(Json(TestimonialsResponse { testimonials }))
}

/// Weekly schedule with class and trainer names resolved.
async fn get_schedule(State(state): State<Arc<AppState>>) -> Result<Json<ScheduleResponse>> {
    let schedule = state.schedule.get_enriched_schedule().await?;
    Ok(Json(ScheduleResponse { schedule }))
}

async fn get_occupancy() -> Json<Occupancy> {
    Json(current_occupancy())
}
