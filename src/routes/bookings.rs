// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Member routes: create and list bookings, read the profile.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{Booking, UserProfile};
use crate::routes::json_body;
use crate::services::BookingRequest;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Member routes (require a session).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/bookings", get(list_bookings).post(create_booking))
        .route("/profile", get(get_profile))
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CreateBookingResponse {
    pub success: bool,
    pub booking: Booking,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct BookingsResponse {
    pub bookings: Vec<Booking>,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProfileResponse {
    pub profile: UserProfile,
}

/// Book a seat in a schedule slot.
async fn create_booking(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    payload: std::result::Result<Json<BookingRequest>, JsonRejection>,
) -> Result<Json<CreateBookingResponse>> {
    let request = json_body(payload)?;
    let booking = state.bookings.create_booking(&user, &request).await?;

    Ok(Json(CreateBookingResponse {
        success: true,
        booking,
    }))
}

async fn list_bookings(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<BookingsResponse>> {
    let bookings = state.bookings.list_user_bookings(&user.user_id).await?;
    Ok(Json(BookingsResponse { bookings }))
}

async fn get_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ProfileResponse>> {
    let profile = state.bookings.get_profile(&user.user_id).await?;
    Ok(Json(ProfileResponse { profile }))
}
