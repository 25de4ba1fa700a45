// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Booking portal client: API access, week navigation and booking state.

pub mod api;
pub mod portal;
pub mod week;

pub use api::{GymApiClient, RetryPolicy};
pub use portal::{
    BookingAction, BookingConfirmation, LoadHandle, PortalData, SchedulePortal, SlotState,
};
pub use week::{ClassFilter, WeekWindow};

/// Where the portal finds the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    /// Public client key sent on sign-up and login
    pub anon_key: String,
}

impl ClientConfig {
    /// Read `GYM_API_URL` and `PUBLIC_ANON_KEY`.
    ///
    /// Returns `None` when either is missing; the portal then runs without
    /// booking features instead of failing.
    pub fn from_env() -> Option<Self> {
        dotenvy::dotenv().ok();

        let api_url = non_empty_var("GYM_API_URL");
        let anon_key = non_empty_var("PUBLIC_ANON_KEY");
        match (api_url, anon_key) {
            (Some(api_url), Some(anon_key)) => Some(Self { api_url, anon_key }),
            _ => {
                tracing::warn!("GYM_API_URL or PUBLIC_ANON_KEY not set, portal disabled");
                None
            }
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
