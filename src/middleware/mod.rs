// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware modules (authentication, API keys, security headers).

pub mod api_key;
pub mod auth;
pub mod security;

pub use api_key::{require_anon_key, require_service_key};
pub use auth::require_auth;
