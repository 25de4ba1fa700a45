// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Third Street Gym: class schedule and booking backend for a boxing gym
//!
//! This crate provides the JSON API behind the gym's website (catalog,
//! weekly schedule, bookings, member accounts, contact and newsletter
//! forms) and the client-side portal logic the booking pages run on.

pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::KvStore;
use services::{BookingService, IdentityService, InquiryService, ScheduleRepository};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: KvStore,
    pub schedule: ScheduleRepository,
    pub bookings: BookingService,
    pub identity: IdentityService,
    pub inquiries: InquiryService,
}

impl AppState {
    /// Wire every service to the same store handle.
    pub fn new(config: Config, store: KvStore) -> Self {
        Self {
            schedule: ScheduleRepository::new(store.clone()),
            bookings: BookingService::new(store.clone()),
            identity: IdentityService::new(store.clone(), config.jwt_signing_key.clone()),
            inquiries: InquiryService::new(store.clone()),
            config,
            store,
        }
    }
}
