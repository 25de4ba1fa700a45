// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod booking;
pub mod identity;
pub mod inquiries;
pub mod occupancy;
pub mod schedule;
pub mod seed;

pub use booking::{BookingRequest, BookingService};
pub use identity::{IdentityService, LoginRequest, Session, SignupRequest};
pub use inquiries::{ContactRequest, InquiryService, NewsletterRequest};
pub use occupancy::Occupancy;
pub use schedule::{ScheduleRepository, SeedReport};
