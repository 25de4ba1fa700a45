// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod booking;
pub mod catalog;
pub mod inquiry;
pub mod schedule;
pub mod user;

pub use booking::{Booking, BookingStatus};
pub use catalog::{ClassLevel, ClassTemplate, Testimonial, Trainer};
pub use inquiry::{ContactSubmission, NewsletterSubscription};
pub use schedule::{EnrichedSlot, ScheduleSlot};
pub use user::{Credential, UserProfile};
