// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Booking workflow: reserve a seat in a schedule slot and record it.
//!
//! The seat is taken with a version-checked increment on the slot row, so
//! concurrent requests can never push `current_bookings` past capacity.
//! Writes after the seat is taken are undone if a later step fails.

use serde::Deserialize;
use uuid::Uuid;

use crate::db::{keys, KvStore, Versioned};
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Booking, BookingStatus, ScheduleSlot, UserProfile};
use crate::time_utils::{now_rfc3339, parse_iso_date};

/// Attempts at a version-checked write before giving up with `Conflict`.
pub const MAX_CAS_ATTEMPTS: usize = 8;

const MAX_CLASS_TYPE_LEN: usize = 100;

/// Body of `POST /bookings`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    #[serde(default)]
    pub schedule_id: String,
    #[serde(default)]
    pub class_type: String,
    /// Date of the class the member picked in the week grid (YYYY-MM-DD)
    #[serde(default)]
    pub class_date: Option<String>,
}

impl BookingRequest {
    pub fn validate(&self) -> Result<()> {
        if self.schedule_id.trim().is_empty() {
            return Err(AppError::Validation("scheduleId is required".to_string()));
        }
        if self.class_type.chars().count() > MAX_CLASS_TYPE_LEN {
            return Err(AppError::Validation(format!(
                "classType must be at most {} characters",
                MAX_CLASS_TYPE_LEN
            )));
        }
        if let Some(date) = &self.class_date {
            if parse_iso_date(date).is_none() {
                return Err(AppError::Validation(
                    "classDate must be a YYYY-MM-DD date".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Creates bookings and reads member profiles.
#[derive(Clone)]
pub struct BookingService {
    store: KvStore,
}

impl BookingService {
    pub fn new(store: KvStore) -> Self {
        Self { store }
    }

    /// Book one seat in a slot for an authenticated member.
    pub async fn create_booking(&self, user: &AuthUser, request: &BookingRequest) -> Result<Booking> {
        request.validate()?;
        let schedule_id = request.schedule_id.trim();

        self.reserve_seat(schedule_id).await?;

        let booking = Booking {
            id: format!("booking-{}", Uuid::new_v4()),
            user_id: user.user_id.clone(),
            schedule_id: schedule_id.to_string(),
            class_type: request.class_type.clone(),
            class_date: request.class_date.clone(),
            booking_date: now_rfc3339(),
            status: BookingStatus::Confirmed,
        };

        if let Err(e) = self.record_booking(user, &booking).await {
            tracing::error!(
                user_id = %user.user_id,
                slot_id = %schedule_id,
                booking_id = %booking.id,
                error = %e,
                "Failed to record booking, releasing seat"
            );
            self.compensate(&booking).await;
            return Err(e);
        }

        tracing::info!(
            user_id = %user.user_id,
            slot_id = %schedule_id,
            booking_id = %booking.id,
            "Booking confirmed"
        );

        Ok(booking)
    }

    /// Bookings in the member's profile, newest first.
    pub async fn list_user_bookings(&self, user_id: &str) -> Result<Vec<Booking>> {
        let mut bookings = self
            .store
            .get_as::<UserProfile>(&keys::user(user_id))
            .await?
            .map(|profile| profile.bookings)
            .unwrap_or_default();
        bookings.sort_by(|a, b| b.booking_date.cmp(&a.booking_date));
        Ok(bookings)
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<UserProfile> {
        self.store
            .get_as::<UserProfile>(&keys::user(user_id))
            .await?
            .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))
    }

    // ─── Seat Accounting ─────────────────────────────────────────

    async fn load_slot(&self, schedule_id: &str) -> Result<Versioned<ScheduleSlot>> {
        self.store
            .get_versioned_as::<ScheduleSlot>(&keys::slot(schedule_id))
            .await?
            .ok_or_else(|| AppError::NotFound("Schedule slot not found".to_string()))
    }

    /// Increment `current_bookings` unless the slot is full.
    async fn reserve_seat(&self, schedule_id: &str) -> Result<ScheduleSlot> {
        for attempt in 1..=MAX_CAS_ATTEMPTS {
            let Versioned { value: mut slot, version } = self.load_slot(schedule_id).await?;

            if slot.is_full() {
                tracing::info!(
                    slot_id = %schedule_id,
                    current = slot.current_bookings,
                    capacity = slot.max_capacity,
                    "Booking rejected, slot full"
                );
                return Err(AppError::CapacityExceeded(
                    "Class is fully booked".to_string(),
                ));
            }

            slot.current_bookings += 1;
            if self
                .store
                .compare_and_swap_as(&keys::slot(schedule_id), Some(version), &slot)
                .await?
            {
                return Ok(slot);
            }

            tracing::debug!(slot_id = %schedule_id, attempt, "Slot changed underneath, retrying");
        }

        tracing::warn!(slot_id = %schedule_id, "Gave up reserving seat after repeated contention");
        Err(AppError::Conflict(
            "Schedule slot is busy, please try again".to_string(),
        ))
    }

    /// Give back a seat taken by `reserve_seat`.
    async fn release_seat(&self, schedule_id: &str) -> Result<()> {
        for _ in 0..MAX_CAS_ATTEMPTS {
            let Versioned { value: mut slot, version } = self.load_slot(schedule_id).await?;
            slot.current_bookings = slot.current_bookings.saturating_sub(1);
            if self
                .store
                .compare_and_swap_as(&keys::slot(schedule_id), Some(version), &slot)
                .await?
            {
                return Ok(());
            }
        }
        Err(AppError::Conflict(format!(
            "Could not release seat in slot {}",
            schedule_id
        )))
    }

    // ─── Booking Records ─────────────────────────────────────────

    async fn record_booking(&self, user: &AuthUser, booking: &Booking) -> Result<()> {
        self.store
            .set_as(&keys::booking(&booking.id), booking)
            .await?;
        self.append_to_profile(user, booking).await
    }

    /// Append the booking to the member's profile, creating it if needed.
    async fn append_to_profile(&self, user: &AuthUser, booking: &Booking) -> Result<()> {
        let key = keys::user(&user.user_id);

        for _ in 0..MAX_CAS_ATTEMPTS {
            let current = self.store.get_versioned_as::<UserProfile>(&key).await?;
            let (mut profile, expected) = match current {
                Some(Versioned { value, version }) => (value, Some(version)),
                None => {
                    tracing::info!(user_id = %user.user_id, "Creating profile on first booking");
                    (new_profile(user), None)
                }
            };

            profile.bookings.push(booking.clone());
            if self
                .store
                .compare_and_swap_as(&key, expected, &profile)
                .await?
            {
                return Ok(());
            }
        }

        Err(AppError::Conflict(
            "Profile is busy, please try again".to_string(),
        ))
    }

    /// Undo the seat and booking record after a failed write.
    async fn compensate(&self, booking: &Booking) {
        if let Err(e) = self.release_seat(&booking.schedule_id).await {
            tracing::error!(
                slot_id = %booking.schedule_id,
                booking_id = %booking.id,
                error = %e,
                "Failed to release seat"
            );
        }
        if let Err(e) = self.store.delete(&keys::booking(&booking.id)).await {
            tracing::error!(
                booking_id = %booking.id,
                error = %e,
                "Failed to delete orphaned booking record"
            );
        }
    }
}

/// Profile for a member who has none yet.
pub fn new_profile(user: &AuthUser) -> UserProfile {
    UserProfile {
        id: user.user_id.clone(),
        email: user.email.clone(),
        name: user
            .email
            .split('@')
            .next()
            .unwrap_or_default()
            .to_string(),
        member_since: now_rfc3339(),
        membership_type: "trial".to_string(),
        bookings: Vec::new(),
    }
}
