// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Booking portal state: the week grid, per-slot booking state, and the
//! fetches that feed them.

use std::collections::HashMap;

use chrono::{NaiveDate, Weekday};
use tokio::task::JoinHandle;

use crate::client::api::GymApiClient;
use crate::client::week::{ClassFilter, WeekWindow};
use crate::error::AppError;
use crate::models::{Booking, EnrichedSlot};
use crate::time_utils::parse_weekday;

/// Booking state of one slot on one date, as the grid shows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Available,
    Pending,
    Booked,
}

/// What the confirmation step shows before a booking is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingConfirmation {
    pub slot_id: String,
    pub class_name: String,
    pub date: NaiveDate,
    pub time: String,
    pub instructor: String,
    pub duration_minutes: u32,
}

/// Result of pressing "Book" on a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingAction {
    /// No session; show the sign-in dialog instead.
    SignInRequired,
    Confirm(BookingConfirmation),
}

/// Outcome of fetching the schedule and the member's bookings together.
#[derive(Debug)]
pub struct PortalData {
    pub schedule: Result<Vec<EnrichedSlot>, AppError>,
    pub bookings: Result<Vec<Booking>, AppError>,
}

/// Fetch schedule and bookings concurrently; both settle before returning.
pub async fn fetch_portal_data(client: &GymApiClient) -> PortalData {
    let bookings = async {
        if client.is_authenticated() {
            client.fetch_my_bookings().await
        } else {
            Ok(Vec::new())
        }
    };
    let (schedule, bookings) = tokio::join!(client.fetch_schedule(), bookings);
    PortalData { schedule, bookings }
}

/// Background portal fetch. Dropping the handle aborts the fetch.
pub struct LoadHandle {
    task: Option<JoinHandle<PortalData>>,
}

impl LoadHandle {
    /// Wait for the fetch to settle.
    pub async fn finish(mut self) -> Result<PortalData, AppError> {
        let Some(task) = self.task.take() else {
            return Err(AppError::Internal(anyhow::anyhow!("Load already finished")));
        };
        task.await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Portal fetch task failed: {}", e)))
    }
}

impl Drop for LoadHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

type SlotKey = (String, NaiveDate);

/// Client-side state behind the schedule page.
pub struct SchedulePortal {
    client: GymApiClient,
    week: WeekWindow,
    filter: ClassFilter,
    schedule: Vec<EnrichedSlot>,
    bookings: Vec<Booking>,
    pending: HashMap<SlotKey, SlotState>,
    slot_errors: HashMap<SlotKey, String>,
    banner: Option<String>,
}

impl SchedulePortal {
    pub fn new(client: GymApiClient, anchor: NaiveDate) -> Self {
        Self {
            client,
            week: WeekWindow::new(anchor),
            filter: ClassFilter::All,
            schedule: Vec::new(),
            bookings: Vec::new(),
            pending: HashMap::new(),
            slot_errors: HashMap::new(),
            banner: None,
        }
    }

    pub fn client(&self) -> &GymApiClient {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut GymApiClient {
        &mut self.client
    }

    pub fn week(&self) -> WeekWindow {
        self.week
    }

    pub fn filter(&self) -> ClassFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: ClassFilter) {
        self.filter = filter;
    }

    pub fn next_week(&mut self) {
        self.week = self.week.next();
    }

    pub fn prev_week(&mut self) {
        self.week = self.week.prev();
    }

    pub fn schedule(&self) -> &[EnrichedSlot] {
        &self.schedule
    }

    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    /// Error to show above the grid after a failed fetch.
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    // ─── Loading ─────────────────────────────────────────────────

    /// Fetch schedule and bookings, then apply whatever succeeded.
    pub async fn load(&mut self) -> Result<(), AppError> {
        let data = fetch_portal_data(&self.client).await;
        self.apply(data)
    }

    /// Start a fetch in the background. Drop the handle to cancel it.
    pub fn spawn_load(&self) -> LoadHandle {
        let client = self.client.clone();
        LoadHandle {
            task: Some(tokio::spawn(async move { fetch_portal_data(&client).await })),
        }
    }

    /// Apply fetched data. A failed half leaves the previous data in place
    /// and sets the banner; the first error is returned.
    pub fn apply(&mut self, data: PortalData) -> Result<(), AppError> {
        let mut first_error = None;

        match data.schedule {
            Ok(schedule) => self.schedule = schedule,
            Err(e) => {
                tracing::warn!(error = %e, "Schedule fetch failed");
                self.banner = Some(format!("Could not load the schedule: {}", e));
                first_error = Some(e);
            }
        }

        match data.bookings {
            Ok(bookings) => self.bookings = bookings,
            Err(e) => {
                tracing::warn!(error = %e, "Bookings fetch failed");
                if first_error.is_none() {
                    self.banner = Some(format!("Could not load your bookings: {}", e));
                    first_error = Some(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                self.banner = None;
                Ok(())
            }
        }
    }

    // ─── Grid ────────────────────────────────────────────────────

    /// Slots on `weekday` that pass the filter, by start time.
    pub fn slots_for_day(&self, weekday: Weekday) -> Vec<&EnrichedSlot> {
        let mut slots: Vec<&EnrichedSlot> = self
            .schedule
            .iter()
            .filter(|s| parse_weekday(&s.slot.day) == Some(weekday))
            .filter(|s| self.filter.matches(s.class_level))
            .collect();
        slots.sort_by(|a, b| a.slot.time.cmp(&b.slot.time));
        slots
    }

    /// Whether the member holds a confirmed booking for this slot on `date`.
    pub fn is_booked(&self, slot_id: &str, date: NaiveDate) -> bool {
        let date = date.format("%Y-%m-%d").to_string();
        self.bookings
            .iter()
            .any(|b| b.schedule_id == slot_id && b.effective_date() == date && b.is_confirmed())
    }

    pub fn slot_state(&self, slot_id: &str, date: NaiveDate) -> SlotState {
        if self.is_booked(slot_id, date) {
            return SlotState::Booked;
        }
        self.pending
            .get(&(slot_id.to_string(), date))
            .copied()
            .unwrap_or(SlotState::Available)
    }

    /// Message from the last failed booking attempt on this slot and date.
    pub fn slot_error(&self, slot_id: &str, date: NaiveDate) -> Option<&str> {
        self.slot_errors
            .get(&(slot_id.to_string(), date))
            .map(String::as_str)
    }

    // ─── Booking ─────────────────────────────────────────────────

    pub fn request_booking(&self, slot: &EnrichedSlot, date: NaiveDate) -> BookingAction {
        if !self.client.is_authenticated() {
            return BookingAction::SignInRequired;
        }
        BookingAction::Confirm(BookingConfirmation {
            slot_id: slot.slot.id.clone(),
            class_name: slot.class_name.clone(),
            date,
            time: slot.slot.time.clone(),
            instructor: slot.trainer_name.clone(),
            duration_minutes: slot.slot.duration_minutes,
        })
    }

    /// Send a confirmed booking. On success the schedule and bookings are
    /// refetched; on failure the slot goes back to available with the error.
    pub async fn confirm_booking(
        &mut self,
        confirmation: &BookingConfirmation,
    ) -> Result<Booking, AppError> {
        let key = self.begin_booking(confirmation);

        let date = confirmation.date.format("%Y-%m-%d").to_string();
        let result = self
            .client
            .create_booking(&confirmation.slot_id, &confirmation.class_name, Some(&date))
            .await;
        self.settle_booking(key, &result);

        if result.is_ok() {
            if let Err(e) = self.load().await {
                tracing::warn!(error = %e, "Refetch after booking failed");
            }
        }
        result
    }

    /// Available -> Pending.
    fn begin_booking(&mut self, confirmation: &BookingConfirmation) -> SlotKey {
        let key = (confirmation.slot_id.clone(), confirmation.date);
        self.slot_errors.remove(&key);
        self.pending.insert(key.clone(), SlotState::Pending);
        key
    }

    /// Pending -> Booked on success, Pending -> Available with the error otherwise.
    fn settle_booking(&mut self, key: SlotKey, result: &Result<Booking, AppError>) {
        self.pending.remove(&key);
        match result {
            // Keep the grid correct even if the refetch fails.
            Ok(booking) => self.bookings.push(booking.clone()),
            Err(e) => {
                self.slot_errors.insert(key, e.to_string());
            }
        }
    }
}
