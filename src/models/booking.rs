// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Booking records.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

/// A confirmed seat in a schedule slot.
///
/// Stored at `booking:<id>` and copied into the owner's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub user_id: String,
    pub schedule_id: String,
    pub class_type: String,
    /// Calendar date of the class (YYYY-MM-DD), when the client supplied one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_date: Option<String>,
    /// When the booking was made (RFC3339)
    pub booking_date: String,
    pub status: BookingStatus,
}

impl Booking {
    /// Date this booking applies to: the class date, else the booking day.
    pub fn effective_date(&self) -> &str {
        match &self.class_date {
            Some(date) => date.as_str(),
            None => self
                .booking_date
                .split('T')
                .next()
                .unwrap_or(&self.booking_date),
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == BookingStatus::Confirmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_date_prefers_class_date() {
        let mut booking = Booking {
            id: "booking-1".to_string(),
            user_id: "u1".to_string(),
            schedule_id: "mon-6am-beginner".to_string(),
            class_type: "Beginner".to_string(),
            class_date: Some("2026-10-19".to_string()),
            booking_date: "2026-10-12T08:00:00Z".to_string(),
            status: BookingStatus::Confirmed,
        };
        assert_eq!(booking.effective_date(), "2026-10-19");

        booking.class_date = None;
        assert_eq!(booking.effective_date(), "2026-10-12");
    }
}
