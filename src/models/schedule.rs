// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Weekly schedule slots and their enriched API view.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::ClassLevel;

/// A single weekly occurrence of a class template with its own capacity counter.
///
/// Stored one row per slot at `slot:<id>`. Only the booking workflow
/// changes `current_bookings`, and it never moves it past `max_capacity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSlot {
    /// Slot ID, e.g. "mon-6am-beginner"
    pub id: String,
    #[serde(alias = "classId")]
    pub class_template_id: String,
    /// Weekday name ("Monday")
    pub day: String,
    /// Start time, "HH:MM" 24h
    pub time: String,
    #[serde(alias = "duration")]
    pub duration_minutes: u32,
    #[serde(alias = "instructor")]
    pub instructor_id: String,
    pub current_bookings: u32,
    pub max_capacity: u32,
}

impl ScheduleSlot {
    /// Seats still open. Derived, never stored.
    pub fn spots_available(&self) -> u32 {
        self.max_capacity.saturating_sub(self.current_bookings)
    }

    pub fn is_full(&self) -> bool {
        self.current_bookings >= self.max_capacity
    }
}

/// Schedule slot joined with its class template and trainer display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedSlot {
    #[serde(flatten)]
    pub slot: ScheduleSlot,
    pub class_name: String,
    pub class_level: ClassLevel,
    pub trainer_name: String,
    pub spots_available: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(current: u32, max: u32) -> ScheduleSlot {
        ScheduleSlot {
            id: "mon-6am-beginner".to_string(),
            class_template_id: "beginner-fog-cutter".to_string(),
            day: "Monday".to_string(),
            time: "06:00".to_string(),
            duration_minutes: 60,
            instructor_id: "maria-gonzalez".to_string(),
            current_bookings: current,
            max_capacity: max,
        }
    }

    #[test]
    fn test_spots_available() {
        assert_eq!(slot(8, 20).spots_available(), 12);
        assert_eq!(slot(15, 15).spots_available(), 0);
        assert!(slot(15, 15).is_full());
        assert!(!slot(14, 15).is_full());
    }

    #[test]
    fn test_enriched_slot_flattens_fields() {
        let enriched = EnrichedSlot {
            slot: slot(8, 20),
            class_name: "Beginner (Fog Cutter)".to_string(),
            class_level: ClassLevel::Beginner,
            trainer_name: "Maria".to_string(),
            spots_available: 12,
        };

        let json = serde_json::to_value(&enriched).unwrap();
        assert_eq!(json["id"], "mon-6am-beginner");
        assert_eq!(json["currentBookings"], 8);
        assert_eq!(json["classLevel"], "beginner");
        assert_eq!(json["spotsAvailable"], 12);
    }
}
