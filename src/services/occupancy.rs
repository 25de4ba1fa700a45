// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Simulated gym floor occupancy.
//!
//! There is no sensor behind this: the number is a time-of-day baseline plus
//! random jitter, shown on the site as a rough "how busy is it" hint.

use chrono::{DateTime, Local, Timelike, Utc};
use rand::Rng;
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::time_utils::format_utc_rfc3339;

pub const FLOOR_CAPACITY: u32 = 40;
const BASELINE: u32 = 15;
/// Jitter is drawn from `0..MAX_JITTER`.
const MAX_JITTER: u32 = 8;

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct Occupancy {
    pub current: u32,
    pub capacity: u32,
    pub percentage: u32,
    pub last_updated: String,
}

/// Extra people expected on the floor at `hour` (0-23).
fn rush_bonus(hour: u32) -> u32 {
    match hour {
        6..=8 => 15,
        12..=14 => 10,
        17..=20 => 20,
        _ => 0,
    }
}

/// Deterministic part of the simulation.
pub fn simulate_occupancy(hour: u32, jitter: u32, now: DateTime<Utc>) -> Occupancy {
    let current = (BASELINE + rush_bonus(hour) + jitter).min(FLOOR_CAPACITY);
    let percentage = ((current as f64 / FLOOR_CAPACITY as f64) * 100.0).round() as u32;
    Occupancy {
        current,
        capacity: FLOOR_CAPACITY,
        percentage,
        last_updated: format_utc_rfc3339(now),
    }
}

/// Occupancy for the current local hour.
pub fn current_occupancy() -> Occupancy {
    let hour = Local::now().hour();
    let jitter = rand::thread_rng().gen_range(0..MAX_JITTER);
    simulate_occupancy(hour, jitter, Utc::now())
}
