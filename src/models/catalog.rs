// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Static catalog entries: class templates, trainers and testimonials.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Skill level / program a class template belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum ClassLevel {
    Beginner,
    Intermediate,
    Advanced,
    Youth,
    Sparring,
    Bootcamp,
    /// Level of a slot whose class template is missing.
    #[serde(other)]
    Unknown,
}

impl ClassLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassLevel::Beginner => "beginner",
            ClassLevel::Intermediate => "intermediate",
            ClassLevel::Advanced => "advanced",
            ClassLevel::Youth => "youth",
            ClassLevel::Sparring => "sparring",
            ClassLevel::Bootcamp => "bootcamp",
            ClassLevel::Unknown => "unknown",
        }
    }

    /// Parse a level name; anything unrecognized maps to `Unknown`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "beginner" => ClassLevel::Beginner,
            "intermediate" => ClassLevel::Intermediate,
            "advanced" => ClassLevel::Advanced,
            "youth" => ClassLevel::Youth,
            "sparring" => ClassLevel::Sparring,
            "bootcamp" => ClassLevel::Bootcamp,
            _ => ClassLevel::Unknown,
        }
    }
}

impl std::fmt::Display for ClassLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reusable definition of a class type, instantiated by schedule slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct ClassTemplate {
    pub id: String,
    pub name: String,
    pub description: String,
    pub level: ClassLevel,
    #[serde(alias = "duration")]
    pub duration_minutes: u32,
    pub max_capacity: u32,
    /// Drop-in price in dollars
    pub price: u32,
    /// Trainer id of the lead instructor
    #[serde(alias = "instructor")]
    pub instructor_id: String,
}

/// Trainer profile shown on the classes and personal-training pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct Trainer {
    pub id: String,
    pub name: String,
    pub bio: String,
    #[serde(default)]
    pub specialties: Vec<String>,
    /// Human readable experience, e.g. "8 years"
    #[serde(alias = "experience")]
    pub experience_label: String,
    pub hourly_rate: u32,
    /// Weekday names the trainer works
    #[serde(default)]
    pub availability: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    pub id: String,
    pub name: String,
    pub location: String,
    pub quote: String,
    pub rating: u8,
    pub program: String,
}
