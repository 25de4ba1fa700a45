// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Week grid navigation and the class-level filter.

use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::models::ClassLevel;

/// The 7-day window (Sunday to Saturday) containing an anchor date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekWindow {
    anchor: NaiveDate,
}

impl WeekWindow {
    pub fn new(anchor: NaiveDate) -> Self {
        Self { anchor }
    }

    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    /// Sunday of the anchor's week.
    pub fn start(&self) -> NaiveDate {
        let offset = self.anchor.weekday().num_days_from_sunday();
        self.anchor - Days::new(offset as u64)
    }

    /// The seven dates shown in the grid, Sunday first.
    pub fn days(&self) -> [NaiveDate; 7] {
        let start = self.start();
        std::array::from_fn(|i| start + Days::new(i as u64))
    }

    /// Date in this window that falls on `weekday`.
    pub fn date_of(&self, weekday: Weekday) -> NaiveDate {
        self.start() + Days::new(weekday.num_days_from_sunday() as u64)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        let start = self.start();
        date >= start && date < start + Days::new(7)
    }

    pub fn next(&self) -> Self {
        Self::new(self.anchor + Days::new(7))
    }

    pub fn prev(&self) -> Self {
        Self::new(self.anchor - Days::new(7))
    }
}

/// Class-level filter shown above the schedule grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassFilter {
    #[default]
    All,
    Beginner,
    Intermediate,
    Advanced,
    Youth,
    Sparring,
    Bootcamp,
}

impl ClassFilter {
    pub const ALL: [ClassFilter; 7] = [
        ClassFilter::All,
        ClassFilter::Beginner,
        ClassFilter::Intermediate,
        ClassFilter::Advanced,
        ClassFilter::Youth,
        ClassFilter::Sparring,
        ClassFilter::Bootcamp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassFilter::All => "all",
            ClassFilter::Beginner => "beginner",
            ClassFilter::Intermediate => "intermediate",
            ClassFilter::Advanced => "advanced",
            ClassFilter::Youth => "youth",
            ClassFilter::Sparring => "sparring",
            ClassFilter::Bootcamp => "bootcamp",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|f| f.as_str() == raw)
    }

    /// Whether a class at `level` passes this filter.
    pub fn matches(&self, level: ClassLevel) -> bool {
        match self {
            ClassFilter::All => true,
            ClassFilter::Beginner => level == ClassLevel::Beginner,
            ClassFilter::Intermediate => level == ClassLevel::Intermediate,
            ClassFilter::Advanced => level == ClassLevel::Advanced,
            ClassFilter::Youth => level == ClassLevel::Youth,
            ClassFilter::Sparring => level == ClassLevel::Sparring,
            ClassFilter::Bootcamp => level == ClassLevel::Bootcamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_window_starts_on_sunday() {
        // 2026-10-21 is a Wednesday
        let week = WeekWindow::new(date(2026, 10, 21));
        assert_eq!(week.start(), date(2026, 10, 18));
        assert_eq!(week.days()[6], date(2026, 10, 24));
        assert_eq!(week.date_of(Weekday::Mon), date(2026, 10, 19));
        assert!(week.contains(date(2026, 10, 24)));
        assert!(!week.contains(date(2026, 10, 25)));
    }

    #[test]
    fn test_sunday_anchor_is_its_own_start() {
        let week = WeekWindow::new(date(2026, 10, 18));
        assert_eq!(week.start(), date(2026, 10, 18));
    }

    #[test]
    fn test_navigation_moves_seven_days() {
        let week = WeekWindow::new(date(2026, 12, 30));
        assert_eq!(week.next().anchor(), date(2027, 1, 6));
        assert_eq!(week.next().start(), week.start() + Days::new(7));
        assert_eq!(week.prev().start(), week.start() - Days::new(7));
        assert_eq!(week.next().prev(), week);
    }

    #[test]
    fn test_filter_parse_and_match() {
        assert_eq!(ClassFilter::parse("Sparring"), Some(ClassFilter::Sparring));
        assert_eq!(ClassFilter::parse("kickboxing"), None);
        assert!(ClassFilter::All.matches(ClassLevel::Unknown));
        assert!(ClassFilter::Beginner.matches(ClassLevel::Beginner));
        assert!(!ClassFilter::Beginner.matches(ClassLevel::Advanced));
    }
}
