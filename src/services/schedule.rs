// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Schedule repository: catalog collections, per-row schedule slots and the
//! enriched schedule view.

use std::collections::HashMap;

use crate::db::{keys, KvStore};
use crate::error::{AppError, Result};
use crate::models::{ClassLevel, ClassTemplate, EnrichedSlot, ScheduleSlot, Testimonial, Trainer};
use crate::services::seed;
use crate::time_utils::{is_valid_hhmm, parse_weekday, weekday_order};

pub const UNKNOWN_CLASS: &str = "Unknown Class";
pub const UNKNOWN_TRAINER: &str = "Unknown Trainer";

/// Join slots with their class template and trainer.
///
/// Lookups go through id-keyed maps. A dangling reference keeps the slot
/// and gets the sentinel label instead of failing the whole view.
pub fn enrich_slots(
    slots: Vec<ScheduleSlot>,
    classes: &[ClassTemplate],
    trainers: &[Trainer],
) -> Vec<EnrichedSlot> {
    let classes_by_id: HashMap<&str, &ClassTemplate> =
        classes.iter().map(|c| (c.id.as_str(), c)).collect();
    let trainers_by_id: HashMap<&str, &Trainer> =
        trainers.iter().map(|t| (t.id.as_str(), t)).collect();

    slots
        .into_iter()
        .map(|slot| {
            let class = classes_by_id.get(slot.class_template_id.as_str());
            let trainer = trainers_by_id.get(slot.instructor_id.as_str());
            EnrichedSlot {
                class_name: class
                    .map(|c| c.name.clone())
                    .unwrap_or_else(|| UNKNOWN_CLASS.to_string()),
                class_level: class.map(|c| c.level).unwrap_or(ClassLevel::Unknown),
                trainer_name: trainer
                    .map(|t| t.name.clone())
                    .unwrap_or_else(|| UNKNOWN_TRAINER.to_string()),
                spots_available: slot.spots_available(),
                slot,
            }
        })
        .collect()
}

/// Sunday-first weekday, then start time.
fn sort_slots(slots: &mut [ScheduleSlot]) {
    slots.sort_by(|a, b| {
        weekday_order(&a.day)
            .cmp(&weekday_order(&b.day))
            .then_with(|| a.time.cmp(&b.time))
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Check a slot before it is written.
pub fn validate_slot(slot: &ScheduleSlot) -> Result<()> {
    if slot.id.trim().is_empty() {
        return Err(AppError::Validation("Slot id must not be empty".to_string()));
    }
    if parse_weekday(&slot.day).is_none() {
        return Err(AppError::Validation(format!(
            "Invalid weekday '{}' for slot {}",
            slot.day, slot.id
        )));
    }
    if !is_valid_hhmm(&slot.time) {
        return Err(AppError::Validation(format!(
            "Invalid time '{}' for slot {}: expected HH:MM",
            slot.time, slot.id
        )));
    }
    if slot.current_bookings > slot.max_capacity {
        return Err(AppError::Validation(format!(
            "Slot {} has {} bookings but capacity {}",
            slot.id, slot.current_bookings, slot.max_capacity
        )));
    }
    Ok(())
}

/// Outcome of a seeding run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Catalog collections written
    pub catalog_written: bool,
    /// Slots created (existing slots are never overwritten unless forced)
    pub slots_written: usize,
    /// Slots moved from the legacy whole-array `schedule` blob
    pub slots_migrated: usize,
}

/// Read/write access to the class catalog and schedule slots.
#[derive(Clone)]
pub struct ScheduleRepository {
    store: KvStore,
}

impl ScheduleRepository {
    pub fn new(store: KvStore) -> Self {
        Self { store }
    }

    // ─── Catalog Collections ─────────────────────────────────────

    pub async fn list_classes(&self) -> Result<Vec<ClassTemplate>> {
        Ok(self
            .store
            .get_as::<Vec<ClassTemplate>>(keys::CLASSES)
            .await?
            .unwrap_or_default())
    }

    pub async fn list_trainers(&self) -> Result<Vec<Trainer>> {
        Ok(self
            .store
            .get_as::<Vec<Trainer>>(keys::TRAINERS)
            .await?
            .unwrap_or_default())
    }

    pub async fn list_testimonials(&self) -> Result<Vec<Testimonial>> {
        Ok(self
            .store
            .get_as::<Vec<Testimonial>>(keys::TESTIMONIALS)
            .await?
            .unwrap_or_default())
    }

    // ─── Schedule Slots ──────────────────────────────────────────

    /// All slots, Sunday-first then by start time.
    pub async fn list_slots(&self) -> Result<Vec<ScheduleSlot>> {
        let mut slots: Vec<ScheduleSlot> = self
            .store
            .scan_prefix_as::<ScheduleSlot>(keys::SLOT_PREFIX)
            .await?
            .into_iter()
            .map(|row| row.value)
            .collect();
        sort_slots(&mut slots);
        Ok(slots)
    }

    pub async fn get_slot(&self, id: &str) -> Result<Option<ScheduleSlot>> {
        self.store.get_as(&keys::slot(id)).await
    }

    /// Write a slot unconditionally (catalog maintenance, not bookings).
    pub async fn put_slot(&self, slot: &ScheduleSlot) -> Result<()> {
        validate_slot(slot)?;
        self.store.set_as(&keys::slot(&slot.id), slot).await
    }

    /// The schedule joined with class and trainer display data.
    ///
    /// All three reads run concurrently; any failure fails the whole call.
    pub async fn get_enriched_schedule(&self) -> Result<Vec<EnrichedSlot>> {
        let (slots, classes, trainers) =
            tokio::try_join!(self.list_slots(), self.list_classes(), self.list_trainers())?;

        tracing::debug!(
            slots = slots.len(),
            classes = classes.len(),
            trainers = trainers.len(),
            "Enriching schedule"
        );

        Ok(enrich_slots(slots, &classes, &trainers))
    }

    // ─── Initialization ──────────────────────────────────────────

    /// Write the initial catalog and weekly schedule.
    ///
    /// Without `force`, existing catalog data and slots are left alone so
    /// a restart never resets booking counters.
    pub async fn seed(&self, force: bool) -> Result<SeedReport> {
        let mut report = SeedReport::default();

        report.slots_migrated = self.migrate_legacy_schedule().await?;

        let catalog_present = self.store.get(keys::CLASSES).await?.is_some();
        if force || !catalog_present {
            self.store.set_as(keys::CLASSES, &seed::classes()).await?;
            self.store.set_as(keys::TRAINERS, &seed::trainers()).await?;
            self.store
                .set_as(keys::TESTIMONIALS, &seed::testimonials())
                .await?;
            report.catalog_written = true;
        }

        for slot in seed::schedule() {
            let written = if force {
                self.put_slot(&slot).await.map(|_| true)?
            } else {
                self.store
                    .compare_and_swap_as(&keys::slot(&slot.id), None, &slot)
                    .await?
            };
            if written {
                report.slots_written += 1;
            }
        }

        tracing::info!(
            force,
            catalog_written = report.catalog_written,
            slots_written = report.slots_written,
            slots_migrated = report.slots_migrated,
            "Catalog seeded"
        );

        Ok(report)
    }

    /// Move slots out of the legacy `schedule` array into `slot:` rows.
    async fn migrate_legacy_schedule(&self) -> Result<usize> {
        let Some(legacy) = self
            .store
            .get_as::<Vec<ScheduleSlot>>(keys::LEGACY_SCHEDULE)
            .await?
        else {
            return Ok(0);
        };

        let mut migrated = 0;
        for slot in &legacy {
            if let Err(e) = validate_slot(slot) {
                tracing::warn!(slot_id = %slot.id, error = %e, "Skipping invalid legacy slot");
                continue;
            }
            if self
                .store
                .compare_and_swap_as(&keys::slot(&slot.id), None, slot)
                .await?
            {
                migrated += 1;
            }
        }

        self.store.delete(keys::LEGACY_SCHEDULE).await?;
        tracing::info!(
            total = legacy.len(),
            migrated,
            "Migrated legacy schedule blob"
        );
        Ok(migrated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> ScheduleRepository {
        ScheduleRepository::new(KvStore::in_memory())
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let repo = repo();
        let first = repo.seed(false).await.unwrap();
        assert!(first.catalog_written);
        assert_eq!(first.slots_written, 4);

        let mut slot = repo.get_slot("mon-6am-beginner").await.unwrap().unwrap();
        slot.current_bookings = 11;
        repo.put_slot(&slot).await.unwrap();

        let second = repo.seed(false).await.unwrap();
        assert!(!second.catalog_written);
        assert_eq!(second.slots_written, 0);

        let slot = repo.get_slot("mon-6am-beginner").await.unwrap().unwrap();
        assert_eq!(slot.current_bookings, 11);
    }

    #[tokio::test]
    async fn test_forced_seed_resets_slots() {
        let repo = repo();
        repo.seed(false).await.unwrap();

        let mut slot = repo.get_slot("wed-6pm-advanced").await.unwrap().unwrap();
        slot.current_bookings = 12;
        repo.put_slot(&slot).await.unwrap();

        let report = repo.seed(true).await.unwrap();
        assert!(report.catalog_written);
        assert_eq!(report.slots_written, 4);
        let slot = repo.get_slot("wed-6pm-advanced").await.unwrap().unwrap();
        assert_eq!(slot.current_bookings, 5);
    }

    #[tokio::test]
    async fn test_legacy_blob_is_migrated() {
        let store = KvStore::in_memory();
        let legacy = vec![seed::schedule()[0].clone()];
        store.set_as(keys::LEGACY_SCHEDULE, &legacy).await.unwrap();

        let repo = ScheduleRepository::new(store.clone());
        let report = repo.seed(false).await.unwrap();

        assert_eq!(report.slots_migrated, 1);
        assert_eq!(report.slots_written, 3);
        assert!(store.get(keys::LEGACY_SCHEDULE).await.unwrap().is_none());
    }

    #[test]
    fn test_validate_slot_rejects_bad_fields() {
        let mut slot = seed::schedule()[0].clone();
        slot.time = "6am".to_string();
        assert!(matches!(validate_slot(&slot), Err(AppError::Validation(_))));

        let mut slot = seed::schedule()[0].clone();
        slot.day = "Someday".to_string();
        assert!(matches!(validate_slot(&slot), Err(AppError::Validation(_))));

        let mut slot = seed::schedule()[0].clone();
        slot.current_bookings = slot.max_capacity + 1;
        assert!(matches!(validate_slot(&slot), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_slots_sort_sunday_first() {
        let mut slots = seed::schedule();
        let mut sunday = slots[0].clone();
        sunday.id = "sun-9am".to_string();
        sunday.day = "Sunday".to_string();
        sunday.time = "09:00".to_string();
        slots.push(sunday);

        sort_slots(&mut slots);
        let ids: Vec<&str> = slots.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "sun-9am",
                "mon-6am-beginner",
                "mon-7pm-intermediate",
                "tue-12pm-beginner",
                "wed-6pm-advanced"
            ]
        );
    }
}
