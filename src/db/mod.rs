//! Key-value persistence layer (in-memory map or Firestore).

pub mod firestore;
pub mod store;

pub use firestore::FirestoreKv;
pub use store::{KvStore, Versioned};

/// Key layout of the store.
///
/// Catalog collections are whole JSON arrays under fixed keys. Everything
/// else is one JSON object per key under a typed prefix.
pub mod keys {
    pub const CLASSES: &str = "classes";
    pub const TRAINERS: &str = "trainers";
    pub const TESTIMONIALS: &str = "testimonials";
    /// Whole-array schedule blob written by older deployments; migrated to `slot:` rows.
    pub const LEGACY_SCHEDULE: &str = "schedule";

    pub const SLOT_PREFIX: &str = "slot:";
    pub const USER_PREFIX: &str = "user:";
    pub const BOOKING_PREFIX: &str = "booking:";
    pub const CONTACT_PREFIX: &str = "contact:";
    pub const NEWSLETTER_PREFIX: &str = "newsletter:";
    pub const CREDENTIAL_PREFIX: &str = "auth:";

    pub fn slot(id: &str) -> String {
        format!("{SLOT_PREFIX}{id}")
    }

    pub fn user(id: &str) -> String {
        format!("{USER_PREFIX}{id}")
    }

    pub fn booking(id: &str) -> String {
        format!("{BOOKING_PREFIX}{id}")
    }

    pub fn contact(id: &str) -> String {
        format!("{CONTACT_PREFIX}{id}")
    }

    /// Emails are case-insensitive; keys use the lowercase form.
    pub fn newsletter(email: &str) -> String {
        format!("{NEWSLETTER_PREFIX}{}", email.trim().to_lowercase())
    }

    pub fn credential(email: &str) -> String {
        format!("{CREDENTIAL_PREFIX}{}", email.trim().to_lowercase())
    }
}
