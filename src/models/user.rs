//! User profile and credential records.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::Booking;

/// Member profile stored at `user:<id>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// User ID (also the key suffix)
    pub id: String,
    pub email: String,
    pub name: String,
    /// When the member signed up (RFC3339)
    pub member_since: String,
    /// "trial" for new signups
    pub membership_type: String,
    /// Denormalized copy of the member's bookings
    #[serde(default)]
    pub bookings: Vec<Booking>,
}

/// Login credential stored at `auth:<email>`. Never sent to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    pub user_id: String,
    pub email: String,
    /// PBKDF2 salt (base64)
    pub salt: String,
    /// PBKDF2-HMAC-SHA256 hash (base64)
    pub password_hash: String,
    pub iterations: u32,
    pub created_at: String,
}
