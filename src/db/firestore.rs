// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore backend for the key-value store.
//!
//! Each key is one document in a single collection:
//! - document ID: URL-encoded key
//! - `key`: the raw key (used for prefix range queries)
//! - `value_json`: the value as JSON text
//! - `version`: row version, bumped on every write
//!
//! Every write carries a precondition on the document's server update time
//! (or on its absence), so a write based on a stale read is rejected by
//! Firestore instead of overwriting a concurrent one.

use crate::db::store::Versioned;
use crate::error::AppError;
use chrono::{DateTime, Utc};
use firestore::errors::FirestoreError;
use firestore::FirestoreWritePrecondition;
use futures_util::{stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const MAX_CONCURRENT_DB_OPS: usize = 50;
// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;
/// Highest code point Firestore sorts; closes the prefix range.
const PREFIX_RANGE_END: char = '\u{f8ff}';
/// Attempts at an unconditional `set` before giving up with `Conflict`.
const MAX_SET_ATTEMPTS: usize = 8;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct KvDocument {
    key: String,
    value_json: String,
    version: u64,
    /// Server commit time; read back from document metadata, never written.
    #[serde(default, alias = "_firestore_updated", skip_serializing)]
    updated_at: Option<DateTime<Utc>>,
}

impl KvDocument {
    fn new(key: &str, value: &Value, version: u64) -> Result<Self, AppError> {
        Ok(Self {
            key: key.to_string(),
            value_json: to_json_text(key, value)?,
            version,
            updated_at: None,
        })
    }

    /// Precondition that holds only while the document is unchanged since
    /// this read.
    fn unchanged_since_read(&self) -> FirestoreWritePrecondition {
        match self.updated_at {
            Some(ts) => FirestoreWritePrecondition::UpdateTime(ts),
            // No metadata means no prior commit we can pin; require existence
            None => FirestoreWritePrecondition::Exists(true),
        }
    }

    fn into_versioned(self) -> Result<(String, Versioned), AppError> {
        let value: Value = serde_json::from_str(&self.value_json).map_err(|e| {
            AppError::Database(format!("Malformed JSON stored at '{}': {}", self.key, e))
        })?;
        Ok((
            self.key,
            Versioned {
                value,
                version: self.version,
            },
        ))
    }
}

fn doc_id(key: &str) -> String {
    urlencoding::encode(key).into_owned()
}

fn to_json_text(key: &str, value: &Value) -> Result<String, AppError> {
    serde_json::to_string(value)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode '{}': {}", key, e)))
}

/// Errors Firestore returns when a write precondition no longer holds.
fn is_precondition_failure(err: &FirestoreError) -> bool {
    match err {
        // Exists(false) on a document that is now there
        FirestoreError::DataConflictError(_) => true,
        // Document deleted since the read
        FirestoreError::DataNotFoundError(_) => true,
        FirestoreError::DatabaseError(e) => {
            matches!(e.public.code.as_str(), "FailedPrecondition" | "Aborted")
        }
        _ => false,
    }
}

/// Firestore key-value client.
#[derive(Clone)]
pub struct FirestoreKv {
    client: firestore::FirestoreDb,
    collection: String,
}

impl FirestoreKv {
    /// Connect to Firestore.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn connect(project_id: &str, collection: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        let client = if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            Self::create_emulator_client(project_id).await?
        } else {
            let client = firestore::FirestoreDb::new(project_id).await.map_err(|e| {
                AppError::Database(format!("Failed to connect to Firestore: {}", e))
            })?;
            tracing::info!(project = project_id, "Connected to Firestore");
            client
        };

        Ok(Self {
            client,
            collection: collection.to_string(),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<firestore::FirestoreDb, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(client)
    }

    async fn read_document(&self, key: &str) -> Result<Option<KvDocument>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(self.collection.as_str())
            .obj()
            .one(&doc_id(key))
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Write `doc` only if `precondition` holds.
    ///
    /// Returns `Ok(false)` when Firestore rejects the precondition.
    async fn write_document(
        &self,
        doc: &KvDocument,
        precondition: FirestoreWritePrecondition,
    ) -> Result<bool, AppError> {
        let result: Result<(), FirestoreError> = self
            .client
            .fluent()
            .update()
            .in_col(self.collection.as_str())
            .precondition(precondition)
            .document_id(doc_id(&doc.key))
            .object(doc)
            .execute()
            .await;

        match result {
            Ok(()) => Ok(true),
            Err(e) if is_precondition_failure(&e) => {
                tracing::debug!(key = %doc.key, error = %e, "Write precondition failed");
                Ok(false)
            }
            Err(e) => Err(AppError::Database(e.to_string())),
        }
    }

    /// Write `doc` if the stored document is still the one read as `current`.
    async fn write_over(
        &self,
        current: Option<&KvDocument>,
        doc: &KvDocument,
    ) -> Result<bool, AppError> {
        let precondition = match current {
            Some(read) => read.unchanged_since_read(),
            None => FirestoreWritePrecondition::Exists(false),
        };
        self.write_document(doc, precondition).await
    }

    // ─── Single-Key Operations ───────────────────────────────────

    pub async fn get_versioned(&self, key: &str) -> Result<Option<Versioned>, AppError> {
        match self.read_document(key).await? {
            Some(doc) => Ok(Some(doc.into_versioned()?.1)),
            None => Ok(None),
        }
    }

    /// Unconditional upsert.
    ///
    /// The version bump is read-then-write, so each attempt is conditioned on
    /// the read and retried if another writer got in between.
    pub async fn set(&self, key: &str, value: Value) -> Result<(), AppError> {
        for attempt in 1..=MAX_SET_ATTEMPTS {
            let current = self.read_document(key).await?;
            let version = current.as_ref().map(|doc| doc.version + 1).unwrap_or(1);
            let doc = KvDocument::new(key, &value, version)?;

            if self.write_over(current.as_ref(), &doc).await? {
                return Ok(());
            }
            tracing::debug!(key, attempt, "Concurrent write, retrying set");
        }

        Err(AppError::Conflict(format!(
            "Key '{}' is busy, please try again",
            key
        )))
    }

    pub async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.client
            .fluent()
            .delete()
            .from(self.collection.as_str())
            .document_id(doc_id(key))
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Multi-Key Operations ────────────────────────────────────

    /// Fetch keys concurrently; `buffered` keeps the request order.
    pub async fn mget(&self, keys: &[String]) -> Result<Vec<Value>, AppError> {
        let rows = stream::iter(keys.iter())
            .map(|key| self.get_versioned(key))
            .buffered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<Option<Versioned>, AppError>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<_>, AppError>>()?;

        Ok(rows.into_iter().flatten().map(|row| row.value).collect())
    }

    pub async fn mset(&self, entries: &[(String, Value)]) -> Result<(), AppError> {
        stream::iter(entries.iter())
            .map(|(key, value)| self.set(key, value.clone()))
            .buffer_unordered(MAX_CONCURRENT_DB_OPS)
            .collect::<Vec<Result<(), AppError>>>()
            .await
            .into_iter()
            .collect::<Result<Vec<()>, AppError>>()?;
        Ok(())
    }

    /// Delete keys in transactional batches.
    pub async fn mdel(&self, keys: &[String]) -> Result<(), AppError> {
        for chunk in keys.chunks(BATCH_SIZE) {
            let mut transaction =
                self.client.begin_transaction().await.map_err(|e| {
                    AppError::Database(format!("Failed to begin transaction: {}", e))
                })?;

            for key in chunk {
                self.client
                    .fluent()
                    .delete()
                    .from(self.collection.as_str())
                    .document_id(doc_id(key))
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add deletion of '{}' to transaction: {}",
                            key, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(())
    }

    /// Range query `[prefix, prefix + U+F8FF)` on the `key` field.
    pub async fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, Versioned)>, AppError> {
        let start = prefix.to_string();
        let end = format!("{}{}", prefix, PREFIX_RANGE_END);

        let docs: Vec<KvDocument> = self
            .client
            .fluent()
            .select()
            .from(self.collection.as_str())
            .filter(move |q| {
                q.for_all([
                    q.field("key").greater_than_or_equal(start.clone()),
                    q.field("key").less_than(end.clone()),
                ])
            })
            .order_by([("key", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        docs.into_iter().map(KvDocument::into_versioned).collect()
    }

    // ─── Conditional Update ──────────────────────────────────────

    /// Version-checked write.
    ///
    /// The version is compared on a fresh read, and the write is conditioned
    /// on that read's update time (or on the key still being absent), so a
    /// writer that lost a race between read and write gets `Ok(false)`.
    pub async fn compare_and_swap(
        &self,
        key: &str,
        expected_version: Option<u64>,
        value: Value,
    ) -> Result<bool, AppError> {
        let current = self.read_document(key).await?;
        let current_version = current.as_ref().map(|doc| doc.version);

        if current_version != expected_version {
            tracing::debug!(
                key,
                ?expected_version,
                ?current_version,
                "Version mismatch, skipping write"
            );
            return Ok(false);
        }

        let doc = KvDocument::new(key, &value, expected_version.map(|v| v + 1).unwrap_or(1))?;
        self.write_over(current.as_ref(), &doc).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_id_escapes_separators() {
        assert_eq!(doc_id("slot:mon-6am"), "slot%3Amon-6am");
        assert_eq!(
            doc_id("newsletter:a@b.com"),
            "newsletter%3Aa%40b.com"
        );
    }

    #[test]
    fn test_document_decodes_value() {
        let doc = KvDocument {
            key: "classes".to_string(),
            value_json: "[{\"id\":\"x\"}]".to_string(),
            version: 3,
            updated_at: None,
        };
        let (key, row) = doc.into_versioned().unwrap();
        assert_eq!(key, "classes");
        assert_eq!(row.version, 3);
        assert_eq!(row.value[0]["id"], "x");
    }

    #[test]
    fn test_update_time_is_not_written() {
        let mut doc = KvDocument::new("k", &serde_json::json!(1), 2).unwrap();
        doc.updated_at = Some(Utc::now());
        let encoded = serde_json::to_value(&doc).unwrap();
        assert!(encoded.get("updated_at").is_none());
        assert_eq!(encoded["version"], 2);
    }

    #[test]
    fn test_precondition_pins_read_update_time() {
        let mut doc = KvDocument::new("k", &serde_json::json!(1), 2).unwrap();
        assert_eq!(
            doc.unchanged_since_read(),
            FirestoreWritePrecondition::Exists(true)
        );

        let ts = DateTime::from_timestamp(1_760_000_000, 123_456_000).unwrap();
        doc.updated_at = Some(ts);
        assert_eq!(
            doc.unchanged_since_read(),
            FirestoreWritePrecondition::UpdateTime(ts)
        );
    }
}
