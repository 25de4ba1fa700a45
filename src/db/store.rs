// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Key-value store handle shared by every service.
//!
//! The store maps string keys to JSON values. Every row carries a version
//! that increases on each write, which `compare_and_swap` uses to make
//! read-modify-write sequences safe under concurrent requests.

use crate::config::{Config, StoreBackend};
use crate::db::firestore::FirestoreKv;
use crate::error::AppError;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// A stored value together with its row version.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T = Value> {
    pub value: T,
    pub version: u64,
}

/// Store handle. Cheap to clone; clones share the same backend.
#[derive(Clone)]
pub struct KvStore {
    backend: Backend,
}

#[derive(Clone)]
enum Backend {
    Memory(Arc<MemoryKv>),
    Firestore(FirestoreKv),
    /// Every operation fails. Stands in for an unreachable store in tests.
    Offline,
}

impl KvStore {
    /// Open the backend selected by the configuration.
    pub async fn open(config: &Config) -> Result<Self, AppError> {
        match config.store_backend {
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory store; data is lost on restart");
                Ok(Self::in_memory())
            }
            StoreBackend::Firestore => {
                let kv = FirestoreKv::connect(&config.gcp_project_id, &config.kv_collection).await?;
                Ok(Self {
                    backend: Backend::Firestore(kv),
                })
            }
        }
    }

    /// Create an empty process-local store.
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(Arc::new(MemoryKv::default())),
        }
    }

    /// Create a store whose every call fails with a database error.
    pub fn offline() -> Self {
        Self {
            backend: Backend::Offline,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match &self.backend {
            Backend::Memory(_) => "memory",
            Backend::Firestore(_) => "firestore",
            Backend::Offline => "offline",
        }
    }

    /// Release the backend at shutdown.
    pub async fn close(self) {
        tracing::info!(backend = self.backend_name(), "Closing key-value store");
        drop(self.backend);
    }

    fn offline_error() -> AppError {
        AppError::Database("Store not connected (offline mode)".to_string())
    }

    // ─── Raw Operations ──────────────────────────────────────────

    /// Get a value by key.
    pub async fn get(&self, key: &str) -> Result<Option<Value>, AppError> {
        Ok(self.get_versioned(key).await?.map(|v| v.value))
    }

    /// Get a value and its row version.
    pub async fn get_versioned(&self, key: &str) -> Result<Option<Versioned>, AppError> {
        match &self.backend {
            Backend::Memory(mem) => Ok(mem.get(key)),
            Backend::Firestore(fs) => fs.get_versioned(key).await,
            Backend::Offline => Err(Self::offline_error()),
        }
    }

    /// Upsert a value, bumping its version.
    pub async fn set(&self, key: &str, value: Value) -> Result<(), AppError> {
        match &self.backend {
            Backend::Memory(mem) => mem.set(key, value),
            Backend::Firestore(fs) => fs.set(key, value).await,
            Backend::Offline => Err(Self::offline_error()),
        }
    }

    /// Delete a key. Deleting a missing key is not an error.
    pub async fn delete(&self, key: &str) -> Result<(), AppError> {
        match &self.backend {
            Backend::Memory(mem) => mem.delete(key),
            Backend::Firestore(fs) => fs.delete(key).await,
            Backend::Offline => Err(Self::offline_error()),
        }
    }

    /// Get several values. Missing keys are skipped; order follows `keys`.
    pub async fn mget(&self, keys: &[String]) -> Result<Vec<Value>, AppError> {
        match &self.backend {
            Backend::Memory(mem) => Ok(keys
                .iter()
                .filter_map(|key| mem.get(key).map(|v| v.value))
                .collect()),
            Backend::Firestore(fs) => fs.mget(keys).await,
            Backend::Offline => Err(Self::offline_error()),
        }
    }

    /// Upsert several values.
    pub async fn mset(&self, entries: &[(String, Value)]) -> Result<(), AppError> {
        match &self.backend {
            Backend::Memory(mem) => {
                for (key, value) in entries {
                    mem.set(key, value.clone())?;
                }
                Ok(())
            }
            Backend::Firestore(fs) => fs.mset(entries).await,
            Backend::Offline => Err(Self::offline_error()),
        }
    }

    /// Delete several keys.
    pub async fn mdel(&self, keys: &[String]) -> Result<(), AppError> {
        match &self.backend {
            Backend::Memory(mem) => {
                for key in keys {
                    mem.delete(key)?;
                }
                Ok(())
            }
            Backend::Firestore(fs) => fs.mdel(keys).await,
            Backend::Offline => Err(Self::offline_error()),
        }
    }

    /// All values whose key starts with `prefix`, ordered by key.
    pub async fn get_by_prefix(&self, prefix: &str) -> Result<Vec<Value>, AppError> {
        Ok(self
            .scan_prefix(prefix)
            .await?
            .into_iter()
            .map(|(_, v)| v.value)
            .collect())
    }

    /// All `(key, versioned value)` pairs under `prefix`, ordered by key.
    pub async fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, Versioned)>, AppError> {
        match &self.backend {
            Backend::Memory(mem) => Ok(mem.scan_prefix(prefix)),
            Backend::Firestore(fs) => fs.scan_prefix(prefix).await,
            Backend::Offline => Err(Self::offline_error()),
        }
    }

    /// Write `value` only if the row is still at `expected_version`.
    ///
    /// `None` means the key must not exist yet. Returns `false` when another
    /// writer got there first; the caller should re-read and decide again.
    pub async fn compare_and_swap(
        &self,
        key: &str,
        expected_version: Option<u64>,
        value: Value,
    ) -> Result<bool, AppError> {
        match &self.backend {
            Backend::Memory(mem) => mem.compare_and_swap(key, expected_version, value),
            Backend::Firestore(fs) => fs.compare_and_swap(key, expected_version, value).await,
            Backend::Offline => Err(Self::offline_error()),
        }
    }

    // ─── Typed Helpers ───────────────────────────────────────────

    pub async fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError> {
        self.get(key)
            .await?
            .map(|value| decode(key, value))
            .transpose()
    }

    pub async fn get_versioned_as<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<Versioned<T>>, AppError> {
        match self.get_versioned(key).await? {
            Some(Versioned { value, version }) => Ok(Some(Versioned {
                value: decode(key, value)?,
                version,
            })),
            None => Ok(None),
        }
    }

    pub async fn set_as<T: Serialize>(&self, key: &str, value: &T) -> Result<(), AppError> {
        self.set(key, encode(key, value)?).await
    }

    pub async fn compare_and_swap_as<T: Serialize>(
        &self,
        key: &str,
        expected_version: Option<u64>,
        value: &T,
    ) -> Result<bool, AppError> {
        self.compare_and_swap(key, expected_version, encode(key, value)?)
            .await
    }

    /// Decode every value under `prefix`, ordered by key.
    pub async fn scan_prefix_as<T: DeserializeOwned>(
        &self,
        prefix: &str,
    ) -> Result<Vec<Versioned<T>>, AppError> {
        self.scan_prefix(prefix)
            .await?
            .into_iter()
            .map(|(key, Versioned { value, version })| {
                Ok(Versioned {
                    value: decode(&key, value)?,
                    version,
                })
            })
            .collect()
    }

    /// Make writes to keys under `prefix` fail (in-memory backend, tests only).
    #[cfg(test)]
    pub(crate) fn fail_writes_under(&self, prefix: &str) {
        if let Backend::Memory(mem) = &self.backend {
            mem.failing_prefixes
                .lock()
                .unwrap()
                .push(prefix.to_string());
        }
    }
}

fn decode<T: DeserializeOwned>(key: &str, value: Value) -> Result<T, AppError> {
    serde_json::from_value(value)
        .map_err(|e| AppError::Database(format!("Malformed value at '{}': {}", key, e)))
}

fn encode<T: Serialize>(key: &str, value: &T) -> Result<Value, AppError> {
    serde_json::to_value(value)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode '{}': {}", key, e)))
}

// ─── In-Memory Backend ───────────────────────────────────────────

#[derive(Default)]
struct MemoryKv {
    entries: DashMap<String, Versioned>,
    #[cfg(test)]
    failing_prefixes: std::sync::Mutex<Vec<String>>,
}

impl MemoryKv {
    fn get(&self, key: &str) -> Option<Versioned> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    #[cfg(test)]
    fn check_writable(&self, key: &str) -> Result<(), AppError> {
        let failing = self.failing_prefixes.lock().unwrap();
        if failing.iter().any(|prefix| key.starts_with(prefix.as_str())) {
            return Err(AppError::Database(format!("Injected write failure for '{}'", key)));
        }
        Ok(())
    }

    #[cfg(not(test))]
    fn check_writable(&self, _key: &str) -> Result<(), AppError> {
        Ok(())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), AppError> {
        self.check_writable(key)?;
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                let next = occupied.get().version + 1;
                occupied.insert(Versioned {
                    value,
                    version: next,
                });
            }
            Entry::Vacant(vacant) => {
                vacant.insert(Versioned { value, version: 1 });
            }
        }
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), AppError> {
        self.check_writable(key)?;
        self.entries.remove(key);
        Ok(())
    }

    fn scan_prefix(&self, prefix: &str) -> Vec<(String, Versioned)> {
        let mut rows: Vec<(String, Versioned)> = self
            .entries
            .iter()
            .filter(|entry| entry.key().starts_with(prefix))
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        rows
    }

    fn compare_and_swap(
        &self,
        key: &str,
        expected_version: Option<u64>,
        value: Value,
    ) -> Result<bool, AppError> {
        self.check_writable(key)?;
        // The entry guard holds the shard lock for the whole check-then-write.
        match (self.entries.entry(key.to_string()), expected_version) {
            (Entry::Occupied(mut occupied), Some(expected)) => {
                if occupied.get().version != expected {
                    return Ok(false);
                }
                occupied.insert(Versioned {
                    value,
                    version: expected + 1,
                });
                Ok(true)
            }
            (Entry::Vacant(vacant), None) => {
                vacant.insert(Versioned { value, version: 1 });
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
