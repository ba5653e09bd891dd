use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use almanac_core::{AlmanacError, Clock, PersistenceBackend};
use chrono::{DateTime, TimeDelta, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::CacheKey;

/// Stored envelope around a cached payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// Rendered cache key.
    pub key: String,
    /// Cached value.
    pub payload: T,
    /// When the entry was written.
    pub saved_at: DateTime<Utc>,
}

/// Counters describing cache traffic since construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    /// Fresh entries returned by `get`.
    pub hits: u64,
    /// `get` calls that found nothing usable.
    pub misses: u64,
    /// Successful `put` calls.
    pub writes: u64,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
}

/// TTL cache over a byte-level [`PersistenceBackend`].
///
/// Reads and writes never fail: backend or decoding problems are logged and
/// turn into a miss or a dropped write. Only [`CacheStore::clear_all`] reports
/// errors.
pub struct CacheStore {
    backend: Arc<dyn PersistenceBackend>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    counters: Counters,
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("ttl", &self.ttl)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl CacheStore {
    /// Create a store with the given backend, clock and time-to-live.
    pub fn new(backend: Arc<dyn PersistenceBackend>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            backend,
            clock,
            ttl,
            counters: Counters::default(),
        }
    }

    /// Configured time-to-live.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the payload under `key` if present and not older than the TTL.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "almanac::cache::get", skip_all, fields(key = %key))
    )]
    pub async fn get<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let found = self.lookup(key).await;
        let counter = if found.is_some() {
            &self.counters.hits
        } else {
            &self.counters.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    async fn lookup<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let rendered = key.to_string();
        let bytes = match self.backend.read(&rendered).await {
            Ok(Some(b)) => b,
            Ok(None) => return None,
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(key = %rendered, error = %_e, "cache read failed; treating as miss");
                return None;
            }
        };
        let entry: CacheEntry<T> = match serde_json::from_slice(&bytes) {
            Ok(entry) => entry,
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(key = %rendered, error = %_e, "undecodable cache entry; treating as miss");
                return None;
            }
        };
        if self.is_stale(entry.saved_at) {
            #[cfg(feature = "tracing")]
            tracing::debug!(key = %rendered, saved_at = %entry.saved_at, "cache entry expired");
            return None;
        }
        Some(entry.payload)
    }

    fn is_stale(&self, saved_at: DateTime<Utc>) -> bool {
        let ttl = TimeDelta::from_std(self.ttl).unwrap_or(TimeDelta::MAX);
        self.clock.now().signed_duration_since(saved_at) > ttl
    }

    /// Overwrite the entry under `key`, stamped with the current time.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "almanac::cache::put", skip_all, fields(key = %key))
    )]
    pub async fn put<T: Serialize + Sync>(&self, key: &CacheKey, payload: &T) {
        let entry = CacheEntry {
            key: key.to_string(),
            payload,
            saved_at: self.clock.now(),
        };
        let bytes = match serde_json::to_vec(&entry) {
            Ok(b) => b,
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(key = %entry.key, error = %_e, "cache payload not serializable; skipping write");
                return;
            }
        };
        match self.backend.write(&entry.key, bytes).await {
            Ok(()) => {
                self.counters.writes.fetch_add(1, Ordering::Relaxed);
            }
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(key = %entry.key, error = %_e, "cache write failed; skipping");
            }
        }
    }

    /// Remove every entry.
    ///
    /// # Errors
    /// Returns the backend's `Storage` error when it cannot clear.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "almanac::cache::clear_all", skip(self), err)
    )]
    pub async fn clear_all(&self) -> Result<(), AlmanacError> {
        self.backend.clear().await
    }

    /// Snapshot of the traffic counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            writes: self.counters.writes.load(Ordering::Relaxed),
        }
    }
}
