/// In-memory statistics cache with TTL expiry
///
/// One cache instance is created at startup and handed to the tool invoker.
/// Entries are keyed by tool name plus the fully-defaulted arguments.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::domain::Payload;

/// Default time-to-live for cached results
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

struct CacheEntry {
    payload: Payload,
    stored_at: Instant,
}

/// Snapshot of cache state for health reporting
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CacheInfo {
    pub enabled: bool,
    pub entries: usize,
    pub ttl_seconds: u64,
}

/// Shared cache of successful query payloads
///
/// A zero TTL disables caching entirely.
pub struct StatsCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl StatsCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    /// Look up a live entry, dropping it if it has expired
    pub fn get(&self, key: &str) -> Option<Payload> {
        if !self.is_enabled() {
            return None;
        }

        let mut entries = self.lock();
        match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                tracing::debug!("Cache hit for key: {}", key);
                Some(entry.payload.clone())
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn put(&self, key: String, payload: Payload) {
        if !self.is_enabled() {
            return;
        }

        tracing::debug!("Cached result for key: {}", key);
        self.lock().insert(
            key,
            CacheEntry {
                payload,
                stored_at: Instant::now(),
            },
        );
    }

    /// Remove every entry, returning how many were dropped
    pub fn purge(&self) -> usize {
        let mut entries = self.lock();
        let purged = entries.len();
        entries.clear();
        purged
    }

    pub fn info(&self) -> CacheInfo {
        let ttl = self.ttl;
        let live = self
            .lock()
            .values()
            .filter(|entry| entry.stored_at.elapsed() < ttl)
            .count();

        CacheInfo {
            enabled: self.is_enabled(),
            entries: live,
            ttl_seconds: ttl.as_secs(),
        }
    }

    // A poisoned lock only means another thread panicked mid-insert; the map is still usable.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for StatsCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}
