//! Bounded Cache Module
//!
//! Single-threaded engine of the local store: LRU list, TTL checks and
//! statistics. `LocalStore` wraps it in a mutex.

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{CacheError, Result};
use crate::store::{CacheEntry, CacheStats, LruList};

// == Bounded Cache ==
/// Capacity-limited string map with per-entry expiration.
#[derive(Debug)]
pub struct BoundedCache {
    entries: LruList<CacheEntry>,
    stats: CacheStats,
    capacity: NonZeroUsize,
}

impl BoundedCache {
    // == Constructor ==
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: LruList::with_capacity(capacity.get()),
            stats: CacheStats::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }

    // == Set ==
    /// Stores a value expiring `ttl` after `now`.
    ///
    /// Overwriting resets the TTL and refreshes recency. A new key that
    /// pushes the size over capacity evicts the least recently used entry.
    pub fn set(&mut self, key: &str, value: String, ttl: Duration, now: Instant) {
        let entry = CacheEntry::new(value, ttl, now);
        if self.entries.insert(key.to_string(), entry).is_some() {
            return;
        }

        if self.entries.len() > self.capacity.get() {
            if let Some((evicted, _)) = self.entries.pop_oldest() {
                debug!(key = %evicted, "evicted least recently used entry");
                self.stats.record_eviction();
            }
        }
    }

    // == Get ==
    /// Returns the live value for `key` and refreshes its recency.
    ///
    /// A stale entry is removed and reported as `Expired`; the next lookup
    /// then reports `NoData`.
    pub fn get(&mut self, key: &str, now: Instant) -> Result<String> {
        let expired = match self.entries.peek(key) {
            Some(entry) => entry.is_expired_at(now),
            None => {
                self.stats.record_miss();
                return Err(CacheError::NoData(key.to_string()));
            }
        };

        if expired {
            self.entries.remove(key);
            self.stats.record_expiration();
            return Err(CacheError::Expired(key.to_string()));
        }

        self.stats.record_hit();
        match self.entries.get(key) {
            Some(entry) => Ok(entry.value.clone()),
            None => Err(CacheError::NoData(key.to_string())),
        }
    }

    // == Delete ==
    /// Removes `key`; returns whether it was present.
    pub fn delete(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    // == Contains ==
    /// Whether `key` is resident, expired or not. Does not touch recency.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains(key)
    }

    // == Purge Expired ==
    /// Removes every entry expired at `now`. Returns the number removed.
    pub fn purge_expired(&mut self, now: Instant) -> usize {
        self.entries.retain(|_, entry| !entry.is_expired_at(now))
    }

    /// Resident keys, most recently used first.
    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().map(str::to_string).collect()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            total_entries: self.entries.len(),
            ..self.stats.clone()
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
