//! Local Store Module
//!
//! Thread-safe in-process store: a [`BoundedCache`] behind one mutex.

use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::info;

use crate::config::{self, LocalStoreConfig};
use crate::context::Context;
use crate::error::{CacheError, Result};
use crate::store::{BoundedCache, CacheStats, Store};

// == Local Store ==
/// In-process store with LRU eviction and lazy TTL expiry.
///
/// Each operation, including eviction bookkeeping, runs under a single lock,
/// so the store can be shared freely across tasks and threads (usually as
/// `Arc<LocalStore>`). Nothing runs in the background: stale entries are
/// dropped when a lookup observes them or on [`LocalStore::purge_expired`].
#[derive(Debug)]
pub struct LocalStore {
    inner: Mutex<BoundedCache>,
}

impl LocalStore {
    // == Constructor ==
    pub fn new(capacity: NonZeroUsize) -> Self {
        info!(capacity = capacity.get(), "local store created");
        Self {
            inner: Mutex::new(BoundedCache::new(capacity)),
        }
    }

    /// Builds a store from configuration.
    ///
    /// A zero capacity is a configuration error; callers are expected to
    /// treat it as fatal at startup.
    pub fn from_config(config: &LocalStoreConfig) -> Result<Self> {
        let capacity = NonZeroUsize::new(config.capacity).ok_or_else(|| {
            CacheError::Configuration("local store capacity must be positive".to_string())
        })?;
        Ok(Self::new(capacity))
    }

    pub fn capacity(&self) -> NonZeroUsize {
        self.inner.lock().capacity()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Whether `key` is resident. Does not refresh recency or expire it.
    pub fn contains(&self, key: &str) -> bool {
        self.inner.lock().contains(key)
    }

    /// Resident keys, most recently used first.
    pub fn keys(&self) -> Vec<String> {
        self.inner.lock().keys()
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.lock().stats()
    }

    /// Drops every expired entry now. Returns the number removed.
    pub fn purge_expired(&self) -> usize {
        self.inner.lock().purge_expired(Instant::now())
    }
}

const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(config::DEFAULT_CAPACITY) {
    Some(capacity) => capacity,
    None => panic!("default capacity must be positive"),
};

impl Default for LocalStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[async_trait]
impl Store for LocalStore {
    async fn get(&self, ctx: &Context, key: &str) -> Result<String> {
        ctx.check()?;
        self.inner.lock().get(key, Instant::now())
    }

    async fn set(&self, ctx: &Context, key: &str, value: String, ttl: Duration) -> Result<()> {
        ctx.check()?;
        self.inner.lock().set(key, value, ttl, Instant::now());
        Ok(())
    }

    async fn delete(&self, ctx: &Context, key: &str) -> Result<()> {
        ctx.check()?;
        self.inner.lock().delete(key);
        Ok(())
    }
}
