//! Store Module
//!
//! The backend contract used by the cache-aside lookup, plus the in-process
//! and HTTP implementations.

mod bounded;
mod entry;
mod local;
mod lru;
mod remote;
mod stats;


use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::context::Context;
use crate::error::Result;

// Re-export public types
pub use bounded::BoundedCache;
pub use entry::CacheEntry;
pub use local::LocalStore;
pub use lru::{Keys, LruList};
pub use remote::RemoteStore;
pub use stats::CacheStats;

// == Store Trait ==
/// Minimal contract a cache backend implements.
///
/// Values are opaque strings; encoding is the caller's business. Every call
/// takes a [`Context`] and fails with `Cancelled` or `DeadlineExceeded` if
/// the context is done first.
#[async_trait]
pub trait Store: Send + Sync {
    /// Returns the stored value.
    ///
    /// Fails with `NoData` when the key is absent and, for backends that track
    /// expiry themselves, `Expired` when its TTL has elapsed.
    async fn get(&self, ctx: &Context, key: &str) -> Result<String>;

    /// Stores `value` for `ttl`, replacing any existing entry.
    async fn set(&self, ctx: &Context, key: &str, value: String, ttl: Duration) -> Result<()>;

    /// Removes `key`. Removing an absent key succeeds.
    async fn delete(&self, ctx: &Context, key: &str) -> Result<()>;
}

#[async_trait]
impl<S: Store + ?Sized> Store for Arc<S> {
    async fn get(&self, ctx: &Context, key: &str) -> Result<String> {
        (**self).get(ctx, key).await
    }

    async fn set(&self, ctx: &Context, key: &str, value: String, ttl: Duration) -> Result<()> {
        (**self).set(ctx, key, value, ttl).await
    }

    async fn delete(&self, ctx: &Context, key: &str) -> Result<()> {
        (**self).delete(ctx, key).await
    }
}
