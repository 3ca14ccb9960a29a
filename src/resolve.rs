//! Cache-Aside Lookup
//!
//! Checks a store before running an expensive loader, and populates the
//! store with whatever the loader produced.
//!
//! # Failure policy
//! - Any failed read (absent, expired, backend down, context done) is a miss.
//! - A stored value that no longer decodes as `T` is also a miss: the loader
//!   runs and its result overwrites the bad entry.
//! - Loader errors are returned untouched and nothing is written.
//! - Write failures are logged and dropped; the loader's value is returned.

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::codec;
use crate::config::ResolveOptions;
use crate::context::Context;
use crate::error::{ResolveError, Result};
use crate::store::Store;

// == Resolve ==
/// Returns the cached value for `key`, or runs `loader` and caches its result.
///
/// The loader is not invoked on a hit. Concurrent misses on the same key each
/// run their own loader; the last write wins.
pub async fn resolve<S, T, E, F, Fut>(
    ctx: &Context,
    store: &S,
    key: &str,
    loader: F,
    options: &ResolveOptions,
) -> std::result::Result<T, ResolveError<T, E>>
where
    S: Store + ?Sized,
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
{
    match store.get(ctx, key).await {
        Ok(data) => match codec::decode::<T>(&data) {
            Ok(value) => {
                debug!(key, "cache hit");
                return Ok(value);
            }
            Err(err) => warn!(key, error = %err, "cached value failed to decode, reloading"),
        },
        Err(err) if err.is_miss() => debug!(key, "cache miss"),
        Err(err) => warn!(key, error = %err, "cache read failed, treating as miss"),
    }

    let value = loader().await.map_err(ResolveError::Loader)?;

    let data = match codec::encode(&value) {
        Ok(data) => data,
        Err(source) => {
            return Err(ResolveError::Encode {
                key: key.to_string(),
                value,
                source,
            })
        }
    };

    if let Err(err) = store.set(ctx, key, data, options.ttl).await {
        warn!(key, error = %err, "cache write failed");
    }

    Ok(value)
}

// == Cache ==
/// A store bundled with default lookup options.
///
/// Cheap to clone when the store is (e.g. `Arc<LocalStore>` or
/// `RemoteStore`).
#[derive(Debug, Clone)]
pub struct Cache<S> {
    store: S,
    options: ResolveOptions,
}

impl<S: Store> Cache<S> {
    pub fn new(store: S) -> Self {
        Self::with_options(store, ResolveOptions::default())
    }

    pub fn with_options(store: S, options: ResolveOptions) -> Self {
        Self { store, options }
    }

    /// Returns a copy of this handle that writes with `ttl`.
    pub fn with_ttl(&self, ttl: Duration) -> Self
    where
        S: Clone,
    {
        Self {
            store: self.store.clone(),
            options: self.options.with_ttl(ttl),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// Looks up `key` with this handle's options. See [`resolve`].
    pub async fn resolve<T, E, F, Fut>(
        &self,
        ctx: &Context,
        key: &str,
        loader: F,
    ) -> std::result::Result<T, ResolveError<T, E>>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        resolve(ctx, &self.store, key, loader, &self.options).await
    }

    /// Removes `key` from the store.
    pub async fn invalidate(&self, ctx: &Context, key: &str) -> Result<()> {
        self.store.delete(ctx, key).await
    }

    /// Reads and decodes `key` without falling back to a loader.
    pub async fn peek<T: DeserializeOwned>(&self, ctx: &Context, key: &str) -> Result<T> {
        let data = self.store.get(ctx, key).await?;
        codec::decode(&data)
    }

    /// Encodes and writes `value` unconditionally.
    pub async fn put<T: Serialize + ?Sized>(&self, ctx: &Context, key: &str, value: &T) -> Result<()> {
        let data = codec::encode(value)?;
        self.store.set(ctx, key, data, self.options.ttl).await
    }
}
