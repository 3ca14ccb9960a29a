//! Configuration Module
//!
//! Explicit configuration structs for stores and lookups. Each can be built
//! from defaults or loaded from environment variables.

use std::env;
use std::time::Duration;

/// Default number of entries a local store holds.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Default expiration horizon for values written by a lookup.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

// == Local Store Config ==
/// Settings for the in-process bounded store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalStoreConfig {
    /// Maximum number of entries the store can hold
    pub capacity: usize,
}

impl LocalStoreConfig {
    /// Loads settings from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum entries (default: 1000)
    pub fn from_env() -> Self {
        Self {
            capacity: env_parse("CACHE_CAPACITY").unwrap_or(DEFAULT_CAPACITY),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { capacity }
    }
}

impl Default for LocalStoreConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

// == Remote Store Config ==
/// Settings for the HTTP key/value store adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteStoreConfig {
    /// Base URL of the key/value service
    pub base_url: String,
    /// Upper bound on a single request, applied on top of the caller's context
    pub request_timeout: Duration,
}

impl RemoteStoreConfig {
    /// Loads settings from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_REMOTE_URL` - Service base URL (default: http://127.0.0.1:3000)
    /// - `CACHE_REMOTE_TIMEOUT_MS` - Per-request timeout in milliseconds (default: 2000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: env::var("CACHE_REMOTE_URL").unwrap_or(defaults.base_url),
            request_timeout: env_parse("CACHE_REMOTE_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.request_timeout),
        }
    }

    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }
}

impl Default for RemoteStoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            request_timeout: Duration::from_millis(2000),
        }
    }
}

// == Resolve Options ==
/// Options for a single cache-aside lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Expiration horizon passed to the store when populating it
    pub ttl: Duration,
}

impl ResolveOptions {
    /// Loads options from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_DEFAULT_TTL_SECS` - TTL in seconds (default: 1800)
    pub fn from_env() -> Self {
        Self {
            ttl: env_parse("CACHE_DEFAULT_TTL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TTL),
        }
    }

    /// Returns a copy with the given TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self { ttl: DEFAULT_TTL }
    }
}
