//! Cache Aside - A read-through caching layer
//!
//! Checks a pluggable store before running an expensive loader and
//! populates it afterwards. Ships an in-process store with TTL expiration
//! and LRU eviction, and an adapter for a remote HTTP key/value service.

pub mod codec;
pub mod config;
pub mod context;
pub mod error;
pub mod models;
pub mod resolve;
pub mod store;

pub use config::{LocalStoreConfig, RemoteStoreConfig, ResolveOptions};
pub use context::{CancelHandle, Context};
pub use error::{CacheError, ResolveError, Result};
pub use resolve::{resolve, Cache};
pub use store::{CacheStats, LocalStore, RemoteStore, Store};
