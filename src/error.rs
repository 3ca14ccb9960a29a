//! Error types for the cache layer
//!
//! Provides unified error handling using thiserror.

use std::fmt;

use thiserror::Error;

// == Cache Error Enum ==
/// Errors raised by stores, the value codec and store construction.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key not present in the store
    #[error("no data for key: {0}")]
    NoData(String),

    /// Key was present but its TTL has elapsed
    #[error("data is expired for key: {0}")]
    Expired(String),

    /// Value could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Store failed for a reason other than absence or expiry
    #[error("backend error: {0}")]
    Backend(String),

    /// Invalid construction parameters
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The caller's context was cancelled before the operation completed
    #[error("operation cancelled")]
    Cancelled,

    /// The caller's context deadline passed before the operation completed
    #[error("deadline exceeded")]
    DeadlineExceeded,
}

impl CacheError {
    /// Returns true for the errors that simply mean "nothing cached here".
    pub fn is_miss(&self) -> bool {
        matches!(self, CacheError::NoData(_) | CacheError::Expired(_))
    }
}

impl From<reqwest::Error> for CacheError {
    fn from(err: reqwest::Error) -> Self {
        CacheError::Backend(err.to_string())
    }
}

// == Resolve Error Enum ==
/// Failure of a cache-aside lookup.
///
/// Store failures never appear here: reads degrade to a miss and writes are
/// logged and dropped. What remains is either the loader's own error, passed
/// through untouched, or a value the loader produced that could not be
/// encoded for the store.
#[derive(Debug)]
pub enum ResolveError<T, E> {
    /// The loader failed; nothing was written to the store
    Loader(E),

    /// The loader succeeded but its value could not be encoded
    Encode {
        key: String,
        value: T,
        source: CacheError,
    },
}

impl<T, E: fmt::Display> fmt::Display for ResolveError<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::Loader(err) => write!(f, "loader failed: {}", err),
            ResolveError::Encode { key, source, .. } => {
                write!(f, "failed to encode value for key {}: {}", key, source)
            }
        }
    }
}

impl<T: fmt::Debug, E: fmt::Debug + fmt::Display> std::error::Error for ResolveError<T, E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResolveError::Loader(_) => None,
            ResolveError::Encode { source, .. } => Some(source),
        }
    }
}

impl<T, E> ResolveError<T, E> {
    /// Returns the loader's error, if that is what failed.
    pub fn into_loader_error(self) -> Option<E> {
        match self {
            ResolveError::Loader(err) => Some(err),
            ResolveError::Encode { .. } => None,
        }
    }

    /// Recovers the computed value from an encode failure.
    pub fn into_value(self) -> Option<T> {
        match self {
            ResolveError::Loader(_) => None,
            ResolveError::Encode { value, .. } => Some(value),
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for store operations.
pub type Result<T> = std::result::Result<T, CacheError>;
