//! Request DTOs for the remote key/value service
//!
//! Defines the bodies `RemoteStore` sends.

use std::time::Duration;

use serde::Serialize;

/// Request body for the SET operation (PUT /set)
///
/// # Fields
/// - `key`: The cache key to store the value under
/// - `value`: The encoded value
/// - `ttl`: TTL in whole seconds
#[derive(Debug, Clone, Serialize)]
pub struct SetRequest<'a> {
    pub key: &'a str,
    pub value: &'a str,
    pub ttl: u64,
}

impl<'a> SetRequest<'a> {
    /// Builds a request, rounding `ttl` up to whole seconds.
    ///
    /// The protocol cannot express sub-second TTLs, so anything shorter than
    /// one second is sent as one second.
    pub fn new(key: &'a str, value: &'a str, ttl: Duration) -> Self {
        Self {
            key,
            value,
            ttl: ttl_seconds(ttl),
        }
    }
}

fn ttl_seconds(ttl: Duration) -> u64 {
    let secs = ttl.as_secs().saturating_add(u64::from(ttl.subsec_nanos() > 0));
    secs.max(1)
}
