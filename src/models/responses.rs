//! Response DTOs for the remote key/value service
//!
//! Defines the bodies `RemoteStore` reads back.

use serde::Deserialize;

/// Response body for the GET operation (GET /get/:key)
#[derive(Debug, Clone, Deserialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: String,
}

/// Body the service returns alongside a non-success status
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
