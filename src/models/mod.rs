//! Models Module
//!
//! Wire DTOs of the HTTP key/value protocol spoken by `RemoteStore`.

mod requests;
mod responses;

pub use requests::SetRequest;
pub use responses::{ErrorResponse, GetResponse};
