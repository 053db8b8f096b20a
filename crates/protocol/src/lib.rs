//! Wire protocol types for the packsync upload service.
//!
//! Covers the JSON request/response bodies of the chunked upload API,
//! the endpoint layout, and the header names and defaults shared by the
//! client crates.

pub mod constants;
pub mod endpoints;
pub mod messages;
pub mod types;

// Re-export primary types for convenience.
pub use endpoints::Endpoints;
pub use messages::{
    CheckUploadResponse, StartUploadRequest, StartUploadResponse, UploadStatusResponse,
};
pub use types::{ParseKindError, UploadKind};
