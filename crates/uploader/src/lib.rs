//! Resumable chunked upload client for packsync payloads.
//!
//! Uploads a byte payload (a recipe document, an icon archive) for one
//! modpack version over HTTP. Chunks the server already holds are not
//! sent again, so a failed upload is resumed by simply calling upload
//! again with the same payload.
//!
//! # Pipeline
//!
//! 1. **Start**: open a session, committing to the payload digest
//! 2. **Status**: ask which chunks the server already has
//! 3. **Chunks**: send every missing chunk in index order
//! 4. **Complete**: the server verifies the reassembled payload
//!
//! Failures never escape as panics or errors: every upload ends in an
//! [`UploadResult`].

pub mod client;
pub mod config;
pub mod error;
pub mod progress;
pub mod session;
pub mod transport;
pub mod types;

#[cfg(any(test, feature = "test-util"))]
pub mod mock_server;

// Re-export primary types for convenience.
pub use client::UploadClient;
pub use config::ClientConfig;
pub use error::{ConfigError, TransportError, UploadError};
pub use packsync_protocol::UploadKind;
pub use progress::{NoProgress, ProgressListener};
pub use session::{ChunkTally, SessionState};
pub use types::{UploadErrorKind, UploadOutcome, UploadResult};
