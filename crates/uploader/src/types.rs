//! Upload outcome types.

use crate::error::UploadError;

/// Failure class of an upload, one per remediation advice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadErrorKind {
    /// The connect or read timeout elapsed.
    Timeout,
    /// The server name could not be resolved.
    HostResolution,
    /// The server address refused the connection.
    ConnectionRefused,
    /// The server answered with a non-2xx status.
    Http { status: u16 },
    /// Anything else.
    Unexpected,
}

/// Terminal outcome of one upload call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadResult {
    Success {
        session_id: String,
        /// Chunks the server holds after this call, including ones skipped
        /// because an earlier attempt had already delivered them.
        chunks_uploaded: u32,
        /// Uncompressed bytes covered by `chunks_uploaded`.
        bytes_uploaded: u64,
    },
    Error {
        kind: UploadErrorKind,
        message: String,
        cause: Option<String>,
    },
}

impl UploadResult {
    /// Builds the error outcome for `err`.
    pub fn from_error(err: &UploadError) -> Self {
        UploadResult::Error {
            kind: err.kind(),
            message: err.user_message(),
            cause: Some(err.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, UploadResult::Success { .. })
    }

    pub fn session_id(&self) -> Option<&str> {
        match self {
            UploadResult::Success { session_id, .. } => Some(session_id),
            UploadResult::Error { .. } => None,
        }
    }

    pub fn chunks_uploaded(&self) -> Option<u32> {
        match self {
            UploadResult::Success {
                chunks_uploaded, ..
            } => Some(*chunks_uploaded),
            UploadResult::Error { .. } => None,
        }
    }

    pub fn bytes_uploaded(&self) -> Option<u64> {
        match self {
            UploadResult::Success { bytes_uploaded, .. } => Some(*bytes_uploaded),
            UploadResult::Error { .. } => None,
        }
    }

    pub fn error_kind(&self) -> Option<UploadErrorKind> {
        match self {
            UploadResult::Error { kind, .. } => Some(*kind),
            UploadResult::Success { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            UploadResult::Error { message, .. } => Some(message),
            UploadResult::Success { .. } => None,
        }
    }
}

/// Result of [`UploadClient::upload_if_missing`](crate::UploadClient::upload_if_missing).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The server already has this upload; the payload was never built.
    Skipped,
    /// The payload was built and an upload attempted.
    Uploaded(UploadResult),
}
