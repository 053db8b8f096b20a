//! Upload client error types.

use std::time::Duration;

use packsync_transfer::TransferError;

use crate::types::UploadErrorKind;

/// Network-level failure of a single request.
///
/// HTTP error statuses are not transport failures; they come back as a
/// normal response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out after {}s", format_secs(.after))]
    Timeout { after: Duration },

    #[error("could not resolve host {host}: {detail}")]
    HostResolution { host: String, detail: String },

    #[error("connection refused by {host}: {detail}")]
    ConnectionRefused { host: String, detail: String },

    #[error("request failed: {0}")]
    Other(String),
}

/// Whole seconds print bare, sub-second parts keep up to three decimals.
fn format_secs(d: &Duration) -> String {
    if d.subsec_nanos() == 0 {
        d.as_secs().to_string()
    } else {
        let text = format!("{:.3}", d.as_secs_f64());
        text.trim_end_matches('0').to_string()
    }
}

/// Invalid client configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid server URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("modpack slug is empty")]
    EmptySlug,

    #[error("auth token contains characters not allowed in a header")]
    InvalidToken,

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

/// Failure of one upload phase.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("server returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("transfer error: {0}")]
    Transfer(#[from] TransferError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("could not build payload: {0}")]
    Payload(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}

impl UploadError {
    /// Failure class used to pick remediation advice.
    pub fn kind(&self) -> UploadErrorKind {
        match self {
            UploadError::Transport(TransportError::Timeout { .. }) => UploadErrorKind::Timeout,
            UploadError::Transport(TransportError::HostResolution { .. }) => {
                UploadErrorKind::HostResolution
            }
            UploadError::Transport(TransportError::ConnectionRefused { .. }) => {
                UploadErrorKind::ConnectionRefused
            }
            UploadError::Http { status, .. } => UploadErrorKind::Http { status: *status },
            _ => UploadErrorKind::Unexpected,
        }
    }

    /// Actionable message shown to the user.
    pub fn user_message(&self) -> String {
        match self {
            UploadError::Transport(TransportError::Timeout { after }) => format!(
                "Upload timed out: the server did not respond within {} seconds. \
                 Check your connection and try again.",
                format_secs(after)
            ),
            UploadError::Transport(TransportError::HostResolution { host, .. }) => format!(
                "Could not resolve server host {host}. \
                 Check your internet connection and DNS settings."
            ),
            UploadError::Transport(TransportError::ConnectionRefused { host, .. }) => format!(
                "Could not connect to server {host}: connection refused. \
                 The service may be down, try again later."
            ),
            UploadError::Http { status, body } => {
                format!("Server returned HTTP {status}: {body}")
            }
            other => format!("Unexpected error: {other}"),
        }
    }
}
