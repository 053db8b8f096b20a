use serde::{Deserialize, Serialize};

use crate::types::UploadKind;

// ---------------------------------------------------------------------------
// Request payloads
// ---------------------------------------------------------------------------

/// Opens an upload session.
///
/// `final_hash` is committed here and is what the server verifies the
/// assembled payload against on completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartUploadRequest {
    #[serde(rename = "type")]
    pub kind: UploadKind,
    pub total_size: u64,
    pub chunk_size: u64,
    pub total_chunks: u32,
    pub final_hash: String,
}

// ---------------------------------------------------------------------------
// Response payloads
// ---------------------------------------------------------------------------

/// Response to the existence check.
///
/// A missing flag means "does not exist".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckUploadResponse {
    #[serde(default)]
    pub exists: bool,
}

/// Response to a session start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartUploadResponse {
    pub session_id: String,
}

/// Resume status of a session: chunk indices the server already holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadStatusResponse {
    #[serde(default)]
    pub chunks_received: Vec<u32>,
}
