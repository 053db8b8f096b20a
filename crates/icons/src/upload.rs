//! Archive-then-upload for icon bundles.

use std::path::Path;

use packsync_uploader::{ProgressListener, UploadClient, UploadError, UploadKind, UploadResult};
use tracing::{error, info};

use crate::archive::build_icon_archive;

/// Packs the icon bundle and uploads it as an `icons` payload.
///
/// The archive is built on the blocking pool. Packing failures come back
/// as an [`UploadResult::Error`] before any request is made.
pub async fn upload_icons(
    client: &UploadClient,
    version: &str,
    icon_dir: &Path,
    metadata: Vec<u8>,
    files: Vec<String>,
    listener: &dyn ProgressListener,
) -> UploadResult {
    let dir = icon_dir.to_path_buf();
    let built = tokio::task::spawn_blocking(move || build_icon_archive(&dir, &metadata, &files))
        .await
        .map_err(|e| UploadError::Runtime(format!("task join error: {e}")))
        .and_then(|result| result.map_err(|e| UploadError::Payload(e.to_string())));

    let archive = match built {
        Ok(archive) => archive,
        Err(e) => {
            error!(version, dir = %icon_dir.display(), error = %e, "icon upload failed");
            return UploadResult::from_error(&e);
        }
    };

    info!(
        version,
        entries = archive.entries.len(),
        skipped = archive.skipped.len(),
        size = archive.bytes.len(),
        "icon archive ready"
    );
    client
        .upload(version, UploadKind::Icons, &archive.bytes, listener)
        .await
}
