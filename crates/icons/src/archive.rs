//! Zip packaging of icon bundles.

use std::collections::BTreeSet;
use std::io::{Cursor, Write};
use std::path::Path;

use packsync_protocol::constants::ICON_METADATA_ENTRY;
use packsync_transfer::normalize_entry_path;
use tracing::{debug, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::error::ArchiveError;

/// A packed icon bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconArchive {
    /// Zip container bytes.
    pub bytes: Vec<u8>,
    /// Entry names in archive order, metadata first.
    pub entries: Vec<String>,
    /// Referenced files that were not found and left out.
    pub skipped: Vec<String>,
}

/// Packs `metadata` and the referenced icon files into a zip archive.
///
/// `metadata` must be a JSON document; it is stored as `icons.json`.
/// Every name in `files` is relative to `icon_dir` and becomes the entry
/// name. Names that are absolute or climb out with `..` are rejected.
/// Referenced files that do not exist are logged and skipped.
///
/// Entries carry a fixed timestamp, so the same inputs always produce the
/// same bytes. An interrupted upload can then resume against the digest
/// committed by the first attempt.
pub fn build_icon_archive(
    icon_dir: &Path,
    metadata: &[u8],
    files: &[String],
) -> Result<IconArchive, ArchiveError> {
    serde_json::from_slice::<serde_json::Value>(metadata)?;

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
        .unix_permissions(0o644);

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let mut entries = vec![ICON_METADATA_ENTRY.to_string()];
    let mut skipped = Vec::new();
    let mut seen = BTreeSet::from([ICON_METADATA_ENTRY.to_string()]);

    zip.start_file(ICON_METADATA_ENTRY, options)?;
    zip.write_all(metadata)?;

    for file in files {
        let entry = normalize_entry_path(file)?;
        if !seen.insert(entry.clone()) {
            debug!(entry = %entry, "duplicate icon reference");
            continue;
        }

        let path = icon_dir.join(&entry);
        if !path.is_file() {
            warn!(path = %path.display(), "referenced icon not found, skipping");
            skipped.push(entry);
            continue;
        }

        let data = std::fs::read(&path)?;
        zip.start_file(entry.as_str(), options)?;
        zip.write_all(&data)?;
        entries.push(entry);
    }

    let bytes = zip.finish()?.into_inner();
    debug!(
        entries = entries.len(),
        skipped = skipped.len(),
        size = bytes.len(),
        "icon archive built"
    );

    Ok(IconArchive {
        bytes,
        entries,
        skipped,
    })
}
