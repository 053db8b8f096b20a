//! Icon directory scanning.
//!
//! Recursively walks an icon directory and lists every regular file by
//! its relative path, normalized to forward slashes.

use std::path::Path;

use crate::error::ArchiveError;

/// Lists every file under `icon_dir`, sorted, relative to `icon_dir`.
///
/// Relative paths use `/` as separator (even on Windows) so they can be
/// used as archive entry names directly.
pub fn scan_icon_dir(icon_dir: &Path) -> Result<Vec<String>, ArchiveError> {
    let mut files = Vec::new();
    walk_dir(icon_dir, icon_dir, &mut files)?;
    files.sort();
    Ok(files)
}

fn walk_dir(root: &Path, current: &Path, files: &mut Vec<String>) -> Result<(), ArchiveError> {
    for entry in std::fs::read_dir(current)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            walk_dir(root, &path, files)?;
        } else if file_type.is_file() {
            let rel_path = path.strip_prefix(root).map_err(std::io::Error::other)?;
            files.push(rel_path.to_string_lossy().replace('\\', "/"));
        }
    }
    Ok(())
}
