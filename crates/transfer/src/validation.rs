use std::path::{Component, Path};

use crate::TransferError;

/// Turns a relative file path into a zip entry name.
///
/// The result uses `/` separators with `.` components dropped. Empty,
/// absolute, prefixed (`C:`) and `..`-traversing paths are rejected so an
/// archive can never unpack outside its root.
pub fn normalize_entry_path(file_path: &str) -> Result<String, TransferError> {
    let unified = file_path.replace('\\', "/");
    if unified.is_empty() {
        return Err(TransferError::InvalidPath("empty path".into()));
    }
    if unified.starts_with('/') {
        return Err(TransferError::InvalidPath(format!(
            "absolute path not allowed: {file_path}"
        )));
    }

    let mut parts = Vec::new();
    for component in Path::new(&unified).components() {
        match component {
            Component::Normal(part) => {
                let part = part.to_str().ok_or_else(|| {
                    TransferError::InvalidPath(format!("non UTF-8 path: {file_path}"))
                })?;
                if part.contains(':') {
                    return Err(TransferError::InvalidPath(format!(
                        "path prefix not allowed: {file_path}"
                    )));
                }
                parts.push(part);
            }
            Component::CurDir => {}
            Component::ParentDir => {
                return Err(TransferError::InvalidPath(format!(
                    "parent directory traversal not allowed: {file_path}"
                )));
            }
            Component::Prefix(_) | Component::RootDir => {
                return Err(TransferError::InvalidPath(format!(
                    "absolute path not allowed: {file_path}"
                )));
            }
        }
    }

    if parts.is_empty() {
        return Err(TransferError::InvalidPath(format!(
            "path names no file: {file_path}"
        )));
    }
    Ok(parts.join("/"))
}
