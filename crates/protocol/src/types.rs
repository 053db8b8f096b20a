use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Logical kind of an upload.
///
/// The server keys sessions by `(modpack slug, version, kind)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UploadKind {
    /// Serialized recipe/metadata document.
    #[serde(rename = "recipes")]
    Recipes,
    /// Zip archive of item and fluid icons.
    #[serde(rename = "icons")]
    Icons,
}

impl UploadKind {
    /// Wire name used in query strings and JSON bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadKind::Recipes => "recipes",
            UploadKind::Icons => "icons",
        }
    }
}

impl fmt::Display for UploadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no known upload kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown upload kind: {0}")]
pub struct ParseKindError(pub String);

impl FromStr for UploadKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "recipes" => Ok(UploadKind::Recipes),
            "icons" => Ok(UploadKind::Icons),
            other => Err(ParseKindError(other.to_string())),
        }
    }
}
