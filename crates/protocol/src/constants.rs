use std::time::Duration;

/// Header carrying the digest of a chunk's uncompressed bytes.
pub const HEADER_CHUNK_HASH: &str = "x-chunk-hash";

/// Content type for JSON request bodies.
pub const CONTENT_TYPE_JSON: &str = "application/json; charset=utf-8";

/// Content type for raw chunk bodies.
pub const CONTENT_TYPE_OCTET_STREAM: &str = "application/octet-stream";

/// `Content-Encoding` value for gzip-compressed chunk bodies.
pub const ENCODING_GZIP: &str = "gzip";

/// Fixed user agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("packsync/", env!("CARGO_PKG_VERSION"));

/// Chunk size for recipe documents (1 MiB).
pub const RECIPE_CHUNK_SIZE: usize = 1024 * 1024;

/// Chunk size for icon archives (5 MiB).
pub const ICON_CHUNK_SIZE: usize = 5 * 1024 * 1024;

/// Connect/read timeout applied to every request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Name of the metadata document inside an icon archive.
pub const ICON_METADATA_ENTRY: &str = "icons.json";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_agent_carries_crate_version() {
        assert!(DEFAULT_USER_AGENT.starts_with("packsync/"));
        assert!(DEFAULT_USER_AGENT.len() > "packsync/".len());
    }

    #[test]
    fn icon_chunks_are_larger_than_recipe_chunks() {
        assert!(ICON_CHUNK_SIZE > RECIPE_CHUNK_SIZE);
    }
}
