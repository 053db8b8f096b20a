//! Upload client configuration.

use std::fmt;
use std::time::Duration;

use packsync_protocol::constants::{
    DEFAULT_TIMEOUT, DEFAULT_USER_AGENT, ICON_CHUNK_SIZE, RECIPE_CHUNK_SIZE,
};
use packsync_protocol::{Endpoints, UploadKind};

use crate::error::ConfigError;

/// Settings shared by every request of an [`UploadClient`](crate::UploadClient).
#[derive(Clone)]
pub struct ClientConfig {
    /// Service root, e.g. `https://api.example.com/v1`.
    pub base_url: String,
    /// Modpack the uploads belong to.
    pub modpack_slug: String,
    /// Bearer token sent with every request.
    pub auth_token: String,
    /// Connect and read timeout for each request.
    pub timeout: Duration,
    pub user_agent: String,
    /// Gzip every chunk body before sending.
    pub compress_chunks: bool,
    pub recipe_chunk_size: usize,
    pub icon_chunk_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            modpack_slug: String::new(),
            auth_token: String::new(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            compress_chunks: true,
            recipe_chunk_size: RECIPE_CHUNK_SIZE,
            icon_chunk_size: ICON_CHUNK_SIZE,
        }
    }
}

// Keeps the token out of logs.
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("modpack_slug", &self.modpack_slug)
            .field("auth_token", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("compress_chunks", &self.compress_chunks)
            .field("recipe_chunk_size", &self.recipe_chunk_size)
            .field("icon_chunk_size", &self.icon_chunk_size)
            .finish()
    }
}

impl ClientConfig {
    /// Creates a config with default timeout, compression and chunk sizes.
    pub fn new(
        base_url: impl Into<String>,
        modpack_slug: impl Into<String>,
        auth_token: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            modpack_slug: modpack_slug.into(),
            auth_token: auth_token.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_compression(mut self, enabled: bool) -> Self {
        self.compress_chunks = enabled;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Overrides the chunk size used for `kind`.
    pub fn with_chunk_size(mut self, kind: UploadKind, chunk_size: usize) -> Self {
        match kind {
            UploadKind::Recipes => self.recipe_chunk_size = chunk_size,
            UploadKind::Icons => self.icon_chunk_size = chunk_size,
        }
        self
    }

    pub fn chunk_size_for(&self, kind: UploadKind) -> usize {
        match kind {
            UploadKind::Recipes => self.recipe_chunk_size,
            UploadKind::Icons => self.icon_chunk_size,
        }
    }

    /// Endpoint layout for `version` of this modpack.
    pub fn endpoints(&self, version: &str) -> Endpoints {
        Endpoints::new(&self.base_url, &self.modpack_slug, version)
    }

    /// Checks the parts a request cannot go out without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(&self.base_url).map_err(|e| ConfigError::InvalidUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl {
                url: self.base_url.clone(),
                reason: format!("unsupported scheme {}", url.scheme()),
            });
        }
        if self.modpack_slug.trim().is_empty() {
            return Err(ConfigError::EmptySlug);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = ClientConfig::new("https://api.example.com", "atm9", "tok");
        assert_eq!(cfg.timeout, Duration::from_secs(30));
        assert!(cfg.compress_chunks);
        assert_eq!(cfg.chunk_size_for(UploadKind::Recipes), 1024 * 1024);
        assert_eq!(cfg.chunk_size_for(UploadKind::Icons), 5 * 1024 * 1024);
        assert!(cfg.user_agent.starts_with("packsync/"));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn chunk_size_override_is_per_kind() {
        let cfg = ClientConfig::new("https://h", "p", "t").with_chunk_size(UploadKind::Icons, 64);
        assert_eq!(cfg.chunk_size_for(UploadKind::Icons), 64);
        assert_eq!(cfg.chunk_size_for(UploadKind::Recipes), RECIPE_CHUNK_SIZE);
    }

    #[test]
    fn debug_redacts_token() {
        let cfg = ClientConfig::new("https://h", "p", "super-secret");
        let printed = format!("{cfg:?}");
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn validate_rejects_bad_url() {
        let cfg = ClientConfig::new("not a url", "p", "t");
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidUrl { .. })));

        let cfg = ClientConfig::new("ftp://files.example.com", "p", "t");
        assert!(matches!(cfg.validate(), Err(ConfigError::InvalidUrl { .. })));
    }

    #[test]
    fn validate_rejects_empty_slug() {
        let cfg = ClientConfig::new("https://h", "  ", "t");
        assert!(matches!(cfg.validate(), Err(ConfigError::EmptySlug)));
    }

    #[test]
    fn endpoints_use_slug_and_version() {
        let cfg = ClientConfig::new("https://h/api", "atm9", "t");
        assert_eq!(
            cfg.endpoints("0.3.1").start(),
            "https://h/api/modpacks/atm9/versions/0.3.1/upload/start"
        );
    }
}
