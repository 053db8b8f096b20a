//! CLI configuration management.
//!
//! Configuration is stored as JSON:
//! - Linux: `~/.config/packsync/config.json`
//! - Windows: `%APPDATA%/packsync/config.json`
//!
//! `PACKSYNC_TOKEN` overrides the token from the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use packsync_uploader::{ClientConfig, UploadKind};
use serde::{Deserialize, Serialize};

/// Environment variable that overrides `auth_token`.
pub const TOKEN_ENV: &str = "PACKSYNC_TOKEN";

/// On-disk CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Service root, e.g. `https://api.example.com/v1`.
    pub server_url: String,
    pub modpack_slug: String,
    pub auth_token: String,
    pub timeout_secs: u64,
    pub compress_chunks: bool,
    pub recipe_chunk_size: usize,
    pub icon_chunk_size: usize,
}

impl Default for CliConfig {
    fn default() -> Self {
        let client = ClientConfig::default();
        Self {
            server_url: String::new(),
            modpack_slug: String::new(),
            auth_token: String::new(),
            timeout_secs: client.timeout.as_secs(),
            compress_chunks: client.compress_chunks,
            recipe_chunk_size: client.recipe_chunk_size,
            icon_chunk_size: client.icon_chunk_size,
        }
    }
}

impl CliConfig {
    /// Loads `path` (or the default location), falling back to defaults
    /// when the file does not exist. The token override is applied last.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => config_path()?,
        };

        let mut config = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let config: CliConfig = serde_json::from_str(&content)?;
            tracing::debug!(path = %path.display(), "configuration loaded");
            config
        } else {
            tracing::warn!(path = %path.display(), "config file not found, using defaults");
            CliConfig::default()
        };

        config.apply_token_override(std::env::var(TOKEN_ENV).ok());
        Ok(config)
    }

    /// Replaces the token with `token` when it is set and not blank.
    pub fn apply_token_override(&mut self, token: Option<String>) {
        if let Some(token) = token.filter(|t| !t.trim().is_empty()) {
            self.auth_token = token;
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::new(&self.server_url, &self.modpack_slug, &self.auth_token)
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_compression(self.compress_chunks)
            .with_chunk_size(UploadKind::Recipes, self.recipe_chunk_size)
            .with_chunk_size(UploadKind::Icons, self.icon_chunk_size)
    }
}

/// Returns the platform-specific configuration file path.
fn config_path() -> anyhow::Result<PathBuf> {
    Ok(config_base_dir()?.join("packsync").join("config.json"))
}

fn config_base_dir() -> anyhow::Result<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        let appdata = std::env::var("APPDATA")
            .map_err(|_| anyhow::anyhow!("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata))
    }

    #[cfg(not(target_os = "windows"))]
    {
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME")
            && !xdg.is_empty()
        {
            return Ok(PathBuf::from(xdg));
        }
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME is not set"))?;
        Ok(PathBuf::from(home).join(".config"))
    }
}
