use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Environment variable that overrides the configured API base URL.
pub const API_URL_ENV: &str = "TRACTION_API_URL";

/// Environment variable that overrides the configuration directory.
pub const CONFIG_DIR_ENV: &str = "TRACTION_CONFIG_DIR";

const CONFIG_FILE: &str = "config.toml";

fn default_api_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Client configuration.
///
/// Loaded from `config.toml` in the Traction config directory; the API base
/// URL can be overridden with the `TRACTION_API_URL` environment variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the tracker API (without the `/api/v1` prefix).
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Directory holding the config file and persisted credentials.
    #[serde(skip)]
    pub config_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            config_dir: PathBuf::new(),
        }
    }
}

impl Config {
    /// Resolve the config directory, creating it if necessary.
    pub fn config_dir() -> Result<PathBuf> {
        let dir = match std::env::var(CONFIG_DIR_ENV) {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => dirs::config_dir()
                .context("Failed to get config directory")?
                .join("traction"),
        };

        std::fs::create_dir_all(&dir).context("Failed to create config directory")?;
        Ok(dir)
    }

    /// Load configuration from disk, falling back to defaults when no file
    /// exists yet. `TRACTION_API_URL` takes precedence over the file.
    pub fn load() -> Result<Self> {
        let dir = Self::config_dir()?;
        let path = dir.join(CONFIG_FILE);

        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(&path).context("Failed to read config file")?;
            toml::from_str(&raw).context("Failed to parse config file")?
        } else {
            Self::default()
        };

        if let Ok(url) = std::env::var(API_URL_ENV) {
            config.api_base_url = url;
        }

        config.config_dir = dir;
        config.validate()?;

        Ok(config)
    }

    /// Persist configuration to disk.
    pub fn save(&self) -> Result<()> {
        let path = self.config_dir.join(CONFIG_FILE);
        let raw = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&path, raw).context("Failed to write config file")?;

        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Validate the configured values.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.api_base_url)
            .with_context(|| format!("Invalid API base URL: {}", self.api_base_url))?;

        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be greater than zero");
        }

        Ok(())
    }
}
