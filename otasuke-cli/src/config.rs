use std::path::{Path, PathBuf};
use std::time::Duration;

use otasuke_client::ClientConfig;
use otasuke_client::config::DEFAULT_API_BASE_URL;
use otasuke_client::navigation::DEFAULT_LOGIN_PATH;
use serde::{Deserialize, Serialize};

use crate::cli::OutputFormat;
use crate::error::ConfigError;

const CONFIG_FILE_NAME: &str = "config.toml";

/// Settings persisted in `config.toml`.
///
/// Command line flags and environment variables take precedence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_url: String,
    pub login_path: String,
    pub timeout: u64,
    pub output_format: OutputFormat,
    pub colored: bool,
    pub credentials_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_BASE_URL.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            timeout: 30,
            output_format: OutputFormat::Pretty,
            colored: true,
            credentials_path: None,
        }
    }
}

impl AppConfig {
    /// Load from `path`, or the default location. A missing file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()?,
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self, path: Option<&Path>) -> Result<(), ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()?,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn reset(path: Option<&Path>) -> Result<(), ConfigError> {
        Self::default().save(path)
    }

    pub fn show(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join("otasuke").join(CONFIG_FILE_NAME))
    }

    /// Client settings, with `api_url` overriding the configured base URL.
    pub fn client_config(&self, api_url: Option<&str>) -> otasuke_client::Result<ClientConfig> {
        let config = ClientConfig::new(api_url.unwrap_or(&self.api_url))?
            .with_login_path(self.login_path.clone())
            .with_request_timeout(Duration::from_secs(self.timeout));
        Ok(config)
    }
}
