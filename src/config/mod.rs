use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::{debug, info};

use crate::error::{ClientError, ClientResult};

// Default configuration values
const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
const DEFAULT_REFRESH_PATH: &str = "/api/auth/refresh";
const DEFAULT_LOGIN_PATH: &str = "/login";
const DEFAULT_HOME_PATH: &str = "/";
const SESSION_FILE_NAME: &str = "liftlog-session.json";

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the REST API
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
    /// Path of the credential renewal endpoint
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
    /// Unauthenticated entry point, navigated to when the session ends
    #[serde(default = "default_login_path")]
    pub login_path: String,
    /// Landing route for signed-in users
    #[serde(default = "default_home_path")]
    pub home_path: String,
    /// File backing the persisted credentials
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,
    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

// Default functions
fn default_api_base_url() -> String {
    std::env::var("LIFTLOG_API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string())
}

fn default_timeout() -> u64 {
    std::env::var("LIFTLOG_TIMEOUT_SECONDS")
        .ok()
        .and_then(|val| val.parse().ok())
        .unwrap_or(DEFAULT_TIMEOUT_SECONDS)
}

fn default_refresh_path() -> String {
    DEFAULT_REFRESH_PATH.to_string()
}

fn default_login_path() -> String {
    DEFAULT_LOGIN_PATH.to_string()
}

fn default_home_path() -> String {
    DEFAULT_HOME_PATH.to_string()
}

fn default_storage_path() -> PathBuf {
    if let Ok(path) = std::env::var("LIFTLOG_STORAGE_PATH") {
        return PathBuf::from(path);
    }

    directories::ProjectDirs::from("app", "liftlog", "liftlog")
        .map(|dirs| dirs.data_dir().join(SESSION_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(SESSION_FILE_NAME))
}

fn default_user_agent() -> String {
    format!("liftlog-client/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            timeout_seconds: default_timeout(),
            refresh_path: default_refresh_path(),
            login_path: default_login_path(),
            home_path: default_home_path(),
            storage_path: default_storage_path(),
            user_agent: default_user_agent(),
        }
    }
}

impl ClientConfig {
    /// Configuration pointing at a specific API, everything else default
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }

    /// Request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Check the values that would otherwise fail on first use
    pub fn validate(&self) -> ClientResult<()> {
        let url = reqwest::Url::parse(&self.api_base_url).map_err(|e| {
            ClientError::Configuration(format!(
                "api_base_url '{}' is not a valid URL: {}",
                self.api_base_url, e
            ))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::Configuration(format!(
                "api_base_url must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.timeout_seconds == 0 {
            return Err(ClientError::Configuration(
                "timeout_seconds must be greater than zero".to_string(),
            ));
        }
        for (key, value) in [
            ("refresh_path", &self.refresh_path),
            ("login_path", &self.login_path),
            ("home_path", &self.home_path),
        ] {
            if !value.starts_with('/') {
                return Err(ClientError::Configuration(format!(
                    "{key} must start with '/', got '{value}'"
                )));
            }
        }
        Ok(())
    }
}

/// Get the path to the configuration file
pub fn get_config_path() -> PathBuf {
    // Check for explicit config path from environment
    if let Ok(path) = std::env::var("LIFTLOG_CONFIG_PATH") {
        return PathBuf::from(path);
    }

    directories::ProjectDirs::from("app", "liftlog", "liftlog")
        .map(|dirs| dirs.config_dir().join("config.json"))
        .unwrap_or_else(|| PathBuf::from("config.json"))
}

/// Load configuration from file or create default
pub async fn load_or_create_config(path: &Path) -> ClientResult<ClientConfig> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        let default_config = ClientConfig::default();
        save_config(path, &default_config).await?;
        info!("Created default configuration at {}", path.display());
        return Ok(default_config);
    }

    let config_str = fs::read_to_string(path)
        .await
        .map_err(|e| ClientError::Configuration(format!("{}: {}", path.display(), e)))?;
    let config: ClientConfig = serde_json::from_str(&config_str)?;
    config.validate()?;
    debug!("Loaded configuration from {}", path.display());

    Ok(config)
}

/// Save configuration to file
pub async fn save_config(path: &Path, config: &ClientConfig) -> ClientResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ClientError::Configuration(format!("{}: {}", parent.display(), e)))?;
        }
    }

    let config_str = serde_json::to_string_pretty(config)?;
    fs::write(path, config_str)
        .await
        .map_err(|e| ClientError::Configuration(format!("{}: {}", path.display(), e)))?;
    debug!("Saved configuration to {}", path.display());

    Ok(())
}
