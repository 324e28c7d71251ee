//! Frontend configuration

use config::ConfigError;
use hireflow_core::tracing::InstrumentationConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Session timing. Fixed by the product, not read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub access_token_lifetime: Duration,
    /// Lifetime of the backend's refresh cookie. Informational only: the
    /// cookie is httpOnly and the server alone decides when it lapses.
    pub refresh_token_lifetime: Duration,
    /// Refresh once the access token has this little time left
    pub refresh_buffer: Duration,
    /// Token manager check interval
    pub heartbeat_interval: Duration,
    pub max_refresh_attempts: u32,
    /// Fixed delay between refresh attempts
    pub refresh_retry_delay: Duration,
}

impl SessionConfig {
    pub const ACCESS_TOKEN_LIFETIME: Duration = Duration::from_secs(15 * 60);
    pub const REFRESH_TOKEN_LIFETIME: Duration = Duration::from_secs(30 * 24 * 60 * 60);
    pub const REFRESH_BUFFER: Duration = Duration::from_secs(2 * 60);
    pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5 * 60);
    pub const MAX_REFRESH_ATTEMPTS: u32 = 3;
    pub const REFRESH_RETRY_DELAY: Duration = Duration::from_secs(1);

    /// Namespace prefixed to every persisted key
    pub const STORAGE_NAMESPACE: &'static str = "hireflow";
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            access_token_lifetime: Self::ACCESS_TOKEN_LIFETIME,
            refresh_token_lifetime: Self::REFRESH_TOKEN_LIFETIME,
            refresh_buffer: Self::REFRESH_BUFFER,
            heartbeat_interval: Self::HEARTBEAT_INTERVAL,
            max_refresh_attempts: Self::MAX_REFRESH_ATTEMPTS,
            refresh_retry_delay: Self::REFRESH_RETRY_DELAY,
        }
    }
}

/// Deployment configuration of a frontend embedding the session layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub logging: InstrumentationConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the portal REST API
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/api".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub namespace: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            namespace: SessionConfig::STORAGE_NAMESPACE.to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional file plus `HIREFLOW__*` environment
    /// overrides (e.g. `HIREFLOW__API__BASE_URL`)
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// resulting configuration is invalid
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        let settings = builder
            .add_source(config::Environment::with_prefix("HIREFLOW").separator("__"))
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = url::Url::parse(&self.api.base_url).map_err(|e| {
            ConfigError::Message(format!("api.base_url '{}' is invalid: {e}", self.api.base_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Message(format!(
                "api.base_url must use http or https, got '{}'",
                url.scheme()
            )));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Message(
                "api.timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.storage.namespace.trim().is_empty() {
            return Err(ConfigError::Message(
                "storage.namespace must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }
}
