//! ClinGate Configuration System
//!
//! TOML-based configuration with environment variable override support.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

mod loader;

pub use loader::ConfigLoader;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Root application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend: BackendConfig,
    pub identity: IdentityConfig,

    /// Enable development mode (verbose guard decision logging)
    pub dev_mode: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            identity: IdentityConfig::default(),
            dev_mode: false,
        }
    }
}

/// REST backend configuration (role resolution, profile registration)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL for profile endpoints, e.g. "http://localhost:3000/api"
    pub base_url: String,

    /// Request timeout for role fetches, in seconds.
    /// A hung fetch fails closed instead of leaving an evaluation pending.
    pub role_fetch_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_string(),
            role_fetch_timeout_secs: 10,
        }
    }
}

/// Identity provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Identity provider tenant domain
    pub domain: String,

    /// OAuth client ID registered with the provider
    pub client_id: String,

    /// API audience requested with access tokens
    pub audience: String,

    /// Application path the provider redirects back to after login
    pub redirect_path: String,

    /// Application path to land on after logout
    pub logout_return_path: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            domain: String::new(),
            client_id: String::new(),
            audience: String::new(),
            redirect_path: "/callback".to_string(),
            logout_return_path: "/home".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "backend.base_url must not be empty".to_string(),
            ));
        }
        if self.backend.role_fetch_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "backend.role_fetch_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if !self.identity.redirect_path.starts_with('/') {
            return Err(ConfigError::ValidationError(
                "identity.redirect_path must be an absolute path".to_string(),
            ));
        }
        Ok(())
    }
}
