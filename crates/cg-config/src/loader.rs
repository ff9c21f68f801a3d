//! Configuration loader with file and environment variable support

use crate::{AppConfig, ConfigError};
use std::env;
use std::path::PathBuf;
use tracing::info;

/// Standard config file search paths
const CONFIG_PATHS: &[&str] = &[
    "clingate.toml",
    "config.toml",
    "./config/clingate.toml",
    "./config/config.toml",
    "/etc/clingate/config.toml",
];

/// Configuration loader
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader with a specific config file path
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load configuration from file (if found) with environment variable overrides
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let mut config = AppConfig::default();

        if let Some(path) = self.find_config_file() {
            info!(?path, "Loading configuration from file");
            config = AppConfig::from_file(&path)?;
        }

        self.apply_env_overrides(&mut config);
        config.validate()?;

        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file(&self) -> Option<PathBuf> {
        if let Some(path) = &self.config_path {
            if path.exists() {
                return Some(path.clone());
            }
        }

        if let Ok(path) = env::var("CLINGATE_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        for path in CONFIG_PATHS {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        None
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&self, config: &mut AppConfig) {
        // Backend
        if let Ok(val) = env::var("CLINGATE_BACKEND_BASE_URL") {
            config.backend.base_url = val;
        }
        if let Ok(val) = env::var("CLINGATE_ROLE_FETCH_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                config.backend.role_fetch_timeout_secs = secs;
            }
        }

        // Identity provider
        if let Ok(val) = env::var("CLINGATE_IDENTITY_DOMAIN") {
            config.identity.domain = val;
        }
        if let Ok(val) = env::var("CLINGATE_IDENTITY_CLIENT_ID") {
            config.identity.client_id = val;
        }
        if let Ok(val) = env::var("CLINGATE_IDENTITY_AUDIENCE") {
            config.identity.audience = val;
        }
        if let Ok(val) = env::var("CLINGATE_IDENTITY_REDIRECT_PATH") {
            config.identity.redirect_path = val;
        }
        if let Ok(val) = env::var("CLINGATE_IDENTITY_LOGOUT_RETURN_PATH") {
            config.identity.logout_return_path = val;
        }

        // General
        if let Ok(val) = env::var("CLINGATE_DEV_MODE") {
            config.dev_mode = val.parse().unwrap_or(false);
        }
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
