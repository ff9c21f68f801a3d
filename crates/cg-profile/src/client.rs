//! HTTP role resolver
//!
//! Wraps the backend profile endpoints. Every request carries a bearer token
//! obtained from the session oracle at call time, and the client is built
//! with an explicit request timeout so a hung fetch fails closed instead of
//! leaving a guard evaluation pending.

use async_trait::async_trait;
use cg_common::{Role, RoleAssertion};
use cg_config::BackendConfig;
use cg_session::SessionOracle;
use reqwest::StatusCode;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::ProfileError;

/// Resolves the authenticated identity to a role assertion.
///
/// A fresh resolution is the source of truth for each guard evaluation;
/// implementations must not serve stale assertions.
#[async_trait]
pub trait RoleResolver: Send + Sync {
    async fn resolve(&self) -> Result<RoleAssertion, ProfileError>;
}

/// HTTP client for the backend profile endpoints.
pub struct ProfileClient {
    http: reqwest::Client,
    base_url: String,
    oracle: Arc<dyn SessionOracle>,
}

impl ProfileClient {
    /// Build a client from backend configuration.
    pub fn from_config(
        config: &BackendConfig,
        oracle: Arc<dyn SessionOracle>,
    ) -> Result<Self, ProfileError> {
        Self::new(
            &config.base_url,
            Duration::from_secs(config.role_fetch_timeout_secs),
            oracle,
        )
    }

    pub fn new(
        base_url: &str,
        timeout: Duration,
        oracle: Arc<dyn SessionOracle>,
    ) -> Result<Self, ProfileError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProfileError::http(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            oracle,
        })
    }

    /// Fetch the current identity's role assertion.
    pub async fn fetch_role(&self) -> Result<RoleAssertion, ProfileError> {
        let token = self
            .oracle
            .access_token()
            .await
            .map_err(|e| ProfileError::token(e.to_string()))?;

        let url = format!("{}/profile/get-role", self.base_url);
        debug!(%url, "Fetching role assertion");

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ProfileError::http(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ProfileError::Absent);
        }
        if !status.is_success() {
            warn!(status = status.as_u16(), "Role fetch rejected");
            return Err(ProfileError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProfileError::http(e.to_string()))?;

        let trimmed = body.trim();
        if trimmed.is_empty() || trimmed == "null" {
            return Err(ProfileError::Absent);
        }

        let assertion: RoleAssertion =
            serde_json::from_str(trimmed).map_err(|e| ProfileError::malformed(e.to_string()))?;

        debug!(role = %assertion.role, "Resolved role assertion");
        Ok(assertion)
    }

    /// Register the profile collected during onboarding.
    ///
    /// The backend expects `{"rol": ..., "data": {...}}` with the same bearer
    /// authentication as the role fetch.
    pub async fn register_profile(
        &self,
        role: Role,
        data: serde_json::Value,
    ) -> Result<(), ProfileError> {
        let token = self
            .oracle
            .access_token()
            .await
            .map_err(|e| ProfileError::token(e.to_string()))?;

        let url = format!("{}/profile/register", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&json!({ "rol": role, "data": data }))
            .send()
            .await
            .map_err(|e| ProfileError::http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Profile registration rejected");
            return Err(ProfileError::Status {
                status: status.as_u16(),
            });
        }

        debug!(role = %role, "Profile registered");
        Ok(())
    }
}

#[async_trait]
impl RoleResolver for ProfileClient {
    async fn resolve(&self) -> Result<RoleAssertion, ProfileError> {
        self.fetch_role().await
    }
}
