//! Role Resolver error types

use cg_common::GateError;
use thiserror::Error;

/// Outcomes of a role fetch that did not yield an assertion.
#[derive(Error, Debug)]
pub enum ProfileError {
    /// The identity provider could not supply an access token.
    #[error("Access token unavailable: {message}")]
    Token { message: String },

    /// Transport-level failure (connection refused, timeout, ...).
    #[error("Role fetch transport error: {message}")]
    Http { message: String },

    /// The backend answered with a non-success status.
    #[error("Role fetch rejected with status {status}")]
    Status { status: u16 },

    /// The backend answered 2xx but the payload failed strict validation.
    #[error("Malformed role payload: {message}")]
    Malformed { message: String },

    /// The backend has no profile record for this identity (empty/null body
    /// or 404).
    #[error("No profile record for this identity")]
    Absent,
}

impl ProfileError {
    pub fn token(message: impl Into<String>) -> Self {
        Self::Token {
            message: message.into(),
        }
    }

    pub fn http(message: impl Into<String>) -> Self {
        Self::Http {
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}

impl From<ProfileError> for GateError {
    fn from(err: ProfileError) -> Self {
        match err {
            ProfileError::Absent => GateError::RoleAbsent,
            other => GateError::role_fetch_failed(other.to_string()),
        }
    }
}
