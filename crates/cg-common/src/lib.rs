use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod logging;

// ============================================================================
// Roles and Profile Assertions
// ============================================================================

/// Backend-declared role tied to an authenticated identity.
///
/// The wire values match the backend's `/profile/get-role` payload exactly;
/// anything else fails deserialization and is surfaced as a malformed payload
/// rather than silently coerced.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Role {
    #[serde(rename = "Medico")]
    Medico,
    #[serde(rename = "Paciente")]
    Paciente,
    /// Authenticated identity that has not completed onboarding yet.
    #[serde(rename = "no_profile")]
    NoProfile,
}

impl Role {
    /// The home route for this role, used for cross-redirects and the
    /// post-login dispatch.
    pub fn home_route(&self) -> &'static str {
        match self {
            Role::Medico => routes::DASHBOARD_MEDICO,
            Role::Paciente => routes::HOME,
            Role::NoProfile => routes::ONBOARDING,
        }
    }

    /// Wire representation, for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Medico => "Medico",
            Role::Paciente => "Paciente",
            Role::NoProfile => "no_profile",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A role assertion as returned by the Role Resolver.
///
/// Fetched fresh per guard evaluation and never cached by the authorization
/// core; the field names mirror the backend contract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoleAssertion {
    pub role: Role,
    pub nombre: String,
    pub apellidos: String,
    pub correo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_user: Option<i64>,
    #[serde(rename = "auth0Id")]
    pub auth0_id: String,
}

impl RoleAssertion {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.nombre, self.apellidos)
    }
}

// ============================================================================
// Route Paths
// ============================================================================

/// Application route paths shared by the guards, the redirector, and the
/// route table.
pub mod routes {
    pub const LOGIN: &str = "/login";
    pub const HOME: &str = "/home";
    pub const DASHBOARD_MEDICO: &str = "/dashboard-medico";
    pub const ONBOARDING: &str = "/onboarding";
    pub const CALLBACK: &str = "/callback";
}

// ============================================================================
// Errors
// ============================================================================

/// Authorization failure taxonomy.
///
/// Every variant is handled inside the authorization core and mapped to a
/// redirect target; none propagate to the presentation layer.
#[derive(Error, Debug)]
pub enum GateError {
    #[error("Session is not authenticated")]
    Unauthenticated,

    #[error("Role fetch failed: {message}")]
    RoleFetchFailed { message: String },

    #[error("No role assertion available for this identity")]
    RoleAbsent,

    #[error("Role mismatch: route requires {required}, identity has {actual}")]
    RoleMismatch { required: Role, actual: Role },
}

impl GateError {
    pub fn role_fetch_failed(message: impl Into<String>) -> Self {
        Self::RoleFetchFailed {
            message: message.into(),
        }
    }

    pub fn role_mismatch(required: Role, actual: Role) -> Self {
        Self::RoleMismatch { required, actual }
    }
}

pub type Result<T> = std::result::Result<T, GateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_values() {
        assert_eq!(serde_json::to_string(&Role::Medico).unwrap(), "\"Medico\"");
        assert_eq!(
            serde_json::to_string(&Role::NoProfile).unwrap(),
            "\"no_profile\""
        );

        let role: Role = serde_json::from_str("\"Paciente\"").unwrap();
        assert_eq!(role, Role::Paciente);
    }

    #[test]
    fn test_unknown_role_rejected() {
        let result: std::result::Result<Role, _> = serde_json::from_str("\"Admin\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_home_routes() {
        assert_eq!(Role::Medico.home_route(), routes::DASHBOARD_MEDICO);
        assert_eq!(Role::Paciente.home_route(), routes::HOME);
        assert_eq!(Role::NoProfile.home_route(), routes::ONBOARDING);
    }

    #[test]
    fn test_role_assertion_parsing() {
        let json = r#"{
            "role": "Medico",
            "nombre": "Ana",
            "apellidos": "García",
            "correo": "ana@example.com",
            "id_user": 42,
            "auth0Id": "auth0|abc123"
        }"#;

        let assertion: RoleAssertion = serde_json::from_str(json).unwrap();
        assert_eq!(assertion.role, Role::Medico);
        assert_eq!(assertion.display_name(), "Ana García");
        assert_eq!(assertion.id_user, Some(42));
    }
}
