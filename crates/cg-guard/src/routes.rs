//! Route table and navigation intents
//!
//! Per-route access metadata lives here; the router asks the table for a
//! [`RouteIntent`] when a navigation is attempted, and the intent is consumed
//! once by the guards.

use std::collections::HashSet;

use cg_common::{routes, Role};

use crate::navigator::NavigationEpoch;

/// Access requirement for a route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteAccess {
    /// Reachable without a session.
    Public,
    /// Requires an authenticated session with any resolvable role.
    Authenticated,
    /// Requires an authenticated session with this specific role.
    Role(Role),
}

/// A route and its access requirement.
#[derive(Debug, Clone)]
pub struct RouteSpec {
    pub path: String,
    pub access: RouteAccess,
}

/// One navigation attempt against one route, consumed by the guards.
#[derive(Debug, Clone)]
pub struct RouteIntent {
    pub target_path: String,
    /// `None` for routes that only require authentication.
    pub required_roles: Option<HashSet<Role>>,
    epoch: u64,
}

impl RouteIntent {
    pub fn new(
        target_path: impl Into<String>,
        required_roles: Option<HashSet<Role>>,
        epoch: u64,
    ) -> Self {
        Self {
            target_path: target_path.into(),
            required_roles,
            epoch,
        }
    }

    /// Epoch of the navigation attempt that produced this intent.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

/// Route metadata registry.
pub struct RouteTable {
    specs: Vec<RouteSpec>,
    epoch: NavigationEpoch,
}

impl RouteTable {
    pub fn new(epoch: NavigationEpoch) -> Self {
        Self {
            specs: Vec::new(),
            epoch,
        }
    }

    /// Register a route.
    pub fn route(mut self, path: impl Into<String>, access: RouteAccess) -> Self {
        self.specs.push(RouteSpec {
            path: path.into(),
            access,
        });
        self
    }

    /// The clinic application's route map.
    pub fn clinic_defaults(epoch: NavigationEpoch) -> Self {
        Self::new(epoch)
            .route("/", RouteAccess::Public)
            .route(routes::HOME, RouteAccess::Public)
            .route(routes::LOGIN, RouteAccess::Public)
            .route(routes::CALLBACK, RouteAccess::Public)
            .route(routes::ONBOARDING, RouteAccess::Authenticated)
            .route("/historial-clinico", RouteAccess::Authenticated)
            .route(routes::DASHBOARD_MEDICO, RouteAccess::Role(Role::Medico))
            .route("/citas-medico", RouteAccess::Role(Role::Medico))
            .route("/mis-citas", RouteAccess::Role(Role::Paciente))
            .route("/calendario", RouteAccess::Role(Role::Paciente))
    }

    pub fn find(&self, path: &str) -> Option<&RouteSpec> {
        self.specs.iter().find(|spec| spec.path == path)
    }

    /// Begin a navigation attempt against a known route, stamping the intent
    /// with a fresh epoch.
    pub fn begin(&self, spec: &RouteSpec) -> RouteIntent {
        let required_roles = match &spec.access {
            RouteAccess::Public | RouteAccess::Authenticated => None,
            RouteAccess::Role(role) => Some(HashSet::from([*role])),
        };
        RouteIntent::new(&spec.path, required_roles, self.epoch.begin())
    }

    /// Begin a navigation attempt at `path`, producing the intent the guards
    /// consume. Returns `None` for unregistered paths.
    pub fn intent_for(&self, path: &str) -> Option<RouteIntent> {
        Some(self.begin(self.find(path)?))
    }

    pub fn epoch(&self) -> &NavigationEpoch {
        &self.epoch
    }
}
