//! Navigation guards
//!
//! Each evaluation is a fresh pass through a small state machine:
//! session check, then (if required) role resolution, ending in an
//! [`Decision`]. Nothing is retained between evaluations and nothing is
//! retried; a failed attempt redirects and the user starts over.

use std::sync::Arc;

use cg_common::{routes, GateError, Role};
use cg_profile::RoleResolver;
use cg_session::SessionHandle;
use tracing::{debug, info, warn};

use crate::navigator::{NavigationCommand, NavigationEpoch, Navigator};
use crate::routes::{RouteAccess, RouteIntent, RouteTable};

/// Outcome of a guard evaluation.
///
/// Redirects carry replace semantics: the rejected attempt must not remain
/// in navigation history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Redirect { to: String, replace: bool },
}

impl Decision {
    pub fn redirect(to: impl Into<String>) -> Self {
        Self::Redirect {
            to: to.into(),
            replace: true,
        }
    }

    pub fn is_allow(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Decision::Allow => None,
            Decision::Redirect { to, .. } => Some(to),
        }
    }
}

/// Issue the redirect side effect unless the triggering intent went stale
/// while the evaluation was in flight.
fn redirect_via(
    navigator: &dyn Navigator,
    epoch: &NavigationEpoch,
    intent: &RouteIntent,
    to: &str,
) -> Decision {
    if epoch.is_current(intent.epoch()) {
        navigator.navigate(NavigationCommand::replace(to));
    } else {
        debug!(
            target_path = %intent.target_path,
            redirect = %to,
            "Evaluation went stale; suppressing redirect side effect"
        );
    }
    Decision::redirect(to)
}

/// Base guard: requires an authenticated session whose identity resolves to
/// any role assertion at all. Fails closed to login.
pub struct AuthGuard {
    session: SessionHandle,
    resolver: Arc<dyn RoleResolver>,
    navigator: Arc<dyn Navigator>,
    epoch: NavigationEpoch,
}

impl AuthGuard {
    pub fn new(
        session: SessionHandle,
        resolver: Arc<dyn RoleResolver>,
        navigator: Arc<dyn Navigator>,
        epoch: NavigationEpoch,
    ) -> Self {
        Self {
            session,
            resolver,
            navigator,
            epoch,
        }
    }

    pub async fn evaluate(&self, intent: &RouteIntent) -> Decision {
        // Unauthenticated attempts short-circuit: the role resolver must
        // never be consulted without a session.
        if !self.session.is_authenticated() {
            info!(
                target_path = %intent.target_path,
                error = %GateError::Unauthenticated,
                "Navigation attempt rejected"
            );
            return redirect_via(&*self.navigator, &self.epoch, intent, routes::LOGIN);
        }

        match self.resolver.resolve().await {
            Ok(assertion) => {
                debug!(
                    target_path = %intent.target_path,
                    role = %assertion.role,
                    "Session authorized"
                );
                Decision::Allow
            }
            Err(err) => {
                let gate: GateError = err.into();
                warn!(
                    target_path = %intent.target_path,
                    error = %gate,
                    "Role resolution failed; failing closed"
                );
                redirect_via(&*self.navigator, &self.epoch, intent, routes::LOGIN)
            }
        }
    }
}

/// Role-specific guard for clinic routes.
///
/// Assumes [`AuthGuard`] already gated the parent route, so it resolves the
/// role directly without re-checking authentication. A mismatching *known*
/// role is cross-redirected to its own home area; an absent or unresolvable
/// role fails closed to login.
pub struct RoleGuard {
    required: Role,
    resolver: Arc<dyn RoleResolver>,
    navigator: Arc<dyn Navigator>,
    epoch: NavigationEpoch,
}

impl RoleGuard {
    fn new(
        required: Role,
        resolver: Arc<dyn RoleResolver>,
        navigator: Arc<dyn Navigator>,
        epoch: NavigationEpoch,
    ) -> Self {
        Self {
            required,
            resolver,
            navigator,
            epoch,
        }
    }

    /// Guard for doctor-only routes.
    pub fn medico(
        resolver: Arc<dyn RoleResolver>,
        navigator: Arc<dyn Navigator>,
        epoch: NavigationEpoch,
    ) -> Self {
        Self::new(Role::Medico, resolver, navigator, epoch)
    }

    /// Guard for patient-only routes.
    pub fn paciente(
        resolver: Arc<dyn RoleResolver>,
        navigator: Arc<dyn Navigator>,
        epoch: NavigationEpoch,
    ) -> Self {
        Self::new(Role::Paciente, resolver, navigator, epoch)
    }

    pub fn required_role(&self) -> Role {
        self.required
    }

    pub async fn evaluate(&self, intent: &RouteIntent) -> Decision {
        match self.resolver.resolve().await {
            Ok(assertion) if assertion.role == self.required => {
                debug!(
                    target_path = %intent.target_path,
                    role = %assertion.role,
                    "Role matched"
                );
                Decision::Allow
            }
            Ok(assertion) => match assertion.role {
                // The other clinic role gets sent home, not to login: the
                // user is valid, just in the wrong area.
                Role::Medico | Role::Paciente => {
                    let gate = GateError::role_mismatch(self.required, assertion.role);
                    info!(
                        target_path = %intent.target_path,
                        error = %gate,
                        "Cross-redirecting to role home"
                    );
                    redirect_via(
                        &*self.navigator,
                        &self.epoch,
                        intent,
                        assertion.role.home_route(),
                    )
                }
                Role::NoProfile => {
                    info!(
                        target_path = %intent.target_path,
                        "Identity has no profile; failing closed"
                    );
                    redirect_via(&*self.navigator, &self.epoch, intent, routes::LOGIN)
                }
            },
            Err(err) => {
                let gate: GateError = err.into();
                warn!(
                    target_path = %intent.target_path,
                    error = %gate,
                    "Role resolution failed; failing closed"
                );
                redirect_via(&*self.navigator, &self.epoch, intent, routes::LOGIN)
            }
        }
    }
}

/// Composes the route table with the guard chain the way the application's
/// nested routes do: the base guard gates every protected route, and
/// role-restricted routes additionally run their role guard.
pub struct RouteAuthorizer {
    table: RouteTable,
    auth: AuthGuard,
    medico: RoleGuard,
    paciente: RoleGuard,
}

impl RouteAuthorizer {
    pub fn new(
        table: RouteTable,
        session: SessionHandle,
        resolver: Arc<dyn RoleResolver>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        let epoch = table.epoch().clone();
        Self {
            auth: AuthGuard::new(
                session,
                resolver.clone(),
                navigator.clone(),
                epoch.clone(),
            ),
            medico: RoleGuard::medico(resolver.clone(), navigator.clone(), epoch.clone()),
            paciente: RoleGuard::paciente(resolver, navigator, epoch),
            table,
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Evaluate a navigation attempt to `path`.
    pub async fn authorize(&self, path: &str) -> Decision {
        let Some(spec) = self.table.find(path) else {
            debug!(%path, "Unregistered route; treating as public");
            return Decision::Allow;
        };

        if spec.access == RouteAccess::Public {
            return Decision::Allow;
        }

        let intent = self.table.begin(spec);

        let decision = self.auth.evaluate(&intent).await;
        if !decision.is_allow() {
            return decision;
        }

        match &spec.access {
            RouteAccess::Public | RouteAccess::Authenticated => Decision::Allow,
            RouteAccess::Role(Role::Medico) => self.medico.evaluate(&intent).await,
            RouteAccess::Role(Role::Paciente) => self.paciente.evaluate(&intent).await,
            // No route demands a no_profile role; fail closed if one ever does.
            RouteAccess::Role(Role::NoProfile) => Decision::redirect(routes::LOGIN),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_helpers() {
        assert!(Decision::Allow.is_allow());
        assert_eq!(Decision::Allow.redirect_target(), None);

        let redirect = Decision::redirect(routes::LOGIN);
        assert!(!redirect.is_allow());
        assert_eq!(redirect.redirect_target(), Some(routes::LOGIN));
        assert!(matches!(redirect, Decision::Redirect { replace: true, .. }));
    }

    #[test]
    fn test_role_guard_required_role() {
        let epoch = NavigationEpoch::new();
        let navigator: Arc<dyn Navigator> = Arc::new(crate::mock::MemoryNavigator::new("/"));
        let resolver: Arc<dyn RoleResolver> = Arc::new(crate::mock::StaticResolver::medico());

        let guard = RoleGuard::medico(resolver.clone(), navigator.clone(), epoch.clone());
        assert_eq!(guard.required_role(), Role::Medico);

        let guard = RoleGuard::paciente(resolver, navigator, epoch);
        assert_eq!(guard.required_role(), Role::Paciente);
    }
}
