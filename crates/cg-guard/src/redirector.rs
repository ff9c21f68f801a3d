//! Post-login redirector
//!
//! After the identity provider completes its redirect-based login and the
//! browser lands on the callback route, this one-shot flow waits for the
//! session bootstrap to finish, confirms authentication, resolves the role
//! once, and dispatches to the first screen. All navigations replace history
//! so the callback URL is not revisitable.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cg_common::{routes, GateError};
use cg_profile::RoleResolver;
use cg_session::SessionHandle;
use tracing::{debug, info, warn};

use crate::guard::Decision;
use crate::navigator::{NavigationCommand, Navigator};

pub struct PostLoginRedirector {
    session: SessionHandle,
    resolver: Arc<dyn RoleResolver>,
    navigator: Arc<dyn Navigator>,
    fired: AtomicBool,
}

impl PostLoginRedirector {
    pub fn new(
        session: SessionHandle,
        resolver: Arc<dyn RoleResolver>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            session,
            resolver,
            navigator,
            fired: AtomicBool::new(false),
        }
    }

    /// Handle the callback arrival. Strictly one-shot: only the first caller
    /// runs the flow; later or concurrent calls get `None` and no navigation
    /// is issued for them.
    ///
    /// Dispatch: `Medico` to the doctor dashboard, `Paciente` to home,
    /// `no_profile` to onboarding, anything unresolvable to login. Note the
    /// asymmetry with the guards: only here does a `no_profile` assertion
    /// reach onboarding instead of login.
    pub async fn on_arrival(&self) -> Option<Decision> {
        if self.fired.swap(true, Ordering::SeqCst) {
            debug!("Callback arrival already handled");
            return None;
        }

        let state = self.session.wait_until_loaded().await;
        if !state.is_authenticated {
            info!("Callback reached without an authenticated session");
            return Some(self.redirect(routes::LOGIN));
        }

        match self.resolver.resolve().await {
            Ok(assertion) => {
                info!(role = %assertion.role, "Post-login dispatch");
                Some(self.redirect(assertion.role.home_route()))
            }
            Err(err) => {
                let gate: GateError = err.into();
                warn!(error = %gate, "Post-login role resolution failed");
                Some(self.redirect(routes::LOGIN))
            }
        }
    }

    fn redirect(&self, to: &str) -> Decision {
        self.navigator.navigate(NavigationCommand::replace(to));
        Decision::redirect(to)
    }
}
