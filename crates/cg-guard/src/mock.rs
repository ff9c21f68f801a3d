//! In-memory test doubles
//!
//! Used by this crate's tests and by downstream consumers that need to
//! exercise guard flows without a router or a backend.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use cg_common::{Role, RoleAssertion};
use cg_profile::{ProfileError, RoleResolver};
use tokio::sync::Notify;

use crate::navigator::{NavigationCommand, Navigator};

/// A role assertion fixture for the given role.
pub fn assertion(role: Role) -> RoleAssertion {
    RoleAssertion {
        role,
        nombre: "Prueba".to_string(),
        apellidos: "Usuario".to_string(),
        correo: "prueba@clinica.example".to_string(),
        id_user: Some(1),
        auth0_id: "auth0|test".to_string(),
    }
}

/// Records navigation commands instead of driving a router.
pub struct MemoryNavigator {
    commands: Mutex<Vec<NavigationCommand>>,
    current: Mutex<String>,
}

impl MemoryNavigator {
    pub fn new(initial_path: impl Into<String>) -> Self {
        Self {
            commands: Mutex::new(Vec::new()),
            current: Mutex::new(initial_path.into()),
        }
    }

    pub fn commands(&self) -> Vec<NavigationCommand> {
        self.commands.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<NavigationCommand> {
        self.commands.lock().unwrap().last().cloned()
    }
}

impl Navigator for MemoryNavigator {
    fn navigate(&self, command: NavigationCommand) {
        *self.current.lock().unwrap() = command.path.clone();
        self.commands.lock().unwrap().push(command);
    }

    fn current_path(&self) -> String {
        self.current.lock().unwrap().clone()
    }
}

/// Always resolves the same assertion, counting invocations.
pub struct StaticResolver {
    assertion: RoleAssertion,
    calls: AtomicUsize,
}

impl StaticResolver {
    pub fn with_assertion(assertion: RoleAssertion) -> Self {
        Self {
            assertion,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn medico() -> Self {
        Self::with_assertion(assertion(Role::Medico))
    }

    pub fn paciente() -> Self {
        Self::with_assertion(assertion(Role::Paciente))
    }

    pub fn no_profile() -> Self {
        Self::with_assertion(assertion(Role::NoProfile))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RoleResolver for StaticResolver {
    async fn resolve(&self) -> Result<RoleAssertion, ProfileError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.assertion.clone())
    }
}

/// Always fails, with a selectable failure class, counting invocations.
pub struct FailingResolver {
    absent: bool,
    calls: AtomicUsize,
}

impl FailingResolver {
    /// Network/server failure (`RoleFetchFailed` class).
    pub fn fetch_failed() -> Self {
        Self {
            absent: false,
            calls: AtomicUsize::new(0),
        }
    }

    /// Valid response but no profile record (`RoleAbsent` class).
    pub fn absent() -> Self {
        Self {
            absent: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RoleResolver for FailingResolver {
    async fn resolve(&self) -> Result<RoleAssertion, ProfileError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.absent {
            Err(ProfileError::Absent)
        } else {
            Err(ProfileError::http("connection refused"))
        }
    }
}

/// Resolves only after [`GatedResolver::release`] is called, for tests that
/// race an in-flight evaluation against a newer navigation attempt.
pub struct GatedResolver {
    assertion: RoleAssertion,
    gate: Arc<Notify>,
}

impl GatedResolver {
    pub fn new(assertion: RoleAssertion) -> Self {
        Self {
            assertion,
            gate: Arc::new(Notify::new()),
        }
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }
}

#[async_trait]
impl RoleResolver for GatedResolver {
    async fn resolve(&self) -> Result<RoleAssertion, ProfileError> {
        self.gate.notified().await;
        Ok(self.assertion.clone())
    }
}
