//! Session state channel
//!
//! A single watch channel carries the provider-owned session flags to every
//! reader. The controller is the only writer; handles are read-only, so the
//! authorization core cannot mutate session state by construction.

use tokio::sync::watch;
use tracing::debug;

/// Snapshot of the identity provider's session flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionState {
    pub is_authenticated: bool,
    pub is_loading: bool,
}

impl Default for SessionState {
    /// The provider starts in a loading state until its bootstrap
    /// (redirect handling, silent token restore) completes.
    fn default() -> Self {
        Self {
            is_authenticated: false,
            is_loading: true,
        }
    }
}

/// Create a connected controller/handle pair.
pub fn session_channel() -> (SessionController, SessionHandle) {
    let (tx, rx) = watch::channel(SessionState::default());
    (SessionController { tx }, SessionHandle { rx })
}

/// Write half of the session channel, driven by the identity provider
/// adapter.
pub struct SessionController {
    tx: watch::Sender<SessionState>,
}

impl SessionController {
    /// Flip the loading flag, keeping authentication as-is.
    pub fn set_loading(&self, is_loading: bool) {
        self.tx.send_modify(|state| state.is_loading = is_loading);
    }

    /// Mark the session authenticated and loaded (login completed).
    pub fn complete_login(&self) {
        debug!("Session authenticated");
        self.tx.send_modify(|state| {
            state.is_authenticated = true;
            state.is_loading = false;
        });
    }

    /// Mark the session unauthenticated and loaded (bootstrap found no
    /// session, or the user logged out).
    pub fn clear(&self) {
        debug!("Session cleared");
        self.tx.send_modify(|state| {
            state.is_authenticated = false;
            state.is_loading = false;
        });
    }

    /// Current state as seen by readers.
    pub fn snapshot(&self) -> SessionState {
        *self.tx.borrow()
    }

    /// Create another read-only handle.
    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            rx: self.tx.subscribe(),
        }
    }
}

/// Read-only view of the session, injected into guards and the redirector.
#[derive(Clone)]
pub struct SessionHandle {
    rx: watch::Receiver<SessionState>,
}

impl SessionHandle {
    pub fn snapshot(&self) -> SessionState {
        *self.rx.borrow()
    }

    pub fn is_authenticated(&self) -> bool {
        self.snapshot().is_authenticated
    }

    pub fn is_loading(&self) -> bool {
        self.snapshot().is_loading
    }

    /// Suspend until the session reports `is_loading == false`, returning the
    /// state observed at that moment. Resolves immediately if the session is
    /// already loaded; later loading flips are invisible to this call.
    pub async fn wait_until_loaded(&self) -> SessionState {
        let mut rx = self.rx.clone();
        let loaded = rx.wait_for(|state| !state.is_loading).await.map(|s| *s);
        match loaded {
            Ok(state) => state,
            // Controller dropped while still loading; report the last state.
            Err(_) => *rx.borrow(),
        }
    }
}
