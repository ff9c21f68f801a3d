//! Navigation seam
//!
//! Guards never touch the presentation layer directly; they issue
//! [`NavigationCommand`]s through the [`Navigator`] trait the hosting router
//! implements. [`NavigationEpoch`] distinguishes navigation attempts so a
//! slow evaluation that resolves after a newer attempt began cannot apply a
//! stale redirect.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A navigation request issued by the authorization core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationCommand {
    pub path: String,
    /// Replace the current history entry instead of pushing a new one.
    pub replace: bool,
}

impl NavigationCommand {
    pub fn push(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            replace: false,
        }
    }

    pub fn replace(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            replace: true,
        }
    }
}

/// Router-side navigation operations.
pub trait Navigator: Send + Sync {
    fn navigate(&self, command: NavigationCommand);
    fn current_path(&self) -> String;
}

/// Monotonic counter identifying navigation attempts.
///
/// The router bumps the epoch when an attempt begins; a guard captures the
/// value through its [`RouteIntent`](crate::RouteIntent) and only issues its
/// redirect side effect if the captured epoch is still current at resolution
/// time. Decisions are returned either way.
#[derive(Clone, Default)]
pub struct NavigationEpoch {
    counter: Arc<AtomicU64>,
}

impl NavigationEpoch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new navigation attempt, returning its epoch.
    pub fn begin(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn current(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, epoch: u64) -> bool {
        self.current() == epoch
    }
}
