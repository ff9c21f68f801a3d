//! Route Authorization Core
//!
//! Decides, per navigation attempt, whether to proceed or redirect, based on
//! session state and (when the route demands one) a freshly resolved role.
//!
//! Flow:
//! 1. The router creates a [`RouteIntent`] from the [`RouteTable`] for the
//!    attempted path, stamped with the current navigation epoch.
//! 2. [`AuthGuard`] checks the session; unauthenticated attempts redirect to
//!    login before the role resolver is ever consulted.
//! 3. Role-restricted routes additionally run a [`RoleGuard`]: the matching
//!    role is allowed through, the *other* clinic role is cross-redirected to
//!    its own home, and anything else fails closed to login.
//! 4. [`PostLoginRedirector`] runs once after the identity provider returns
//!    control, dispatching to the first screen by role.
//!
//! Every check fails closed; no error escapes to the presentation layer, and
//! rejected attempts are redirected with history-replacing navigation so the
//! blocked route cannot be reached with the back button.

mod guard;
mod navigator;
mod redirector;
mod routes;

pub mod mock;

pub use guard::{AuthGuard, Decision, RoleGuard, RouteAuthorizer};
pub use navigator::{NavigationCommand, NavigationEpoch, Navigator};
pub use redirector::PostLoginRedirector;
pub use routes::{RouteAccess, RouteIntent, RouteSpec, RouteTable};
