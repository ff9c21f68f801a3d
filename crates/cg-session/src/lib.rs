//! Session-State Plumbing
//!
//! The identity provider owns the session; this crate provides the boundary
//! the authorization core reads it through:
//!
//! - [`SessionController`] / [`SessionHandle`]: a watch-channel pair. The
//!   provider adapter drives the controller on login/logout/token refresh;
//!   guards and the post-login redirector hold read-only handles.
//! - [`SessionOracle`]: the provider-facing trait (access tokens, interactive
//!   login, logout).
//! - [`TokenCache`]: caches an access token for a bounded interval so
//!   back-to-back guard evaluations do not hammer the provider.

mod oracle;
mod state;

pub use oracle::{
    authorize_redirect_url, logout_redirect_url, SessionError, SessionOracle, TokenCache,
};
pub use state::{session_channel, SessionController, SessionHandle, SessionState};
