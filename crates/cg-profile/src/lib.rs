//! Role Resolver Boundary
//!
//! The backend is the source of truth for roles. This crate provides the
//! [`RoleResolver`] trait the authorization core evaluates against, and
//! [`ProfileClient`], the HTTP implementation backed by
//! `GET /profile/get-role` with bearer authentication.
//!
//! The payload is validated strictly at this boundary: an unknown role value
//! or a shape mismatch is an explicit [`ProfileError::Malformed`], never a
//! silently coerced allow.

mod client;
mod error;

pub use client::{ProfileClient, RoleResolver};
pub use error::ProfileError;
