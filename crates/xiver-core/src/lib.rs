//! Core infrastructure for Xiver.
//!
//! Shared application state, the access evaluator, request extractors and the
//! authentication and permission middlewares used by the feature crates.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod access;
pub mod app;
pub mod extract;
pub mod middleware;
pub mod perm;
pub mod prelude;

pub use app::{App, AppState};
pub use extract::{Auth, OptionalAuth};
pub use middleware::PermissionCheckOutput;

// vim: ts=4
