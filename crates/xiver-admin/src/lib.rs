//! Management API handlers for roles, permissions, users, API tokens and the
//! audit log

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod audit;
pub mod permission;
pub mod role;
pub mod token;
pub mod user;

mod prelude;

// vim: ts=4
