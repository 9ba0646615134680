//! Content subsystem: schema registry, relation graph and entry service.
//!
//! HTTP handlers live in [`handler`] (management API) and [`public`]
//! (read-only API). Content change events are persisted by [`history`].

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod handler;
pub mod history;
mod prelude;
pub mod public;
pub mod relation;
pub mod schema;
pub mod service;

// vim: ts=4
