//! Shared types, the storage adapter trait and the error taxonomy for Xiver.
//!
//! Every other crate in the workspace builds on these definitions, so the
//! adapter implementations and the feature crates can compile independently.

pub mod content;
pub mod error;
pub mod event;
pub mod identity;
pub mod meta_adapter;
pub mod prelude;
pub mod types;
pub mod utils;
pub mod value;

// vim: ts=4
