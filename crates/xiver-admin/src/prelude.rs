pub use xiver_core::prelude::*;

// vim: ts=4
