pub use crate::app::App;
pub use xiver_types::prelude::*;

// vim: ts=4
