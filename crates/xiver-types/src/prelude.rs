pub use crate::error::{Error, XvResult};
pub use crate::types::{Page, Patch, Timestamp};

pub use tracing::{debug, error, info, warn};

// vim: ts=4
