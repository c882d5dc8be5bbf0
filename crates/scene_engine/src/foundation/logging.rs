//! Logging utilities
//!
//! Thin wrapper over the `log` facade; binaries call [`init`] once at startup.

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system.
///
/// Safe to call more than once; repeated initialization is ignored so tests
/// can call it freely.
pub fn init() {
    let _ = env_logger::try_init();
}
