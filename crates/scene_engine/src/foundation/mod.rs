//! Foundation module - core utilities shared across the engine
//!
//! - Math types and the modelview matrix stack
//! - Logging utilities

pub mod logging;
pub mod math;
