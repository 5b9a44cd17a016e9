//! Shared utilities for the blinkgate liveness verifier.

pub mod logging;
pub mod time;

pub use logging::init_tracing;
pub use time::format_millis;
