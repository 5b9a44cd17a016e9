//! Pre-built [`tracing::Span`] constructors for verifier operations.
//!
//! Consistent span names and fields make a session's log lines easy to
//! filter and correlate.

use tracing::{debug_span, info_span, Span};

/// Span covering one `verify` invocation, from mount to outcome.
pub fn verify_span() -> Span {
    info_span!("verify")
}

/// Span covering the detection loop of a counted trial.
pub fn session_span(trial: u32, stream: u64) -> Span {
    info_span!("session", trial = trial, stream = stream)
}

/// Span covering recorder stop, still extraction and artifact storage.
pub fn finish_span(stream: u64) -> Span {
    debug_span!("finish", stream = stream)
}
