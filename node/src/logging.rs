//! Structured logging initialisation for embedders and the daemon.
//!
//! Two output formats are supported:
//! - [`LogFormat::Human`]: coloured, human-readable lines (development).
//! - [`LogFormat::Json`]: newline-delimited JSON (log aggregation).
//!
//! `RUST_LOG` overrides the caller-supplied level when set.

use std::str::FromStr;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::VerificationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Human,
    Json,
}

impl FromStr for LogFormat {
    type Err = VerificationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "human" | "pretty" => Ok(LogFormat::Human),
            "json" => Ok(LogFormat::Json),
            other => Err(VerificationError::Config(format!(
                "unknown log format {other:?}, expected \"human\" or \"json\""
            ))),
        }
    }
}

/// Parse a configured log level into a filter.
///
/// Accepts a bare level or `EnvFilter` directives such as
/// `warn,blinkgate_node=debug`. Directives without a target must name a level.
pub fn level_filter(level: &str) -> Result<EnvFilter, VerificationError> {
    let invalid = |reason: String| {
        VerificationError::Config(format!("invalid log_level {level:?}: {reason}"))
    };
    if level.trim().is_empty() {
        return Err(invalid("empty".into()));
    }
    for directive in level.split(',').map(str::trim) {
        if !directive.is_empty() && !directive.contains('=') {
            directive
                .parse::<LevelFilter>()
                .map_err(|e| invalid(e.to_string()))?;
        }
    }
    EnvFilter::try_new(level).map_err(|e| invalid(e.to_string()))
}

/// Install the global tracing subscriber.
///
/// Fails if a global subscriber is already installed.
pub fn init_logging(format: LogFormat, level: &str) -> Result<(), VerificationError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => level_filter(level)?,
    };
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match format {
        LogFormat::Human => registry.with(fmt::layer().with_target(true)).try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(true).with_current_span(false))
            .try_init(),
    };
    installed.map_err(|e| VerificationError::Logging(e.to_string()))
}
