//! Verifier configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use blinkgate_types::TrialScope;
use blinkgate_verification::{
    CumulativeTrials, LivenessEvaluator, PerSessionTrials, TrialPolicy, DEFAULT_BLINK_RATIO,
    DEFAULT_MAX_TRIALS,
};

use crate::logging::{level_filter, LogFormat};
use crate::VerificationError;

/// Configuration for an [`crate::Orchestrator`].
///
/// Can be loaded from a TOML file via [`VerifierConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VerifierConfig {
    /// Period of the detection loop, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Number of countdown lines shown after the camera is acquired.
    #[serde(default = "default_countdown_ticks")]
    pub countdown_ticks: u32,

    /// Gap between countdown lines, in milliseconds.
    #[serde(default = "default_countdown_interval_ms")]
    pub countdown_interval_ms: u64,

    /// Trial bound handed to the trial policy.
    #[serde(default = "default_max_trials")]
    pub max_trials: u32,

    /// Fraction of the baseline eye opening below which a blink is confirmed.
    #[serde(default = "default_blink_ratio")]
    pub blink_ratio: f32,

    /// Whether the trial bound spans invocations or single sessions.
    #[serde(default)]
    pub trial_scope: TrialScope,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_countdown_ticks() -> u32 {
    3
}

fn default_countdown_interval_ms() -> u64 {
    1_000
}

fn default_max_trials() -> u32 {
    DEFAULT_MAX_TRIALS
}

fn default_blink_ratio() -> f32 {
    DEFAULT_BLINK_RATIO
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl VerifierConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, VerificationError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| VerificationError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, VerificationError> {
        let config: Self =
            toml::from_str(s).map_err(|e| VerificationError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, VerificationError> {
        toml::to_string_pretty(self).map_err(|e| VerificationError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), VerificationError> {
        if self.poll_interval_ms == 0 {
            return Err(VerificationError::Config(
                "poll_interval_ms must be positive".into(),
            ));
        }
        if self.countdown_ticks > 0 && self.countdown_interval_ms == 0 {
            return Err(VerificationError::Config(
                "countdown_interval_ms must be positive".into(),
            ));
        }
        if self.max_trials == 0 {
            return Err(VerificationError::Config("max_trials must be at least 1".into()));
        }
        LivenessEvaluator::new(self.blink_ratio)?;
        self.log_format()?;
        level_filter(&self.log_level)?;
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn countdown_interval(&self) -> Duration {
        Duration::from_millis(self.countdown_interval_ms)
    }

    pub fn log_format(&self) -> Result<LogFormat, VerificationError> {
        self.log_format.parse()
    }

    /// A fresh blink evaluator for one session.
    pub fn liveness_evaluator(&self) -> Result<LivenessEvaluator, VerificationError> {
        Ok(LivenessEvaluator::new(self.blink_ratio)?)
    }

    /// The trial policy selected by `trial_scope`.
    pub fn trial_policy(&self) -> Result<Box<dyn TrialPolicy>, VerificationError> {
        Ok(match self.trial_scope {
            TrialScope::Cumulative => Box::new(CumulativeTrials::new(self.max_trials)?),
            TrialScope::PerSession => Box::new(PerSessionTrials::new(self.max_trials)?),
        })
    }
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            countdown_ticks: default_countdown_ticks(),
            countdown_interval_ms: default_countdown_interval_ms(),
            max_trials: default_max_trials(),
            blink_ratio: default_blink_ratio(),
            trial_scope: TrialScope::default(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}
