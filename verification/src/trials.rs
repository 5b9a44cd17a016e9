//! Trial policies: how many chances a caller gets before a tick without a
//! face ends the session.
//!
//! A *trial* is one invocation that reached camera acquisition. The counter
//! is bumped exactly once per such invocation, before the first tick, and is
//! never decremented or reset. What differs between policies is how a
//! no-detection tick is judged against the maximum.

use crate::LivenessError;

/// Maximum number of trials before a no-detection tick fails the session.
pub const DEFAULT_MAX_TRIALS: u32 = 5;

/// Verdict for a tick on which no face was found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrialDecision {
    /// Keep polling; the caller is told no face was seen.
    Continue { trial: u32 },
    /// Give up; the session fails.
    Fail { trial: u32 },
}

impl TrialDecision {
    pub fn is_fail(&self) -> bool {
        matches!(self, TrialDecision::Fail { .. })
    }
}

/// Injected limit on verification attempts.
pub trait TrialPolicy: Send + Sync {
    /// Record a new trial. Called once per invocation, right after camera
    /// acquisition. Returns the trial number after incrementing.
    fn begin_trial(&mut self) -> u32;

    /// Judge a tick on which no face was detected.
    fn on_no_detection(&mut self) -> TrialDecision;

    /// Trials recorded so far.
    fn trials(&self) -> u32;

    fn max_trials(&self) -> u32;
}

/// Counts invocations over the policy's whole lifetime.
///
/// Once `max_trials` invocations have started, every later invocation fails
/// on its first tick without a face. Earlier invocations never fail; they
/// keep reporting no-detection for as long as the face stays away.
#[derive(Clone, Debug)]
pub struct CumulativeTrials {
    max_trials: u32,
    trials: u32,
}

impl CumulativeTrials {
    pub fn new(max_trials: u32) -> Result<Self, LivenessError> {
        if max_trials == 0 {
            return Err(LivenessError::InvalidMaxTrials);
        }
        Ok(Self {
            max_trials,
            trials: 0,
        })
    }
}

impl Default for CumulativeTrials {
    fn default() -> Self {
        Self {
            max_trials: DEFAULT_MAX_TRIALS,
            trials: 0,
        }
    }
}

impl TrialPolicy for CumulativeTrials {
    fn begin_trial(&mut self) -> u32 {
        self.trials = self.trials.saturating_add(1);
        self.trials
    }

    fn on_no_detection(&mut self) -> TrialDecision {
        if self.trials >= self.max_trials {
            TrialDecision::Fail { trial: self.trials }
        } else {
            TrialDecision::Continue { trial: self.trials }
        }
    }

    fn trials(&self) -> u32 {
        self.trials
    }

    fn max_trials(&self) -> u32 {
        self.max_trials
    }
}

/// Bounds no-detection ticks within each session.
///
/// The invocation counter is still kept for reporting, but a session fails
/// only once it has itself seen `max_trials` ticks without a face.
#[derive(Clone, Debug)]
pub struct PerSessionTrials {
    max_trials: u32,
    trials: u32,
    misses: u32,
}

impl PerSessionTrials {
    pub fn new(max_trials: u32) -> Result<Self, LivenessError> {
        if max_trials == 0 {
            return Err(LivenessError::InvalidMaxTrials);
        }
        Ok(Self {
            max_trials,
            trials: 0,
            misses: 0,
        })
    }

    /// No-detection ticks seen in the current session.
    pub fn misses(&self) -> u32 {
        self.misses
    }
}

impl TrialPolicy for PerSessionTrials {
    fn begin_trial(&mut self) -> u32 {
        self.trials = self.trials.saturating_add(1);
        self.misses = 0;
        self.trials
    }

    fn on_no_detection(&mut self) -> TrialDecision {
        self.misses = self.misses.saturating_add(1);
        if self.misses >= self.max_trials {
            TrialDecision::Fail { trial: self.trials }
        } else {
            TrialDecision::Continue { trial: self.trials }
        }
    }

    fn trials(&self) -> u32 {
        self.trials
    }

    fn max_trials(&self) -> u32 {
        self.max_trials
    }
}
