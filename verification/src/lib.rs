//! Liveness decisions for a single verification session.
//!
//! Three pieces, all synchronous and free of I/O:
//! 1. **Liveness**: a blink detector that compares each eye opening against a
//!    per-session baseline.
//! 2. **Trials**: pluggable policies deciding whether a tick without a face
//!    ends the session or lets it continue.
//! 3. **State**: the session state machine that feeds detection results
//!    through both and only ever moves forward.
//!
//! The async orchestration (timers, camera, recorder) lives in `blinkgate-node`.

pub mod error;
pub mod liveness;
pub mod state;
pub mod trials;

pub use error::LivenessError;
pub use liveness::{BlinkProgress, LivenessEvaluator, DEFAULT_BLINK_RATIO};
pub use state::{SessionState, TickOutcome};
pub use trials::{
    CumulativeTrials, PerSessionTrials, TrialDecision, TrialPolicy, DEFAULT_MAX_TRIALS,
};
