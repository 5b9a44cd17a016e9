use blinkgate_types::SessionPhase;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum LivenessError {
    #[error("blink ratio must lie strictly between 0 and 1, got {0}")]
    InvalidRatio(f32),

    #[error("maximum trials must be at least 1")]
    InvalidMaxTrials,

    #[error("session cannot move from {from} to {to}")]
    InvalidTransition { from: SessionPhase, to: SessionPhase },

    #[error("detection results are only accepted while verifying, session is {0}")]
    NotVerifying(SessionPhase),
}
