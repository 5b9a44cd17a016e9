//! Session lifecycle phases.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a verification session is in its lifecycle.
///
/// Sessions only ever move forward:
/// `Idle → AwaitingCamera → Verifying → {Succeeded | Failed}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Created, surface not yet mounted.
    Idle,
    /// Surface mounted; loading models and waiting for the camera.
    AwaitingCamera,
    /// Camera acquired; the detection loop is polling.
    Verifying,
    /// A blink was confirmed. Terminal.
    Succeeded,
    /// The trial policy gave up. Terminal.
    Failed,
}

impl SessionPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionPhase::Succeeded | SessionPhase::Failed)
    }

    /// Whether `next` is the phase (or one of the phases) that may follow `self`.
    pub fn can_advance_to(&self, next: SessionPhase) -> bool {
        matches!(
            (self, next),
            (SessionPhase::Idle, SessionPhase::AwaitingCamera)
                | (SessionPhase::AwaitingCamera, SessionPhase::Verifying)
                | (SessionPhase::Verifying, SessionPhase::Succeeded)
                | (SessionPhase::Verifying, SessionPhase::Failed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::AwaitingCamera => "awaiting_camera",
            SessionPhase::Verifying => "verifying",
            SessionPhase::Succeeded => "succeeded",
            SessionPhase::Failed => "failed",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
