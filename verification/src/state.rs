//! Session state machine.
//!
//! Holds everything one verification session knows between ticks: its phase,
//! whether a face is currently in view and the blink evaluator. Detection
//! results go in, a [`TickOutcome`] comes out, and terminal outcomes move the
//! phase to `Succeeded` or `Failed`.

use blinkgate_types::{DetectionResult, SessionPhase};

use crate::liveness::{BlinkProgress, LivenessEvaluator};
use crate::trials::{TrialDecision, TrialPolicy};
use crate::LivenessError;

/// What a single detection tick amounted to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TickOutcome {
    /// A face was in view.
    Presence {
        /// True on the tick the face came (back) into view.
        newly_detected: bool,
        blink: BlinkProgress,
    },
    /// No face; the trial policy allows another tick.
    NoDetection { trial: u32 },
    /// No face; the trial policy gave up. The session is now `Failed`.
    GaveUp { trial: u32 },
}

impl TickOutcome {
    pub fn is_terminal(&self) -> bool {
        match self {
            TickOutcome::Presence { blink, .. } => blink.is_confirmed(),
            TickOutcome::NoDetection { .. } => false,
            TickOutcome::GaveUp { .. } => true,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SessionState {
    phase: SessionPhase,
    face_present: bool,
    liveness: LivenessEvaluator,
    history: Vec<SessionPhase>,
}

impl SessionState {
    pub fn new(liveness: LivenessEvaluator) -> Self {
        Self {
            phase: SessionPhase::Idle,
            face_present: false,
            liveness,
            history: vec![SessionPhase::Idle],
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn face_present(&self) -> bool {
        self.face_present
    }

    pub fn baseline(&self) -> Option<f32> {
        self.liveness.baseline()
    }

    /// Every phase this session has been in, oldest first.
    pub fn history(&self) -> &[SessionPhase] {
        &self.history
    }

    /// Move to `next`, refusing anything but the single forward step.
    pub fn advance(&mut self, next: SessionPhase) -> Result<(), LivenessError> {
        if !self.phase.can_advance_to(next) {
            return Err(LivenessError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        tracing::debug!(from = %self.phase, to = %next, "session phase transition");
        self.phase = next;
        self.history.push(next);
        Ok(())
    }

    /// Apply one detection result.
    ///
    /// Presence feeds the blink evaluator; a confirmed blink moves the session
    /// to `Succeeded`. Absence clears the presence flag and the baseline, then
    /// asks `policy` whether to keep going; giving up moves to `Failed`.
    pub fn observe(
        &mut self,
        result: DetectionResult,
        policy: &mut dyn TrialPolicy,
    ) -> Result<TickOutcome, LivenessError> {
        if self.phase != SessionPhase::Verifying {
            return Err(LivenessError::NotVerifying(self.phase));
        }

        match result.eye_opening() {
            Some(distance) => {
                let newly_detected = !self.face_present;
                self.face_present = true;
                let blink = self.liveness.observe(distance);
                if blink.is_confirmed() {
                    self.advance(SessionPhase::Succeeded)?;
                }
                Ok(TickOutcome::Presence {
                    newly_detected,
                    blink,
                })
            }
            None => {
                self.face_present = false;
                self.liveness.reset();
                match policy.on_no_detection() {
                    TrialDecision::Continue { trial } => Ok(TickOutcome::NoDetection { trial }),
                    TrialDecision::Fail { trial } => {
                        self.advance(SessionPhase::Failed)?;
                        Ok(TickOutcome::GaveUp { trial })
                    }
                }
            }
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(LivenessEvaluator::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trials::CumulativeTrials;
    use blinkgate_types::EyeLandmarks;

    fn present(opening: f32) -> DetectionResult {
        DetectionResult::Present(EyeLandmarks::with_opening(50.0, opening))
    }

    fn verifying() -> SessionState {
        let mut state = SessionState::default();
        state.advance(SessionPhase::AwaitingCamera).unwrap();
        state.advance(SessionPhase::Verifying).unwrap();
        state
    }

    fn started_policy() -> CumulativeTrials {
        let mut policy = CumulativeTrials::default();
        policy.begin_trial();
        policy
    }

    #[test]
    fn rejects_ticks_outside_verifying() {
        let mut state = SessionState::default();
        let mut policy = started_policy();
        assert_eq!(
            state.observe(present(10.0), &mut policy),
            Err(LivenessError::NotVerifying(SessionPhase::Idle))
        );
    }

    #[test]
    fn rejects_skipping_phases() {
        let mut state = SessionState::default();
        assert!(state.advance(SessionPhase::Verifying).is_err());
        assert!(state.advance(SessionPhase::Idle).is_err());
        assert_eq!(state.history(), &[SessionPhase::Idle]);
    }

    #[test]
    fn blink_after_baseline_succeeds() {
        let mut state = verifying();
        let mut policy = started_policy();

        let first = state.observe(present(10.0), &mut policy).unwrap();
        assert_eq!(
            first,
            TickOutcome::Presence {
                newly_detected: true,
                blink: BlinkProgress::BaselineSet { baseline: 10.0 },
            }
        );
        assert!(!first.is_terminal());

        let second = state.observe(present(6.0), &mut policy).unwrap();
        assert!(second.is_terminal());
        assert_eq!(state.phase(), SessionPhase::Succeeded);
        assert_eq!(
            state.history(),
            &[
                SessionPhase::Idle,
                SessionPhase::AwaitingCamera,
                SessionPhase::Verifying,
                SessionPhase::Succeeded,
            ]
        );
    }

    #[test]
    fn newly_detected_only_on_transition() {
        let mut state = verifying();
        let mut policy = started_policy();
        state.observe(present(10.0), &mut policy).unwrap();
        let again = state.observe(present(10.0), &mut policy).unwrap();
        assert!(matches!(
            again,
            TickOutcome::Presence {
                newly_detected: false,
                ..
            }
        ));
    }

    #[test]
    fn absence_clears_baseline_and_presence() {
        let mut state = verifying();
        let mut policy = started_policy();
        state.observe(present(10.0), &mut policy).unwrap();
        assert_eq!(
            state.observe(DetectionResult::Absent, &mut policy).unwrap(),
            TickOutcome::NoDetection { trial: 1 }
        );
        assert!(!state.face_present());
        assert_eq!(state.baseline(), None);

        // 6 would have been a blink against the old baseline of 10.
        let reacquired = state.observe(present(6.0), &mut policy).unwrap();
        assert_eq!(
            reacquired,
            TickOutcome::Presence {
                newly_detected: true,
                blink: BlinkProgress::BaselineSet { baseline: 6.0 },
            }
        );
        assert_eq!(state.phase(), SessionPhase::Verifying);
    }

    #[test]
    fn exhausted_policy_fails_session() {
        let mut state = verifying();
        let mut policy = CumulativeTrials::new(1).unwrap();
        policy.begin_trial();
        assert_eq!(
            state.observe(DetectionResult::Absent, &mut policy).unwrap(),
            TickOutcome::GaveUp { trial: 1 }
        );
        assert_eq!(state.phase(), SessionPhase::Failed);
        assert_eq!(
            state.observe(DetectionResult::Absent, &mut policy),
            Err(LivenessError::NotVerifying(SessionPhase::Failed))
        );
    }
}
