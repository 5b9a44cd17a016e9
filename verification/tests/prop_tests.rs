use proptest::prelude::*;

use blinkgate_types::{DetectionResult, EyeLandmarks, SessionPhase};
use blinkgate_verification::{
    CumulativeTrials, LivenessEvaluator, SessionState, TickOutcome, TrialPolicy,
};

fn tick() -> impl Strategy<Value = Option<f32>> {
    prop_oneof![
        1 => Just(None),
        4 => (0.5f32..50.0).prop_map(Some),
    ]
}

fn to_result(tick: Option<f32>) -> DetectionResult {
    tick.map(|d| EyeLandmarks::with_opening(20.0, d)).into()
}

proptest! {
    /// A blink is confirmed exactly when the current opening is strictly
    /// below ratio × baseline.
    #[test]
    fn blink_matches_ratio(baseline in 0.1f32..100.0, current in 0.0f32..100.0, ratio in 0.05f32..0.95) {
        let mut ev = LivenessEvaluator::new(ratio).unwrap();
        ev.observe(baseline);
        prop_assert_eq!(ev.observe(current).is_confirmed(), current < baseline * ratio);
    }

    /// The first measurement never confirms, whatever its value.
    #[test]
    fn first_measurement_never_confirms(d in 0.0f32..1000.0) {
        let mut ev = LivenessEvaluator::default();
        prop_assert!(!ev.observe(d).is_confirmed());
    }

    /// Phases only move forward and the session stops at the first terminal tick.
    #[test]
    fn session_phases_move_forward(ticks in prop::collection::vec(tick(), 1..40), trials in 1u32..8) {
        let mut policy = CumulativeTrials::default();
        for _ in 0..trials {
            policy.begin_trial();
        }
        let mut state = SessionState::default();
        state.advance(SessionPhase::AwaitingCamera).unwrap();
        state.advance(SessionPhase::Verifying).unwrap();

        for t in ticks {
            let outcome = state.observe(to_result(t), &mut policy).unwrap();
            if outcome.is_terminal() {
                prop_assert!(state.phase().is_terminal());
                break;
            }
            prop_assert_eq!(state.phase(), SessionPhase::Verifying);
        }

        let history = state.history();
        for pair in history.windows(2) {
            prop_assert!(pair[0].can_advance_to(pair[1]));
        }
    }

    /// The first presence tick after any absence sets a fresh baseline.
    #[test]
    fn presence_after_absence_sets_fresh_baseline(before in 1.0f32..50.0, after in 0.5f32..50.0) {
        let mut policy = CumulativeTrials::default();
        policy.begin_trial();
        let mut state = SessionState::default();
        state.advance(SessionPhase::AwaitingCamera).unwrap();
        state.advance(SessionPhase::Verifying).unwrap();

        state.observe(to_result(Some(before)), &mut policy).unwrap();
        state.observe(DetectionResult::Absent, &mut policy).unwrap();
        let outcome = state.observe(to_result(Some(after)), &mut policy).unwrap();
        let is_fresh_baseline = matches!(
            outcome,
            TickOutcome::Presence { newly_detected: true, blink: blinkgate_verification::BlinkProgress::BaselineSet { .. } }
        );
        prop_assert!(is_fresh_baseline);
        prop_assert_eq!(state.baseline(), Some(after));
    }

    /// The cumulative counter never decreases and only moves on begin_trial.
    #[test]
    fn cumulative_counter_monotonic(ops in prop::collection::vec(any::<bool>(), 0..64)) {
        let mut policy = CumulativeTrials::default();
        let mut last = policy.trials();
        let mut begins = 0u32;
        for begin in ops {
            if begin {
                policy.begin_trial();
                begins += 1;
            } else {
                policy.on_no_detection();
            }
            prop_assert!(policy.trials() >= last);
            last = policy.trials();
        }
        prop_assert_eq!(policy.trials(), begins);
    }
}
