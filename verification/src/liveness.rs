//! Blink detection against a per-session eye-opening baseline.
//!
//! The first measurement after the face is (re)acquired becomes the baseline.
//! Every later measurement is compared against it; an opening strictly below
//! `ratio × baseline` is a blink. Losing the face discards the baseline, so a
//! half-finished blink never carries over to the next acquisition.

use serde::{Deserialize, Serialize};

use crate::LivenessError;

/// Fraction of the baseline opening below which the eye counts as closed.
pub const DEFAULT_BLINK_RATIO: f32 = 0.7;

/// What a single measurement did to the evaluator.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum BlinkProgress {
    /// First measurement since (re)acquisition; stored as the baseline.
    BaselineSet { baseline: f32 },
    /// Compared against the baseline; eye still open.
    Open { baseline: f32, current: f32 },
    /// Compared against the baseline; eye closed. Sticky for the session.
    Confirmed { baseline: f32, current: f32 },
    /// Non-finite distance; nothing changed.
    Unmeasured,
}

impl BlinkProgress {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, BlinkProgress::Confirmed { .. })
    }
}

#[derive(Clone, Debug)]
pub struct LivenessEvaluator {
    ratio: f32,
    baseline: Option<f32>,
    confirmed: Option<(f32, f32)>,
}

impl LivenessEvaluator {
    pub fn new(ratio: f32) -> Result<Self, LivenessError> {
        if !(ratio > 0.0 && ratio < 1.0) {
            return Err(LivenessError::InvalidRatio(ratio));
        }
        Ok(Self {
            ratio,
            baseline: None,
            confirmed: None,
        })
    }

    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    pub fn baseline(&self) -> Option<f32> {
        self.baseline
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed.is_some()
    }

    /// Feed the eye opening measured on a presence tick.
    pub fn observe(&mut self, distance: f32) -> BlinkProgress {
        if let Some((baseline, current)) = self.confirmed {
            return BlinkProgress::Confirmed { baseline, current };
        }
        if !distance.is_finite() {
            return BlinkProgress::Unmeasured;
        }
        match self.baseline {
            None => {
                self.baseline = Some(distance);
                BlinkProgress::BaselineSet { baseline: distance }
            }
            Some(baseline) if distance < baseline * self.ratio => {
                self.confirmed = Some((baseline, distance));
                BlinkProgress::Confirmed {
                    baseline,
                    current: distance,
                }
            }
            Some(baseline) => BlinkProgress::Open {
                baseline,
                current: distance,
            },
        }
    }

    /// Forget the baseline after the face was lost.
    pub fn reset(&mut self) {
        self.baseline = None;
    }
}

impl Default for LivenessEvaluator {
    fn default() -> Self {
        Self {
            ratio: DEFAULT_BLINK_RATIO,
            baseline: None,
            confirmed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_measurement_sets_baseline() {
        let mut ev = LivenessEvaluator::default();
        assert_eq!(
            ev.observe(10.0),
            BlinkProgress::BaselineSet { baseline: 10.0 }
        );
        assert_eq!(ev.baseline(), Some(10.0));
        assert!(!ev.is_confirmed());
    }

    #[test]
    fn single_measurement_never_confirms() {
        let mut ev = LivenessEvaluator::default();
        assert!(!ev.observe(0.0).is_confirmed());
    }

    #[test]
    fn drop_below_ratio_confirms() {
        let mut ev = LivenessEvaluator::default();
        ev.observe(10.0);
        assert_eq!(
            ev.observe(6.0),
            BlinkProgress::Confirmed {
                baseline: 10.0,
                current: 6.0
            }
        );
    }

    #[test]
    fn exactly_at_ratio_is_still_open() {
        let mut ev = LivenessEvaluator::new(0.5).unwrap();
        ev.observe(10.0);
        assert_eq!(
            ev.observe(5.0),
            BlinkProgress::Open {
                baseline: 10.0,
                current: 5.0
            }
        );
    }

    #[test]
    fn baseline_is_not_updated_by_open_ticks() {
        let mut ev = LivenessEvaluator::default();
        ev.observe(10.0);
        ev.observe(20.0);
        assert_eq!(ev.baseline(), Some(10.0));
        // 13 < 0.7 * 20 but not < 0.7 * 10
        assert!(!ev.observe(13.0).is_confirmed());
    }

    #[test]
    fn reset_discards_partial_progress() {
        let mut ev = LivenessEvaluator::default();
        ev.observe(10.0);
        ev.reset();
        assert_eq!(ev.baseline(), None);
        assert_eq!(ev.observe(6.0), BlinkProgress::BaselineSet { baseline: 6.0 });
    }

    #[test]
    fn confirmation_is_sticky() {
        let mut ev = LivenessEvaluator::default();
        ev.observe(10.0);
        ev.observe(1.0);
        ev.reset();
        assert!(ev.observe(50.0).is_confirmed());
    }

    #[test]
    fn non_finite_distance_is_ignored() {
        let mut ev = LivenessEvaluator::default();
        assert_eq!(ev.observe(f32::NAN), BlinkProgress::Unmeasured);
        assert_eq!(ev.baseline(), None);
        ev.observe(10.0);
        assert_eq!(ev.observe(f32::INFINITY), BlinkProgress::Unmeasured);
        assert_eq!(ev.baseline(), Some(10.0));
    }

    #[test]
    fn ratio_must_be_a_proper_fraction() {
        assert_eq!(
            LivenessEvaluator::new(0.0).unwrap_err(),
            LivenessError::InvalidRatio(0.0)
        );
        assert!(LivenessEvaluator::new(1.0).is_err());
        assert!(LivenessEvaluator::new(f32::NAN).is_err());
        assert!(LivenessEvaluator::new(0.7).is_ok());
    }
}
