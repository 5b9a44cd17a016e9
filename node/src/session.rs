//! The detection loop for one verification session.
//!
//! A fixed-period timer starts detection calls. Only one call runs at a
//! time; ticks that fall due while it runs are skipped. The in-flight call is
//! its own `select!` branch next to the post-acquisition countdown, so a
//! slow detector neither delays countdown lines nor is delayed by them.

use std::future::Future;
use std::time::Duration;

use blinkgate_capture::{FaceDetector, MediaStream, PresentationSurface};
use blinkgate_types::DetectionResult;
use blinkgate_verification::{SessionState, TickOutcome, TrialPolicy};
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::dispatch::OutcomeDispatcher;
use crate::metrics::VerifierMetrics;
use crate::{status, VerificationError};

/// How the loop ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum LoopEnd {
    /// Blink confirmed; the session is `Succeeded`.
    Blink,
    /// The trial policy gave up; the session is `Failed`.
    GaveUp { trial: u32 },
}

/// Timing of a detection loop.
#[derive(Clone, Copy, Debug)]
pub(crate) struct LoopTiming {
    pub poll_interval: Duration,
    pub countdown_ticks: u32,
    pub countdown_interval: Duration,
}

/// Borrowed collaborators of a running session.
pub(crate) struct DetectionLoop<'a, D> {
    pub detector: &'a D,
    pub stream: &'a MediaStream,
    pub surface: &'a dyn PresentationSurface,
    pub metrics: &'a VerifierMetrics,
    pub timing: LoopTiming,
}

impl<D: FaceDetector> DetectionLoop<'_, D> {
    /// Poll until the session reaches a terminal phase.
    ///
    /// `state` must already be `Verifying`.
    pub async fn run(
        &self,
        state: &mut SessionState,
        policy: &mut dyn TrialPolicy,
        dispatcher: &mut OutcomeDispatcher,
    ) -> Result<LoopEnd, VerificationError> {
        let start = Instant::now();
        let mut poll = interval_at(start + self.timing.poll_interval, self.timing.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut remaining = self.timing.countdown_ticks;
        // A zero period panics in `interval_at`; with no countdown the branch
        // is disabled anyway.
        let countdown_period = self.timing.countdown_interval.max(Duration::from_millis(1));
        let mut countdown = interval_at(start + countdown_period, countdown_period);
        countdown.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut pending = None;
        loop {
            tokio::select! {
                biased;
                result = in_flight(&mut pending), if pending.is_some() => {
                    pending = None;
                    if let Some(end) = self.apply(result, state, policy, dispatcher)? {
                        return Ok(end);
                    }
                }
                _ = countdown.tick(), if remaining > 0 => {
                    self.surface.set_status(&status::countdown(remaining));
                    remaining -= 1;
                }
                _ = poll.tick(), if pending.is_none() => {
                    pending = Some(Box::pin(self.detect()));
                }
            }
        }
    }

    async fn detect(&self) -> DetectionResult {
        match self.detector.detect(self.stream).await {
            Ok(landmarks) => DetectionResult::from(landmarks),
            Err(e) => {
                tracing::warn!(stream = self.stream.id, error = %e, "detection failed, counting as no face");
                DetectionResult::Absent
            }
        }
    }

    fn apply(
        &self,
        result: DetectionResult,
        state: &mut SessionState,
        policy: &mut dyn TrialPolicy,
        dispatcher: &mut OutcomeDispatcher,
    ) -> Result<Option<LoopEnd>, VerificationError> {
        let outcome = state.observe(result, policy)?;
        tracing::debug!(?outcome, "detection tick");

        match outcome {
            TickOutcome::Presence {
                newly_detected,
                blink,
            } => {
                if newly_detected {
                    self.surface.set_status(status::FACE_DETECTED);
                    dispatcher.face_detected();
                }
                if blink.is_confirmed() {
                    self.surface.set_status(status::HUMAN_VERIFIED);
                    return Ok(Some(LoopEnd::Blink));
                }
                Ok(None)
            }
            TickOutcome::NoDetection { trial } => {
                self.metrics.no_detection_ticks.inc();
                self.surface.set_status(status::NO_FACE);
                dispatcher.no_detection(trial);
                Ok(None)
            }
            TickOutcome::GaveUp { trial } => {
                self.metrics.no_detection_ticks.inc();
                self.surface.set_status(status::FAILED);
                Ok(Some(LoopEnd::GaveUp { trial }))
            }
        }
    }
}

/// Resolves with the running detection call, or never when none is running.
async fn in_flight<F>(pending: &mut Option<F>) -> DetectionResult
where
    F: Future<Output = DetectionResult> + Unpin,
{
    match pending {
        Some(detection) => detection.await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventBus;
    use crate::Callbacks;
    use blinkgate_capture::Camera;
    use blinkgate_nullables::{NullCamera, NullDetector, NullSurface, ScriptedTick};
    use blinkgate_types::SessionPhase;
    use blinkgate_verification::CumulativeTrials;

    const TIMING: LoopTiming = LoopTiming {
        poll_interval: Duration::from_millis(500),
        countdown_ticks: 3,
        countdown_interval: Duration::from_secs(1),
    };

    fn verifying() -> SessionState {
        let mut state = SessionState::default();
        state.advance(SessionPhase::AwaitingCamera).unwrap();
        state.advance(SessionPhase::Verifying).unwrap();
        state
    }

    async fn run_script(
        detector: &NullDetector,
        surface: &NullSurface,
        policy: &mut CumulativeTrials,
    ) -> (LoopEnd, SessionState) {
        let camera = NullCamera::granting();
        let stream = camera.request_stream().await.unwrap();
        let metrics = VerifierMetrics::new().unwrap();
        let mut dispatcher = OutcomeDispatcher::new(Callbacks::new(), EventBus::new());
        let mut state = verifying();
        let end = DetectionLoop {
            detector,
            stream: &stream,
            surface,
            metrics: &metrics,
            timing: TIMING,
        }
        .run(&mut state, policy, &mut dispatcher)
        .await
        .unwrap();
        (end, state)
    }

    #[tokio::test(start_paused = true)]
    async fn blink_ends_loop() {
        let detector = NullDetector::openings([10.0, 6.0]);
        let surface = NullSurface::new();
        let mut policy = CumulativeTrials::default();
        policy.begin_trial();

        let (end, state) = run_script(&detector, &surface, &mut policy).await;
        assert_eq!(end, LoopEnd::Blink);
        assert_eq!(state.phase(), SessionPhase::Succeeded);
        assert_eq!(detector.calls(), 2);
        assert_eq!(
            surface.statuses(),
            vec![status::FACE_DETECTED, status::HUMAN_VERIFIED]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_interleaves_with_detection() {
        let detector = NullDetector::new(vec![
            ScriptedTick::Present { opening: 10.0 },
            ScriptedTick::Present { opening: 10.0 },
            ScriptedTick::Present { opening: 10.0 },
            ScriptedTick::Present { opening: 10.0 },
            ScriptedTick::Present { opening: 5.0 },
        ]);
        let surface = NullSurface::new();
        let mut policy = CumulativeTrials::default();
        policy.begin_trial();

        let (end, _) = run_script(&detector, &surface, &mut policy).await;
        assert_eq!(end, LoopEnd::Blink);
        let statuses = surface.statuses();
        assert_eq!(statuses.first().map(String::as_str), Some(status::FACE_DETECTED));
        assert!(statuses.contains(&"Starting in 3...".to_string()));
        assert!(statuses.contains(&"Starting in 2...".to_string()));
        assert!(!statuses.contains(&"Starting in 1...".to_string()));
        assert_eq!(statuses.last().map(String::as_str), Some(status::HUMAN_VERIFIED));
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_keeps_time_while_detector_runs() {
        let detector =
            NullDetector::openings([10.0, 5.0]).with_latency(Duration::from_millis(2_600));
        let surface = NullSurface::new();
        let camera = NullCamera::granting();
        let stream = camera.request_stream().await.unwrap();
        let metrics = VerifierMetrics::new().unwrap();
        let mut dispatcher = OutcomeDispatcher::new(Callbacks::new(), EventBus::new());
        let mut policy = CumulativeTrials::default();
        policy.begin_trial();
        let mut state = verifying();

        let detection = DetectionLoop {
            detector: &detector,
            stream: &stream,
            surface: &surface,
            metrics: &metrics,
            timing: TIMING,
        };
        let run = detection.run(&mut state, &mut policy, &mut dispatcher);
        tokio::pin!(run);

        // First detection runs from 0.5s to 3.1s.
        tokio::select! {
            _ = &mut run => panic!("loop ended while the first detection was running"),
            _ = tokio::time::sleep(Duration::from_millis(2_950)) => {}
        }
        assert_eq!(surface.statuses(), vec!["Starting in 3...", "Starting in 2..."]);

        tokio::select! {
            _ = &mut run => panic!("loop ended while the first detection was running"),
            _ = tokio::time::sleep(Duration::from_millis(100)) => {}
        }
        assert_eq!(
            surface.statuses(),
            vec!["Starting in 3...", "Starting in 2...", "Starting in 1..."]
        );

        assert_eq!(run.await.unwrap(), LoopEnd::Blink);
        assert_eq!(detector.max_in_flight(), 1);
        assert_eq!(
            surface.statuses()[3..],
            [status::FACE_DETECTED, status::HUMAN_VERIFIED]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn detector_error_counts_as_absence() {
        let detector = NullDetector::new(vec![
            ScriptedTick::Present { opening: 10.0 },
            ScriptedTick::Error {
                message: "inference failed".into(),
            },
            ScriptedTick::Present { opening: 6.0 },
            ScriptedTick::Present { opening: 4.0 },
        ]);
        let surface = NullSurface::new();
        let mut policy = CumulativeTrials::default();
        policy.begin_trial();

        let (end, _) = run_script(&detector, &surface, &mut policy).await;
        assert_eq!(end, LoopEnd::Blink);
        // The error reset the baseline, so 6 became the new baseline.
        assert_eq!(detector.calls(), 4);
        assert!(surface.statuses().contains(&status::NO_FACE.to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_trials_give_up_on_first_absence() {
        let detector = NullDetector::empty();
        let surface = NullSurface::new();
        let mut policy = CumulativeTrials::new(1).unwrap();
        policy.begin_trial();

        let (end, state) = run_script(&detector, &surface, &mut policy).await;
        assert_eq!(end, LoopEnd::GaveUp { trial: 1 });
        assert_eq!(state.phase(), SessionPhase::Failed);
        assert_eq!(detector.calls(), 1);
        assert_eq!(surface.last_status().as_deref(), Some(status::FAILED));
    }
}
