//! The verification orchestrator.
//!
//! [`Orchestrator::verify`] runs one invocation end to end:
//!
//! 1. mount the presentation surface,
//! 2. load detector models and request the camera, racing the dismiss signal,
//! 3. count the trial and start recording,
//! 4. run the detection loop until a blink or until the trial policy gives up,
//! 5. stop the recorder, extract a still and dispatch the outcome.
//!
//! From step 3 onwards the stream is held in a lease and the recorder stops
//! when dropped, so every path out of `verify` gives the camera back. That
//! includes dropping the `verify` future part way through.

use std::sync::Arc;

use blinkgate_capture::{
    extract_still, wait_for_dismiss, Camera, CaptureRecorder, FaceDetector, FrameDecoder,
    MediaStream, PresentationSurface,
};
use blinkgate_types::{CapturedArtifacts, SessionPhase};
use blinkgate_verification::{SessionState, TrialPolicy};
use tokio::sync::{broadcast, watch};
use tokio::time::Instant;
use tracing::Instrument;

use crate::artifacts::ArtifactSlot;
use crate::config::VerifierConfig;
use crate::dispatch::{Callbacks, OutcomeDispatcher};
use crate::events::{EventBus, FailureReason, VerificationEvent};
use crate::lease::StreamLease;
use crate::metrics::VerifierMetrics;
use crate::session::{DetectionLoop, LoopEnd, LoopTiming};
use crate::tracing_spans::{finish_span, session_span, verify_span};
use crate::{status, VerificationError};

/// Parameters of a single [`Orchestrator::verify`] call.
#[derive(Default)]
pub struct VerificationRequest {
    /// Surface to mount. Falls back to the orchestrator's default surface.
    pub container: Option<Arc<dyn PresentationSurface>>,
    pub callbacks: Callbacks,
}

impl VerificationRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_container(mut self, container: Arc<dyn PresentationSurface>) -> Self {
        self.container = Some(container);
        self
    }

    pub fn with_callbacks(mut self, callbacks: Callbacks) -> Self {
        self.callbacks = callbacks;
        self
    }
}

/// How an invocation resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// Blink confirmed; the artifacts are also in the orchestrator's slot.
    Verified(CapturedArtifacts),
    /// No face within the allowed trials.
    Failed { trials: u32 },
    /// Dismissed before the camera was acquired.
    NotStarted,
}

pub struct Orchestrator<D, C, F> {
    config: VerifierConfig,
    detector: D,
    camera: C,
    decoder: F,
    default_surface: Arc<dyn PresentationSurface>,
    policy: Box<dyn TrialPolicy>,
    artifacts: ArtifactSlot,
    events: EventBus,
    metrics: Arc<VerifierMetrics>,
}

impl<D, C, F> Orchestrator<D, C, F>
where
    D: FaceDetector,
    C: Camera,
    F: FrameDecoder,
{
    /// Build an orchestrator. The trial policy is taken from
    /// `config.trial_scope` unless replaced with [`Self::with_trial_policy`].
    pub fn new(
        config: VerifierConfig,
        detector: D,
        camera: C,
        decoder: F,
        default_surface: Arc<dyn PresentationSurface>,
    ) -> Result<Self, VerificationError> {
        config.validate()?;
        let policy = config.trial_policy()?;
        let metrics = Arc::new(VerifierMetrics::new()?);
        Ok(Self {
            config,
            detector,
            camera,
            decoder,
            default_surface,
            policy,
            artifacts: ArtifactSlot::new(),
            events: EventBus::new(),
            metrics,
        })
    }

    /// Replace the trial policy. Trials already counted by the old policy
    /// are forgotten.
    pub fn with_trial_policy(mut self, policy: impl TrialPolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Trials counted so far.
    pub fn trials(&self) -> u32 {
        self.policy.trials()
    }

    /// The most recently verified pair, if any.
    pub fn artifacts(&self) -> Option<CapturedArtifacts> {
        self.artifacts.get()
    }

    /// A handle onto the artifact slot that stays valid while `verify` runs.
    pub fn artifact_slot(&self) -> ArtifactSlot {
        self.artifacts.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<VerificationEvent> {
        self.events.subscribe()
    }

    pub fn metrics(&self) -> Arc<VerifierMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Run one verification invocation.
    ///
    /// Setup failures (surface, detector, camera, recorder) and a failed
    /// still extraction are returned as errors. Running out of trials is an
    /// ordinary [`VerificationOutcome::Failed`].
    pub async fn verify(
        &mut self,
        request: VerificationRequest,
    ) -> Result<VerificationOutcome, VerificationError> {
        self.run(request).instrument(verify_span()).await
    }

    async fn run(
        &mut self,
        request: VerificationRequest,
    ) -> Result<VerificationOutcome, VerificationError> {
        let VerificationRequest {
            container,
            callbacks,
        } = request;
        let surface = container.unwrap_or_else(|| Arc::clone(&self.default_surface));
        let mut state = SessionState::new(self.config.liveness_evaluator()?);

        if let Err(e) = surface.mount() {
            tracing::error!(error = %e, "cannot mount verification surface");
            return Err(VerificationError::ContainerInvalid(e.to_string()));
        }
        surface.set_status(status::INITIALIZING);
        state.advance(SessionPhase::AwaitingCamera)?;

        let dismissed = surface.dismissed();
        let acquired = tokio::select! {
            biased;
            _ = wait_for_dismiss(dismissed.clone()) => None,
            result = self.acquire(surface.as_ref(), &dismissed) => result?,
        };
        let Some(stream) = acquired else {
            self.metrics.sessions_not_started.inc();
            tracing::info!("verification dismissed before camera acquisition");
            return Ok(VerificationOutcome::NotStarted);
        };
        let lease = StreamLease::new(&self.camera, stream);
        surface.set_status(status::CAMERA_READY);

        let trial = self.policy.begin_trial();
        self.metrics.sessions_started.inc();
        let started = Instant::now();
        let mut dispatcher = OutcomeDispatcher::new(callbacks, self.events.clone());
        dispatcher.session_started(trial);
        tracing::info!(trial, stream = lease.id(), "verification session started");

        let recorder = match self.camera.start_recording(lease.stream()) {
            Ok(recording) => CaptureRecorder::start(recording),
            Err(e) => {
                tracing::error!(trial, error = %e, "cannot start recording");
                lease.release();
                return Err(VerificationError::Recorder(e.to_string()));
            }
        };

        if let Err(e) = state.advance(SessionPhase::Verifying) {
            recorder.discard();
            lease.release();
            return Err(e.into());
        }
        surface.set_status(status::VERIFYING);

        let detection = DetectionLoop {
            detector: &self.detector,
            stream: lease.stream(),
            surface: surface.as_ref(),
            metrics: self.metrics.as_ref(),
            timing: LoopTiming {
                poll_interval: self.config.poll_interval(),
                countdown_ticks: self.config.countdown_ticks,
                countdown_interval: self.config.countdown_interval(),
            },
        };
        let end = detection
            .run(&mut state, self.policy.as_mut(), &mut dispatcher)
            .instrument(session_span(trial, lease.id()))
            .await;

        let outcome = match end {
            Ok(LoopEnd::Blink) => {
                let span = finish_span(lease.id());
                self.finish_verified(recorder, lease, surface.as_ref(), &mut dispatcher)
                    .instrument(span)
                    .await
            }
            Ok(LoopEnd::GaveUp { trial }) => {
                recorder.discard();
                lease.release();
                self.metrics.sessions_failed.inc();
                dispatcher.failure(FailureReason::TrialsExhausted);
                tracing::info!(trial, "verification failed, no face within allowed trials");
                Ok(VerificationOutcome::Failed { trials: trial })
            }
            Err(e) => {
                recorder.discard();
                lease.release();
                Err(e)
            }
        };

        self.metrics
            .session_duration_ms
            .observe(started.elapsed().as_secs_f64() * 1_000.0);
        tracing::debug!(phases = ?state.history(), "session finished");
        outcome
    }

    /// Load models, then request the camera.
    ///
    /// Returns `None` when the surface was dismissed along the way; a stream
    /// granted after dismissal is released before returning.
    async fn acquire(
        &self,
        surface: &dyn PresentationSurface,
        dismissed: &watch::Receiver<bool>,
    ) -> Result<Option<MediaStream>, VerificationError> {
        if let Err(e) = self.detector.load_models().await {
            tracing::error!(error = %e, "face detector failed to load");
            return Err(VerificationError::DetectorLoadFailure(e.to_string()));
        }
        surface.set_status(status::MODELS_READY);

        let dismissed_early = *dismissed.borrow();
        if dismissed_early {
            return Ok(None);
        }

        let stream = match self.camera.request_stream().await {
            Ok(stream) => stream,
            Err(e) => {
                surface.set_status(status::CAMERA_DENIED);
                tracing::error!(error = %e, "camera unavailable");
                return Err(VerificationError::CameraUnavailable(e.to_string()));
            }
        };

        let dismissed_late = *dismissed.borrow();
        if dismissed_late {
            tracing::debug!(stream = stream.id, "releasing stream granted after dismissal");
            self.camera.release(stream);
            return Ok(None);
        }
        Ok(Some(stream))
    }

    async fn finish_verified(
        &self,
        recorder: CaptureRecorder,
        lease: StreamLease<'_, C>,
        surface: &dyn PresentationSurface,
        dispatcher: &mut OutcomeDispatcher,
    ) -> Result<VerificationOutcome, VerificationError> {
        let video = recorder.stop().await;
        lease.release();

        let video = match video {
            Ok(video) => video,
            Err(e) => {
                tracing::error!(error = %e, "recording could not be assembled");
                surface.set_status(status::FAILED);
                dispatcher.failure(FailureReason::Recorder);
                return Err(VerificationError::Recorder(e.to_string()));
            }
        };

        let image = match extract_still(&self.decoder, &video).await {
            Ok(image) => image,
            Err(e) => {
                tracing::error!(video = %video.id, error = %e, "still extraction failed");
                self.metrics.extraction_failures.inc();
                surface.set_status(status::FAILED);
                dispatcher.failure(FailureReason::ExtractionFailed);
                return Err(VerificationError::ExtractionFailed(e.to_string()));
            }
        };

        let artifacts = CapturedArtifacts::pair(video, image)?;
        self.artifacts.store(artifacts.clone());
        self.metrics.sessions_verified.inc();
        dispatcher.success();
        tracing::info!(
            video = %artifacts.video().id,
            video_bytes = artifacts.video().len(),
            image_bytes = artifacts.image().bytes.len(),
            "human verified"
        );
        Ok(VerificationOutcome::Verified(artifacts))
    }
}
