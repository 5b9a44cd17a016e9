//! Nullable detector: replays a script of detection results.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use blinkgate_capture::{CaptureError, FaceDetector, MediaStream};
use blinkgate_types::EyeLandmarks;
use serde::{Deserialize, Serialize};

/// One scripted detection result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScriptedTick {
    /// A face whose eyes are open by `opening` pixels.
    Present { opening: f32 },
    /// No face in view.
    Absent,
    /// The detector call itself fails.
    Error { message: String },
}

impl ScriptedTick {
    fn into_result(self) -> Result<Option<EyeLandmarks>, CaptureError> {
        match self {
            ScriptedTick::Present { opening } => Ok(Some(EyeLandmarks::with_opening(120.0, opening))),
            ScriptedTick::Absent => Ok(None),
            ScriptedTick::Error { message } => Err(CaptureError::Detection(message)),
        }
    }
}

#[derive(Default)]
struct DetectorState {
    script: Mutex<VecDeque<ScriptedTick>>,
    loads: AtomicUsize,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

/// A detector that returns scripted results in order.
///
/// Once the script runs out every call returns the fallback tick
/// (`Absent` unless changed with [`NullDetector::then`]).
#[derive(Clone)]
pub struct NullDetector {
    fallback: ScriptedTick,
    load_error: Option<String>,
    latency: Duration,
    state: Arc<DetectorState>,
}

impl NullDetector {
    pub fn new(script: impl IntoIterator<Item = ScriptedTick>) -> Self {
        let state = DetectorState {
            script: Mutex::new(script.into_iter().collect()),
            ..Default::default()
        };
        Self {
            fallback: ScriptedTick::Absent,
            load_error: None,
            latency: Duration::ZERO,
            state: Arc::new(state),
        }
    }

    /// Shorthand: presence ticks with the given eye openings.
    pub fn openings(openings: impl IntoIterator<Item = f32>) -> Self {
        Self::new(
            openings
                .into_iter()
                .map(|opening| ScriptedTick::Present { opening }),
        )
    }

    /// A detector that never sees a face.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// A detector whose models fail to load.
    pub fn failing_load(message: impl Into<String>) -> Self {
        let mut detector = Self::empty();
        detector.load_error = Some(message.into());
        detector
    }

    /// What to return once the script is exhausted.
    pub fn then(mut self, fallback: ScriptedTick) -> Self {
        self.fallback = fallback;
        self
    }

    /// Make every detection call take `latency` to resolve.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Number of times models were loaded.
    pub fn loads(&self) -> usize {
        self.state.loads.load(Ordering::SeqCst)
    }

    /// Number of detection calls made.
    pub fn calls(&self) -> usize {
        self.state.calls.load(Ordering::SeqCst)
    }

    /// Highest number of detection calls that were outstanding at once.
    pub fn max_in_flight(&self) -> usize {
        self.state.max_in_flight.load(Ordering::SeqCst)
    }

    /// Scripted ticks not yet consumed.
    pub fn remaining(&self) -> usize {
        self.state.script.lock().unwrap().len()
    }
}

impl FaceDetector for NullDetector {
    async fn load_models(&self) -> Result<(), CaptureError> {
        self.state.loads.fetch_add(1, Ordering::SeqCst);
        match &self.load_error {
            Some(message) => Err(CaptureError::ModelLoad(message.clone())),
            None => Ok(()),
        }
    }

    async fn detect(&self, _stream: &MediaStream) -> Result<Option<EyeLandmarks>, CaptureError> {
        let outstanding = self.state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.state
            .max_in_flight
            .fetch_max(outstanding, Ordering::SeqCst);
        self.state.calls.fetch_add(1, Ordering::SeqCst);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let tick = self
            .state
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        self.state.in_flight.fetch_sub(1, Ordering::SeqCst);
        tick.into_result()
    }
}
