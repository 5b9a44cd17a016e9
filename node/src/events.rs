//! Progress events published while a verification session runs.

use tokio::sync::broadcast;

/// Capacity of the event channel. Slow subscribers lag rather than block
/// the detection loop.
pub const EVENT_CAPACITY: usize = 64;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerificationEvent {
    /// Camera acquired and the trial counted.
    SessionStarted { trial: u32 },
    /// A face came into view.
    FaceDetected,
    /// A tick found no face and the session continues.
    NoDetection { trial: u32 },
    /// Blink confirmed and artifacts stored.
    Verified,
    /// The session ended without verification.
    Failed { reason: FailureReason },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureReason {
    /// No face within the allowed trials.
    TrialsExhausted,
    /// Blink confirmed but no still could be produced.
    ExtractionFailed,
    /// The recording could not be assembled.
    Recorder,
}

/// Fan-out for [`VerificationEvent`]s.
///
/// Publishing never fails: events sent while nobody listens are dropped.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<VerificationEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<VerificationEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: VerificationEvent) {
        tracing::trace!(?event, "verification event");
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
