//! Caller callbacks and the at-most-once outcome dispatcher.

use std::fmt;

use crate::events::{EventBus, FailureReason, VerificationEvent};

type Callback = Box<dyn FnMut() + Send>;

/// Optional notifications bound to one invocation.
#[derive(Default)]
pub struct Callbacks {
    success: Option<Callback>,
    failure: Option<Callback>,
    no_detection: Option<Callback>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called once a blink is confirmed and the artifacts are stored.
    pub fn on_success(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.success = Some(Box::new(f));
        self
    }

    /// Called once when the session ends without verification.
    pub fn on_failure(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.failure = Some(Box::new(f));
        self
    }

    /// Called on every tick without a face that does not end the session.
    pub fn on_no_detection(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.no_detection = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("success", &self.success.is_some())
            .field("failure", &self.failure.is_some())
            .field("no_detection", &self.no_detection.is_some())
            .finish()
    }
}

/// Routes session outcomes to the caller's callbacks and the event bus.
///
/// Success and failure are terminal: whichever fires first wins and later
/// calls to either are ignored.
pub struct OutcomeDispatcher {
    callbacks: Callbacks,
    events: EventBus,
    settled: bool,
}

impl OutcomeDispatcher {
    pub fn new(callbacks: Callbacks, events: EventBus) -> Self {
        Self {
            callbacks,
            events,
            settled: false,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    pub fn session_started(&self, trial: u32) {
        self.events
            .emit(VerificationEvent::SessionStarted { trial });
    }

    pub fn face_detected(&self) {
        self.events.emit(VerificationEvent::FaceDetected);
    }

    pub fn no_detection(&mut self, trial: u32) {
        if self.settled {
            return;
        }
        self.events.emit(VerificationEvent::NoDetection { trial });
        if let Some(cb) = self.callbacks.no_detection.as_mut() {
            cb();
        }
    }

    pub fn success(&mut self) {
        if self.settled {
            return;
        }
        self.settled = true;
        self.events.emit(VerificationEvent::Verified);
        if let Some(cb) = self.callbacks.success.as_mut() {
            cb();
        }
    }

    pub fn failure(&mut self, reason: FailureReason) {
        if self.settled {
            return;
        }
        self.settled = true;
        self.events.emit(VerificationEvent::Failed { reason });
        if let Some(cb) = self.callbacks.failure.as_mut() {
            cb();
        }
    }
}
