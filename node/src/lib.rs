//! blinkgate verifier: drives a liveness check end to end.
//!
//! The [`Orchestrator`] wires the capture capabilities together:
//! - Mounts the presentation surface and loads the face detector
//! - Acquires the camera and starts recording
//! - Polls the detector and evaluates blinks against the trial policy
//! - Extracts a still from the recording and dispatches the outcome

pub mod artifacts;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod events;
mod lease;
pub mod logging;
pub mod metrics;
pub mod orchestrator;
mod session;
pub mod status;
pub mod tracing_spans;

pub use artifacts::ArtifactSlot;
pub use config::VerifierConfig;
pub use dispatch::{Callbacks, OutcomeDispatcher};
pub use error::VerificationError;
pub use events::{EventBus, FailureReason, VerificationEvent};
pub use logging::{init_logging, LogFormat};
pub use metrics::VerifierMetrics;
pub use orchestrator::{Orchestrator, VerificationOutcome, VerificationRequest};
