use thiserror::Error;

/// Setup-time and dispatch-time failures of a verification invocation.
///
/// Running out of trials is not an error: it resolves the invocation as
/// [`crate::VerificationOutcome::Failed`] and fires the failure callback.
#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("invalid container: {0}")]
    ContainerInvalid(String),

    #[error("detector failed to load: {0}")]
    DetectorLoadFailure(String),

    #[error("camera unavailable: {0}")]
    CameraUnavailable(String),

    #[error("recorder error: {0}")]
    Recorder(String),

    #[error("still extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("artifact error: {0}")]
    Artifact(#[from] blinkgate_types::TypesError),

    #[error("liveness error: {0}")]
    Liveness(#[from] blinkgate_verification::LivenessError),

    #[error("config error: {0}")]
    Config(String),

    #[error("metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    #[error("logging error: {0}")]
    Logging(String),
}
