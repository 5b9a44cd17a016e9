//! Face-landmark detection capability.

use std::future::Future;

use blinkgate_types::EyeLandmarks;

use crate::{CaptureError, MediaStream};

/// A single-face landmark detector.
///
/// Treated as a black box: given the current frame of a stream it reports
/// the eye landmarks of one face, or `None` when no face is in view.
pub trait FaceDetector: Send + Sync {
    /// Load whatever models the detector needs. Called once per invocation,
    /// before the camera is requested.
    fn load_models(&self) -> impl Future<Output = Result<(), CaptureError>> + Send;

    /// Detect a single face in the frame currently shown by `stream`.
    fn detect(
        &self,
        stream: &MediaStream,
    ) -> impl Future<Output = Result<Option<EyeLandmarks>, CaptureError>> + Send;
}
