//! Status lines shown on the presentation surface.

pub const INITIALIZING: &str = "Initializing...";
pub const MODELS_READY: &str = "Models loaded. Ready!";
pub const CAMERA_READY: &str = "Camera ready. Please align your face.";
pub const CAMERA_DENIED: &str = "Camera access denied!";
pub const VERIFYING: &str = "Verifying...";
pub const FACE_DETECTED: &str = "Face detected! Please blink.";
pub const HUMAN_VERIFIED: &str = "Human verified!";
pub const NO_FACE: &str = "No face detected! Please align your face to fit into the camera.";
pub const FAILED: &str = "Face verification failed! Please try again later with a clearer camera.";

/// Countdown line for `remaining` seconds.
pub fn countdown(remaining: u32) -> String {
    format!("Starting in {remaining}...")
}
