use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("camera access denied: {0}")]
    CameraDenied(String),

    #[error("camera device error: {0}")]
    CameraDevice(String),

    #[error("recorder error: {0}")]
    Recorder(String),

    #[error("failed to mount presentation surface: {0}")]
    Mount(String),

    #[error("failed to load detection models: {0}")]
    ModelLoad(String),

    #[error("detection failed: {0}")]
    Detection(String),

    #[error("failed to decode recording: {0}")]
    Decode(String),

    #[error("decoded frame has no pixels")]
    EmptyFrame,

    #[error("decoded frame holds {actual} bytes, {width}x{height} RGB needs {expected}")]
    FrameSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("failed to encode still: {0}")]
    Encode(String),
}
