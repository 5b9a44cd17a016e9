//! Nullable capabilities for deterministic testing.
//!
//! Every external collaborator of the verifier (camera, face detector, video
//! decoder, presentation surface) is abstracted behind a trait in
//! `blinkgate-capture`. This crate provides implementations that:
//! - Follow a script instead of looking at real pixels
//! - Record every call so tests can assert on them afterwards
//! - Never touch a device, a model file or a window
//!
//! Each nullable is a cheap `Clone` around shared state, so a test can hand
//! one copy to the orchestrator and keep another for assertions.

pub mod camera;
pub mod decoder;
pub mod detector;
pub mod surface;

pub use camera::NullCamera;
pub use decoder::NullFrameDecoder;
pub use detector::{NullDetector, ScriptedTick};
pub use surface::NullSurface;
