//! Capability traits for everything the verifier talks to but does not own.
//!
//! The camera, the face-landmark detector, the video decoder and the
//! presentation surface are all reached through these traits. The rest of the
//! workspace depends only on them; real backends and the scripted test
//! doubles in `blinkgate-nullables` implement them.
//!
//! Two pieces of real logic live here as well because they only need the
//! traits: the [`CaptureRecorder`] that collects chunks while a session runs
//! and [`extract_still`], which turns a finished recording into a PNG.

pub mod camera;
pub mod detector;
pub mod error;
pub mod extract;
pub mod recorder;
pub mod surface;

pub use camera::{Camera, MediaStream, Recording};
pub use detector::FaceDetector;
pub use error::CaptureError;
pub use extract::{extract_still, DecodedFrame, FrameDecoder};
pub use recorder::CaptureRecorder;
pub use surface::{wait_for_dismiss, PresentationSurface};
