//! Fundamental types for the blinkgate liveness verifier.
//!
//! This crate defines the value types shared across every other crate in the
//! workspace: eye landmarks, per-tick detection results, capture artifacts and
//! their content ids, session phases and trial scopes.

pub mod artifact;
pub mod error;
pub mod landmarks;
pub mod phase;
pub mod scope;

pub use artifact::{ArtifactId, CapturedArtifacts, ImageArtifact, VideoArtifact};
pub use error::TypesError;
pub use landmarks::{DetectionResult, EyeLandmarks, Point};
pub use phase::SessionPhase;
pub use scope::TrialScope;
