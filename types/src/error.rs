//! Error type for constructing shared values.

use thiserror::Error;

use crate::ArtifactId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("image was extracted from video {image_source}, not {video}")]
    ArtifactMismatch {
        video: ArtifactId,
        image_source: ArtifactId,
    },

    #[error("video artifact is empty")]
    EmptyVideo,

    #[error("image artifact is empty")]
    EmptyImage,

    #[error("unknown trial scope {0:?}, expected \"cumulative\" or \"per_session\"")]
    UnknownTrialScope(String),
}
