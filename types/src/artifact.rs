//! Capture artifacts: the recorded video, the still extracted from it, and
//! the content id that ties the two together.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::TypesError;

type Blake2b256 = Blake2b<U32>;

/// MIME type of an assembled recording.
pub const VIDEO_MIME: &str = "video/webm";
/// MIME type of an extracted still.
pub const IMAGE_MIME: &str = "image/png";

/// Blake2b-256 digest of an artifact's bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactId([u8; 32]);

impl ArtifactId {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Hash a sequence of byte slices as if they were concatenated.
    pub fn digest<'a>(parts: impl IntoIterator<Item = &'a [u8]>) -> Self {
        let mut hasher = Blake2b256::new();
        for part in parts {
            hasher.update(part);
        }
        let mut output = [0u8; 32];
        output.copy_from_slice(&hasher.finalize());
        Self(output)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArtifactId({})", hex::encode(&self.0[..4]))
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

/// One assembled recording.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoArtifact {
    pub id: ArtifactId,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl VideoArtifact {
    /// Assemble recorder chunks, in order, into a single video.
    pub fn from_chunks(chunks: Vec<Vec<u8>>) -> Self {
        let id = ArtifactId::digest(chunks.iter().map(Vec::as_slice));
        let bytes = chunks.concat();
        Self {
            id,
            mime: VIDEO_MIME.to_string(),
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for VideoArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoArtifact")
            .field("id", &self.id)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A still frame encoded from a [`VideoArtifact`].
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageArtifact {
    /// Id of the video this still was extracted from.
    pub source: ArtifactId,
    pub mime: String,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

impl ImageArtifact {
    pub fn png(source: ArtifactId, width: u32, height: u32, bytes: Vec<u8>) -> Self {
        Self {
            source,
            mime: IMAGE_MIME.to_string(),
            width,
            height,
            bytes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether this still was extracted from `video`.
    pub fn derives_from(&self, video: &VideoArtifact) -> bool {
        self.source == video.id
    }
}

impl fmt::Debug for ImageArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageArtifact")
            .field("source", &self.source)
            .field("mime", &self.mime)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// The evidence of one successful session: its recording and the still
/// extracted from that recording.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedArtifacts {
    video: VideoArtifact,
    image: ImageArtifact,
}

impl CapturedArtifacts {
    /// Pair a video with its still. Fails when the still came from another
    /// recording or either artifact is empty.
    pub fn pair(video: VideoArtifact, image: ImageArtifact) -> Result<Self, TypesError> {
        if video.is_empty() {
            return Err(TypesError::EmptyVideo);
        }
        if image.is_empty() {
            return Err(TypesError::EmptyImage);
        }
        if !image.derives_from(&video) {
            return Err(TypesError::ArtifactMismatch {
                video: video.id,
                image_source: image.source,
            });
        }
        Ok(Self { video, image })
    }

    pub fn video(&self) -> &VideoArtifact {
        &self.video
    }

    pub fn image(&self) -> &ImageArtifact {
        &self.image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_order_changes_id() {
        let a = VideoArtifact::from_chunks(vec![b"ab".to_vec(), b"cd".to_vec()]);
        let b = VideoArtifact::from_chunks(vec![b"cd".to_vec(), b"ab".to_vec()]);
        assert_ne!(a.id, b.id);
        assert_eq!(a.bytes, b"abcd");
        assert_eq!(a.mime, VIDEO_MIME);
    }

    #[test]
    fn id_ignores_chunk_boundaries() {
        let split = VideoArtifact::from_chunks(vec![b"ab".to_vec(), b"cd".to_vec()]);
        let whole = VideoArtifact::from_chunks(vec![b"abcd".to_vec()]);
        assert_eq!(split.id, whole.id);
    }

    #[test]
    fn pair_rejects_foreign_still() {
        let video = VideoArtifact::from_chunks(vec![b"session-2".to_vec()]);
        let stale = VideoArtifact::from_chunks(vec![b"session-1".to_vec()]);
        let image = ImageArtifact::png(stale.id, 1, 1, vec![1, 2, 3]);
        assert_eq!(
            CapturedArtifacts::pair(video.clone(), image),
            Err(TypesError::ArtifactMismatch {
                video: video.id,
                image_source: stale.id,
            })
        );
    }

    #[test]
    fn pair_rejects_empty_artifacts() {
        let empty = VideoArtifact::from_chunks(Vec::new());
        let image = ImageArtifact::png(empty.id, 1, 1, vec![1]);
        assert_eq!(
            CapturedArtifacts::pair(empty, image),
            Err(TypesError::EmptyVideo)
        );

        let video = VideoArtifact::from_chunks(vec![vec![7]]);
        let image = ImageArtifact::png(video.id, 1, 1, Vec::new());
        assert_eq!(
            CapturedArtifacts::pair(video, image),
            Err(TypesError::EmptyImage)
        );
    }

    #[test]
    fn pair_accepts_matching_still() {
        let video = VideoArtifact::from_chunks(vec![vec![1, 2], vec![3]]);
        let image = ImageArtifact::png(video.id, 2, 2, vec![9; 8]);
        let artifacts = CapturedArtifacts::pair(video.clone(), image).unwrap();
        assert_eq!(artifacts.video(), &video);
        assert!(artifacts.image().derives_from(&video));
    }

    #[test]
    fn display_is_full_hex() {
        let id = ArtifactId::new([0xab; 32]);
        assert_eq!(id.to_string().len(), 64);
        assert!(format!("{id:?}").starts_with("ArtifactId(abababab"));
    }
}
