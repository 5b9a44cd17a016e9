//! Shared artifact slot.
//!
//! Holds the most recent verified pair. The slot belongs to the orchestrator,
//! not to a session, so a new success overwrites the previous one. Clones
//! share the same slot, which lets callbacks read the artifacts while
//! `verify` is still running.

use std::sync::{Arc, RwLock};

use blinkgate_types::CapturedArtifacts;

#[derive(Clone, Default)]
pub struct ArtifactSlot {
    inner: Arc<RwLock<Option<CapturedArtifacts>>>,
}

impl ArtifactSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored pair.
    pub fn store(&self, artifacts: CapturedArtifacts) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(artifacts);
    }

    /// A copy of the stored pair, if any.
    pub fn get(&self) -> Option<CapturedArtifacts> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn is_empty(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blinkgate_types::{ImageArtifact, VideoArtifact};

    fn pair(tag: &[u8]) -> CapturedArtifacts {
        let video = VideoArtifact::from_chunks(vec![tag.to_vec()]);
        let image = ImageArtifact::png(video.id, 1, 1, vec![1]);
        CapturedArtifacts::pair(video, image).unwrap()
    }

    #[test]
    fn last_writer_wins() {
        let slot = ArtifactSlot::new();
        assert!(slot.is_empty());
        slot.store(pair(b"first"));
        slot.store(pair(b"second"));
        assert_eq!(slot.get().unwrap().video().bytes, b"second");
    }

    #[test]
    fn clones_share_storage() {
        let slot = ArtifactSlot::new();
        let view = slot.clone();
        slot.store(pair(b"shared"));
        assert!(!view.is_empty());
    }
}
