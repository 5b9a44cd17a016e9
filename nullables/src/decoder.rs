//! Nullable decoder: synthesises a first frame from the recording bytes.

use std::sync::{Arc, Mutex};

use blinkgate_capture::{CaptureError, DecodedFrame, FrameDecoder};
use blinkgate_types::{ArtifactId, VideoArtifact};

/// A decoder that fabricates a frame of fixed size whose pixels are derived
/// from the recording, so different recordings yield different stills.
#[derive(Clone)]
pub struct NullFrameDecoder {
    width: u32,
    height: u32,
    error: Option<String>,
    decoded: Arc<Mutex<Vec<ArtifactId>>>,
}

impl NullFrameDecoder {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            error: None,
            decoded: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A decoder that fails on every recording.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }

    /// Ids of every recording handed to the decoder, in order.
    pub fn decoded(&self) -> Vec<ArtifactId> {
        self.decoded.lock().unwrap().clone()
    }
}

impl Default for NullFrameDecoder {
    fn default() -> Self {
        Self::new(8, 6)
    }
}

impl FrameDecoder for NullFrameDecoder {
    async fn first_frame(&self, video: &VideoArtifact) -> Result<DecodedFrame, CaptureError> {
        self.decoded.lock().unwrap().push(video.id);
        if let Some(message) = &self.error {
            return Err(CaptureError::Decode(message.clone()));
        }

        let len = self.width as usize * self.height as usize * 3;
        let data = (0..len)
            .map(|i| video.bytes.get(i % video.len().max(1)).copied().unwrap_or(0) ^ (i as u8))
            .collect();
        Ok(DecodedFrame {
            data,
            width: self.width,
            height: self.height,
        })
    }
}
