//! Capture recorder: collects a session's recording chunks.
//!
//! Started as soon as the camera stream is acquired, before any detection
//! result is known. A collector task drains the recording channel in order;
//! [`CaptureRecorder::stop`] asks the camera to stop, waits for the channel
//! to close and assembles the chunks into one [`VideoArtifact`].

use std::time::Duration;

use blinkgate_types::VideoArtifact;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::{CaptureError, Recording};

/// How long [`CaptureRecorder::stop`] waits for the camera to flush.
const STOP_TIMEOUT: Duration = Duration::from_secs(5);

pub struct CaptureRecorder {
    stop: Option<oneshot::Sender<()>>,
    collector: JoinHandle<Vec<Vec<u8>>>,
}

impl CaptureRecorder {
    /// Begin collecting chunks from `recording`.
    pub fn start(recording: Recording) -> Self {
        let Recording { mut chunks, stop } = recording;
        let collector = tokio::spawn(async move {
            let mut collected = Vec::new();
            while let Some(chunk) = chunks.recv().await {
                if !chunk.is_empty() {
                    collected.push(chunk);
                }
            }
            collected
        });
        Self {
            stop: Some(stop),
            collector,
        }
    }

    /// Stop recording and assemble everything collected so far.
    pub async fn stop(mut self) -> Result<VideoArtifact, CaptureError> {
        if let Some(stop) = self.stop.take() {
            // The camera may already have ended the recording on its own.
            let _ = stop.send(());
        }

        let chunks = match tokio::time::timeout(STOP_TIMEOUT, &mut self.collector).await {
            Ok(Ok(chunks)) => chunks,
            Ok(Err(e)) => return Err(CaptureError::Recorder(e.to_string())),
            Err(_) => {
                self.collector.abort();
                return Err(CaptureError::Recorder(format!(
                    "camera did not flush the recording within {}s",
                    STOP_TIMEOUT.as_secs()
                )));
            }
        };

        let video = VideoArtifact::from_chunks(chunks);
        tracing::debug!(id = %video.id, bytes = video.len(), "recording assembled");
        Ok(video)
    }

    /// Stop recording and throw the chunks away.
    pub fn discard(mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        self.collector.abort();
    }
}

impl Drop for CaptureRecorder {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        self.collector.abort();
    }
}
