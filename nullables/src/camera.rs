//! Nullable camera: grants or denies streams and records what happened.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use blinkgate_capture::{Camera, CaptureError, MediaStream, Recording};

#[derive(Default)]
struct CameraState {
    next_id: AtomicU64,
    requests: AtomicUsize,
    recordings: AtomicUsize,
    stops: AtomicUsize,
    active: Mutex<BTreeSet<u64>>,
    released: Mutex<Vec<u64>>,
}

/// A camera that never opens a device.
///
/// A granted stream records as two chunks: a header chunk sent as soon as
/// recording starts and a trailer chunk flushed when recording is stopped.
/// Both carry the stream id so recordings of different sessions differ.
#[derive(Clone)]
pub struct NullCamera {
    denial: Option<String>,
    grant_delay: Duration,
    state: Arc<CameraState>,
}

impl NullCamera {
    /// A camera that grants every request.
    pub fn granting() -> Self {
        Self {
            denial: None,
            grant_delay: Duration::ZERO,
            state: Arc::new(CameraState::default()),
        }
    }

    /// A camera whose permission request is always refused.
    pub fn denying(reason: impl Into<String>) -> Self {
        Self {
            denial: Some(reason.into()),
            ..Self::granting()
        }
    }

    /// Make the permission prompt take `delay` to resolve.
    pub fn with_grant_delay(mut self, delay: Duration) -> Self {
        self.grant_delay = delay;
        self
    }

    /// Number of stream requests made.
    pub fn requests(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }

    /// Number of recordings started.
    pub fn recordings(&self) -> usize {
        self.state.recordings.load(Ordering::SeqCst)
    }

    /// Number of recordings that were asked to stop.
    pub fn stops(&self) -> usize {
        self.state.stops.load(Ordering::SeqCst)
    }

    /// Ids of streams handed out and not yet released.
    pub fn active_streams(&self) -> Vec<u64> {
        self.state.active.lock().unwrap().iter().copied().collect()
    }

    /// Ids of streams released, in release order.
    pub fn released(&self) -> Vec<u64> {
        self.state.released.lock().unwrap().clone()
    }
}

impl Default for NullCamera {
    fn default() -> Self {
        Self::granting()
    }
}

impl Camera for NullCamera {
    async fn request_stream(&self) -> Result<MediaStream, CaptureError> {
        self.state.requests.fetch_add(1, Ordering::SeqCst);
        if !self.grant_delay.is_zero() {
            tokio::time::sleep(self.grant_delay).await;
        }
        if let Some(reason) = &self.denial {
            return Err(CaptureError::CameraDenied(reason.clone()));
        }

        let id = self.state.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.active.lock().unwrap().insert(id);
        Ok(MediaStream {
            id,
            label: format!("null-camera-{id}"),
            width: 640,
            height: 480,
        })
    }

    fn start_recording(&self, stream: &MediaStream) -> Result<Recording, CaptureError> {
        if !self.state.active.lock().unwrap().contains(&stream.id) {
            return Err(CaptureError::Recorder(format!(
                "stream {} is not active",
                stream.id
            )));
        }
        self.state.recordings.fetch_add(1, Ordering::SeqCst);

        let (recording, chunks, stop) = Recording::channel();
        let _ = chunks.send(format!("stream-{}:head;", stream.id).into_bytes());

        let id = stream.id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            // A dropped sender counts as a stop request too.
            let _ = stop.await;
            state.stops.fetch_add(1, Ordering::SeqCst);
            let _ = chunks.send(format!("stream-{id}:tail;").into_bytes());
        });
        Ok(recording)
    }

    fn release(&self, stream: MediaStream) {
        self.state.active.lock().unwrap().remove(&stream.id);
        self.state.released.lock().unwrap().push(stream.id);
    }
}
