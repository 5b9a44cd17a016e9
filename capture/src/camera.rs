//! Camera capability: live stream acquisition and recording.

use std::future::Future;

use tokio::sync::{mpsc, oneshot};

use crate::CaptureError;

/// Handle to a live camera stream.
///
/// Owned by exactly one session from acquisition until it is handed back via
/// [`Camera::release`].
#[derive(Debug, PartialEq, Eq)]
pub struct MediaStream {
    pub id: u64,
    pub label: String,
    pub width: u32,
    pub height: u32,
}

/// A running recording against a [`MediaStream`].
///
/// The camera sends encoded chunks, in order, on `chunks`. Once `stop` fires
/// it flushes whatever it still holds and drops its sender, which closes the
/// channel.
pub struct Recording {
    pub chunks: mpsc::UnboundedReceiver<Vec<u8>>,
    pub stop: oneshot::Sender<()>,
}

impl Recording {
    /// A recording wired to a fresh channel. The camera keeps the returned
    /// sender and stop receiver.
    pub fn channel() -> (Self, mpsc::UnboundedSender<Vec<u8>>, oneshot::Receiver<()>) {
        let (chunk_tx, chunk_rx) = mpsc::unbounded_channel();
        let (stop_tx, stop_rx) = oneshot::channel();
        (
            Self {
                chunks: chunk_rx,
                stop: stop_tx,
            },
            chunk_tx,
            stop_rx,
        )
    }
}

/// Camera backend.
pub trait Camera: Send + Sync {
    /// Ask for a live video stream. Fails when permission is denied or no
    /// device is usable.
    ///
    /// Dropping the future before it resolves must not leave a stream open.
    fn request_stream(&self) -> impl Future<Output = Result<MediaStream, CaptureError>> + Send;

    /// Start recording `stream`.
    fn start_recording(&self, stream: &MediaStream) -> Result<Recording, CaptureError>;

    /// Stop every track of `stream` and give the device back.
    fn release(&self, stream: MediaStream);
}
