//! Scoped ownership of an acquired camera stream.

use blinkgate_capture::{Camera, MediaStream};

/// An acquired stream that goes back to its camera when the lease is
/// released or dropped, including when the `verify` future holding it is
/// cancelled.
pub(crate) struct StreamLease<'a, C: Camera> {
    camera: &'a C,
    stream: Option<MediaStream>,
}

impl<'a, C: Camera> StreamLease<'a, C> {
    pub fn new(camera: &'a C, stream: MediaStream) -> Self {
        Self {
            camera,
            stream: Some(stream),
        }
    }

    pub fn stream(&self) -> &MediaStream {
        self.stream
            .as_ref()
            .expect("stream is held until the lease is released")
    }

    pub fn id(&self) -> u64 {
        self.stream().id
    }

    /// Hand the stream back now.
    pub fn release(mut self) {
        self.give_back();
    }

    fn give_back(&mut self) {
        if let Some(stream) = self.stream.take() {
            tracing::debug!(stream = stream.id, "releasing camera stream");
            self.camera.release(stream);
        }
    }
}

impl<C: Camera> Drop for StreamLease<'_, C> {
    fn drop(&mut self) {
        self.give_back();
    }
}
