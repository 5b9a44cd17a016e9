//! Still extraction from a finished recording.
//!
//! The recording is decoded by a [`FrameDecoder`] backend; its first frame is
//! drawn onto an offscreen RGB raster of the frame's own size and encoded as
//! PNG. Every failure along the way is reported; an empty still is never
//! produced.

use std::future::Future;
use std::io::Cursor;

use blinkgate_types::{ImageArtifact, VideoArtifact};
use image::{ImageFormat, RgbImage};

use crate::CaptureError;

/// A single decoded video frame in RGB24 format.
pub struct DecodedFrame {
    /// Packed RGB24, row-major.
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl DecodedFrame {
    fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }
}

/// Video decoding backend.
pub trait FrameDecoder: Send + Sync {
    /// Decode `video` and return its first available frame.
    fn first_frame(
        &self,
        video: &VideoArtifact,
    ) -> impl Future<Output = Result<DecodedFrame, CaptureError>> + Send;
}

/// Decode the first frame of `video` and encode it as a PNG still tied to
/// that recording.
pub async fn extract_still<D: FrameDecoder>(
    decoder: &D,
    video: &VideoArtifact,
) -> Result<ImageArtifact, CaptureError> {
    if video.is_empty() {
        return Err(CaptureError::Decode("recording is empty".into()));
    }

    let frame = decoder.first_frame(video).await?;
    let raster = render(frame)?;
    let png = encode_png(&raster)?;

    tracing::debug!(
        source = %video.id,
        width = raster.width(),
        height = raster.height(),
        bytes = png.len(),
        "still extracted"
    );
    Ok(ImageArtifact::png(
        video.id,
        raster.width(),
        raster.height(),
        png,
    ))
}

fn render(frame: DecodedFrame) -> Result<RgbImage, CaptureError> {
    if frame.width == 0 || frame.height == 0 || frame.data.is_empty() {
        return Err(CaptureError::EmptyFrame);
    }
    let expected = frame.expected_len();
    if frame.data.len() != expected {
        return Err(CaptureError::FrameSize {
            width: frame.width,
            height: frame.height,
            expected,
            actual: frame.data.len(),
        });
    }
    RgbImage::from_raw(frame.width, frame.height, frame.data).ok_or(CaptureError::EmptyFrame)
}

fn encode_png(raster: &RgbImage) -> Result<Vec<u8>, CaptureError> {
    let mut out = Cursor::new(Vec::new());
    raster
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| CaptureError::Encode(e.to_string()))?;
    let bytes = out.into_inner();
    if bytes.is_empty() {
        return Err(CaptureError::Encode("encoder produced no bytes".into()));
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Solid {
        width: u32,
        height: u32,
        len: Option<usize>,
    }

    impl FrameDecoder for Solid {
        async fn first_frame(&self, _video: &VideoArtifact) -> Result<DecodedFrame, CaptureError> {
            let len = self
                .len
                .unwrap_or(self.width as usize * self.height as usize * 3);
            Ok(DecodedFrame {
                data: vec![200; len],
                width: self.width,
                height: self.height,
            })
        }
    }

    struct Broken;

    impl FrameDecoder for Broken {
        async fn first_frame(&self, _video: &VideoArtifact) -> Result<DecodedFrame, CaptureError> {
            Err(CaptureError::Decode("no video track".into()))
        }
    }

    fn video() -> VideoArtifact {
        VideoArtifact::from_chunks(vec![b"webm".to_vec()])
    }

    #[tokio::test]
    async fn encodes_png_tied_to_source() {
        let decoder = Solid {
            width: 4,
            height: 3,
            len: None,
        };
        let video = video();
        let still = extract_still(&decoder, &video).await.unwrap();
        assert!(still.derives_from(&video));
        assert_eq!((still.width, still.height), (4, 3));
        assert_eq!(&still.bytes[1..4], b"PNG");

        let decoded = image::load_from_memory(&still.bytes).unwrap();
        assert_eq!(decoded.width(), 4);
    }

    #[tokio::test]
    async fn empty_recording_fails() {
        let decoder = Solid {
            width: 1,
            height: 1,
            len: None,
        };
        let empty = VideoArtifact::from_chunks(Vec::new());
        assert!(matches!(
            extract_still(&decoder, &empty).await,
            Err(CaptureError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn zero_sized_frame_fails() {
        let decoder = Solid {
            width: 0,
            height: 10,
            len: Some(0),
        };
        assert_eq!(
            extract_still(&decoder, &video()).await.unwrap_err(),
            CaptureError::EmptyFrame
        );
    }

    #[tokio::test]
    async fn short_frame_fails() {
        let decoder = Solid {
            width: 2,
            height: 2,
            len: Some(5),
        };
        assert_eq!(
            extract_still(&decoder, &video()).await.unwrap_err(),
            CaptureError::FrameSize {
                width: 2,
                height: 2,
                expected: 12,
                actual: 5,
            }
        );
    }

    #[tokio::test]
    async fn decoder_error_propagates() {
        assert_eq!(
            extract_still(&Broken, &video()).await.unwrap_err(),
            CaptureError::Decode("no video track".into())
        );
    }
}
