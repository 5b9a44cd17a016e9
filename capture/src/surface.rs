//! Presentation surface capability.
//!
//! The verifier never builds UI itself. Whatever layer hosts it provides a
//! surface that can be mounted, shows one line of status text and can be
//! dismissed by the user.

use tokio::sync::watch;

use crate::CaptureError;

pub trait PresentationSurface: Send + Sync {
    /// Attach the surface to its host. Fails on an unusable mount target.
    fn mount(&self) -> Result<(), CaptureError>;

    /// Replace the status line.
    fn set_status(&self, text: &str);

    /// A receiver whose value flips to `true` once the user dismisses the
    /// surface.
    fn dismissed(&self) -> watch::Receiver<bool>;
}

/// Resolve once the surface has been dismissed.
///
/// Never resolves if the surface is dropped without being dismissed.
pub async fn wait_for_dismiss(mut rx: watch::Receiver<bool>) {
    let closed = rx.wait_for(|&dismissed| dismissed).await.is_err();
    if closed {
        std::future::pending::<()>().await;
    }
}
