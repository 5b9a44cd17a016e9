//! Nullable surface: records status text and can be dismissed on cue.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use blinkgate_capture::{CaptureError, PresentationSurface};
use tokio::sync::watch;

struct SurfaceState {
    mounts: AtomicUsize,
    statuses: Mutex<Vec<String>>,
    dismiss_on: Mutex<Option<String>>,
    dismissed: watch::Sender<bool>,
}

/// A surface that renders nothing.
#[derive(Clone)]
pub struct NullSurface {
    mount_error: Option<String>,
    state: Arc<SurfaceState>,
}

impl NullSurface {
    pub fn new() -> Self {
        let (dismissed, _) = watch::channel(false);
        Self {
            mount_error: None,
            state: Arc::new(SurfaceState {
                mounts: AtomicUsize::new(0),
                statuses: Mutex::new(Vec::new()),
                dismiss_on: Mutex::new(None),
                dismissed,
            }),
        }
    }

    /// A surface whose mount target is unusable.
    pub fn unmountable(reason: impl Into<String>) -> Self {
        Self {
            mount_error: Some(reason.into()),
            ..Self::new()
        }
    }

    /// Dismiss the surface, as if the user closed it.
    pub fn dismiss(&self) {
        self.state.dismissed.send_replace(true);
    }

    /// Dismiss the surface the moment `status` is shown.
    pub fn dismiss_on_status(&self, status: impl Into<String>) {
        *self.state.dismiss_on.lock().unwrap() = Some(status.into());
    }

    pub fn is_dismissed(&self) -> bool {
        *self.state.dismissed.borrow()
    }

    pub fn mounts(&self) -> usize {
        self.state.mounts.load(Ordering::SeqCst)
    }

    /// Every status line shown, oldest first.
    pub fn statuses(&self) -> Vec<String> {
        self.state.statuses.lock().unwrap().clone()
    }

    pub fn last_status(&self) -> Option<String> {
        self.state.statuses.lock().unwrap().last().cloned()
    }
}

impl Default for NullSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl PresentationSurface for NullSurface {
    fn mount(&self) -> Result<(), CaptureError> {
        if let Some(reason) = &self.mount_error {
            return Err(CaptureError::Mount(reason.clone()));
        }
        self.state.mounts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn set_status(&self, text: &str) {
        self.state.statuses.lock().unwrap().push(text.to_string());
        let trigger = self.state.dismiss_on.lock().unwrap().as_deref() == Some(text);
        if trigger {
            self.dismiss();
        }
    }

    fn dismissed(&self) -> watch::Receiver<bool> {
        self.state.dismissed.subscribe()
    }
}
