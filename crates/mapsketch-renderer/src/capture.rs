use tokio::sync::oneshot;

use crate::engine::{Bitmap, DrawingEngine};
use crate::error::CaptureError;

pub type CaptureResult = Result<Bitmap, CaptureError>;

/// Hands the frame read at the next idle notification to whoever asked.
///
/// The engine's read-back is only trustworthy right at idle, so a request
/// never reads immediately: it parks a sender, and [`Self::on_idle`] reads
/// once and delivers. The last frame read is kept for inspection.
#[derive(Debug, Default)]
pub struct CaptureController {
    pending: Option<oneshot::Sender<CaptureResult>>,
    latest: Option<Bitmap>,
}

impl CaptureController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register interest in the next idle frame.
    ///
    /// Only one request is tracked; a new one supersedes the old, whose
    /// receiver then resolves to [`CaptureError::SurfaceDisposed`].
    pub fn request(&mut self) -> oneshot::Receiver<CaptureResult> {
        let (tx, rx) = oneshot::channel();
        if self.pending.replace(tx).is_some() {
            log::warn!("Capture requested while another is pending; dropping the older request");
        }
        rx
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Idle notification from the engine. Reads the surface at most once,
    /// and only if a request is waiting.
    pub fn on_idle<E: DrawingEngine + ?Sized>(&mut self, engine: &mut E) {
        let Some(tx) = self.pending.take() else {
            return;
        };

        let result = match engine.capture_bitmap() {
            Some(bitmap) => {
                log::debug!("Captured {}x{} frame on idle", bitmap.width, bitmap.height);
                self.latest = Some(bitmap.clone());
                Ok(bitmap)
            }
            None => {
                log::error!("Idle capture failed: no rendering surface");
                Err(CaptureError::SurfaceUnavailable)
            }
        };

        if tx.send(result).is_err() {
            log::debug!("Capture receiver went away before delivery");
        }
    }

    /// Abandon any waiting request.
    pub fn cancel(&mut self) {
        if self.pending.take().is_some() {
            log::debug!("Pending capture cancelled");
        }
    }

    pub fn latest(&self) -> Option<&Bitmap> {
        self.latest.as_ref()
    }
}

/// Resolve a capture receiver into the frame or the reason there is none.
pub async fn await_capture(rx: oneshot::Receiver<CaptureResult>) -> CaptureResult {
    rx.await.unwrap_or(Err(CaptureError::SurfaceDisposed))
}
