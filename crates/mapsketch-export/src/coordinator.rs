use std::path::{Path, PathBuf};
use std::sync::MutexGuard;

use mapsketch_core::{LayerId, Notice, Notifier};
use mapsketch_renderer::capture::await_capture;
use mapsketch_renderer::{Bitmap, CaptureError, DrawingEngine, MapSession, SharedSession};

use crate::error::{ExportError, PageError};
use crate::page::{cover_fit, PageWriter};
use crate::settings::ExportSettings;

/// Message shown when an isolated export is requested with no active layer.
pub const NO_ACTIVE_LAYER_MESSAGE: &str = "Select a layer to export first.";

/// Drives view and layer exports against a shared map session.
///
/// One export at a time: both operations take `&mut self`.
pub struct ExportCoordinator<W> {
    writer: W,
    settings: ExportSettings,
}

impl<W: PageWriter> ExportCoordinator<W> {
    pub fn new(writer: W, settings: ExportSettings) -> Self {
        Self { writer, settings }
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    /// Export the view as currently displayed.
    pub async fn export_view<E, N>(
        &mut self,
        session: &SharedSession<E, N>,
    ) -> Result<PathBuf, ExportError>
    where
        E: DrawingEngine,
        N: Notifier,
    {
        let path = self.settings.view_path();
        log::info!("Exporting map view to {}", path.display());
        self.capture_to(session, &path).await
    }

    /// Export the active layer alone.
    ///
    /// Every other layer is hidden for the duration and the recorded
    /// visibility is put back when this returns, fails, or is dropped.
    pub async fn export_active_layer<E, N>(
        &mut self,
        session: &SharedSession<E, N>,
    ) -> Result<PathBuf, ExportError>
    where
        E: DrawingEngine,
        N: Notifier,
    {
        let (guard, name) = {
            let mut s = lock(session)?;
            let active = s.store().active_layer().map(|l| (l.id, l.name.clone()));
            let Some((active_id, name)) = active else {
                log::warn!("Layer export requested with no active layer");
                s.notify(Notice::error(NO_ACTIVE_LAYER_MESSAGE));
                return Err(ExportError::NoActiveLayer);
            };
            (VisibilityGuard::isolate(session, &mut s, active_id), name)
        };

        let path = self.settings.layer_path(&name);
        log::info!("Exporting layer {:?} to {}", name, path.display());

        let result = self.settle_then_capture(session, &path).await;
        drop(guard);
        result
    }

    async fn settle_then_capture<E, N>(
        &mut self,
        session: &SharedSession<E, N>,
        path: &Path,
    ) -> Result<PathBuf, ExportError>
    where
        E: DrawingEngine,
        N: Notifier,
    {
        let delay = self.settings.settle_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if lock(session)?.is_disposed() {
            log::warn!("Surface torn down while settling; abandoning export");
            return Err(CaptureError::SurfaceDisposed.into());
        }
        self.capture_to(session, path).await
    }

    async fn capture_to<E, N>(
        &mut self,
        session: &SharedSession<E, N>,
        path: &Path,
    ) -> Result<PathBuf, ExportError>
    where
        E: DrawingEngine,
        N: Notifier,
    {
        let rx = lock(session)?.request_capture()?;
        let bitmap = await_capture(rx).await.inspect_err(|e| {
            log::error!("Export of {} aborted: {}", path.display(), e);
        })?;
        self.write_page(&bitmap, path)?;
        log::info!("Saved {}", path.display());
        Ok(path.to_path_buf())
    }

    fn write_page(&mut self, bitmap: &Bitmap, path: &Path) -> Result<(), PageError> {
        let page = self.writer.create_page(self.settings.orientation)?;
        let placement = cover_fit(page, bitmap.width, bitmap.height).ok_or(PageError::EmptyImage {
            width: bitmap.width,
            height: bitmap.height,
        })?;
        self.writer.embed_image(bitmap, placement)?;
        self.writer.save(path)
    }
}

fn lock<E, N>(session: &SharedSession<E, N>) -> Result<MutexGuard<'_, MapSession<E, N>>, ExportError> {
    session.lock().map_err(|_| ExportError::SessionPoisoned)
}

/// Hides all but one layer and restores the recorded visibility on drop.
struct VisibilityGuard<E: DrawingEngine, N: Notifier> {
    session: SharedSession<E, N>,
    prior: Vec<(LayerId, bool)>,
}

impl<E: DrawingEngine, N: Notifier> VisibilityGuard<E, N> {
    fn isolate(session: &SharedSession<E, N>, s: &mut MapSession<E, N>, keep: LayerId) -> Self {
        let prior = s.store().visibility_snapshot();
        for &(id, _) in &prior {
            s.set_layer_visibility(id, id == keep);
        }
        Self {
            session: session.clone(),
            prior,
        }
    }
}

impl<E: DrawingEngine, N: Notifier> Drop for VisibilityGuard<E, N> {
    fn drop(&mut self) {
        let mut s = match self.session.lock() {
            Ok(s) => s,
            Err(poisoned) => {
                log::warn!("Restoring layer visibility through a poisoned session lock");
                poisoned.into_inner()
            }
        };
        for &(id, visible) in &self.prior {
            s.set_layer_visibility(id, visible);
        }
        log::debug!("Restored visibility of {} layer(s)", self.prior.len());
    }
}
