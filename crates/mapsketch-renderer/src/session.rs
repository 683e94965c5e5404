use std::sync::{Arc, Mutex};

use mapsketch_core::{
    Feature, Layer, LayerColor, LayerId, LayerStore, Notice, NoticeLog, Notifier,
};
use tokio::sync::oneshot;

use crate::capture::{CaptureController, CaptureResult};
use crate::engine::{Bitmap, DrawMode, DrawingEngine, RasterOverlay};
use crate::error::CaptureError;
use crate::ingest::{self, IngestOutcome};
use crate::sync::RenderSynchronizer;

/// A session shared between the host's event handlers and async exports.
pub type SharedSession<E, N = NoticeLog> = Arc<Mutex<MapSession<E, N>>>;

/// One mounted map: the layer store, the engine it is mirrored into, and
/// the pieces that keep them in step.
///
/// All store mutations go through here so that each one is followed by
/// exactly one render pass. The engine's sketch is written only by
/// ingestion and its committed display only by the synchroniser.
#[derive(Debug)]
pub struct MapSession<E, N = NoticeLog> {
    store: LayerStore,
    engine: E,
    synchronizer: RenderSynchronizer,
    capture: CaptureController,
    notifier: N,
    disposed: bool,
}

impl<E: DrawingEngine, N: Notifier> MapSession<E, N> {
    pub fn new(engine: E, notifier: N) -> Self {
        Self {
            store: LayerStore::new(),
            engine,
            synchronizer: RenderSynchronizer::new(),
            capture: CaptureController::new(),
            notifier,
            disposed: false,
        }
    }

    pub fn shared(self) -> SharedSession<E, N> {
        Arc::new(Mutex::new(self))
    }

    // ── Layer operations ─────────────────────────────────────────────

    pub fn add_layer(&mut self, name: &str, color: Option<LayerColor>) -> LayerId {
        let id = self.store.add_layer(name, color);
        self.render();
        id
    }

    pub fn set_active_layer(&mut self, id: LayerId) {
        self.store.set_active_layer(id);
        self.render();
    }

    pub fn toggle_layer(&mut self, id: LayerId) {
        self.store.toggle_layer(id);
        self.render();
    }

    pub fn set_layer_visibility(&mut self, id: LayerId, visible: bool) {
        self.store.set_layer_visibility(id, visible);
        self.render();
    }

    pub fn set_layer_color(&mut self, id: LayerId, color: LayerColor) {
        self.store.set_layer_color(id, color);
        self.render();
    }

    pub fn add_feature_to_layer(&mut self, id: LayerId, feature: Feature) {
        self.store.add_feature_to_layer(id, feature);
        self.render();
    }

    pub fn remove_layer(&mut self, id: LayerId) -> Option<Layer> {
        let removed = self.store.remove_layer(id);
        self.render();
        removed
    }

    pub fn layers(&self) -> &[Layer] {
        self.store.layers()
    }

    pub fn active_layer_id(&self) -> Option<LayerId> {
        self.store.active_layer_id()
    }

    pub fn store(&self) -> &LayerStore {
        &self.store
    }

    // ── Engine controls ──────────────────────────────────────────────

    pub fn set_draw_mode(&mut self, mode: DrawMode) {
        if !self.disposed {
            self.engine.set_draw_mode(mode);
        }
    }

    pub fn add_raster_overlay(&mut self, overlay: &RasterOverlay) {
        if !self.disposed {
            log::info!("Adding raster overlay {}", overlay.source_id);
            self.engine.add_raster_overlay(overlay);
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn notify(&mut self, notice: Notice) {
        self.notifier.notify(notice);
    }

    // ── Engine events ────────────────────────────────────────────────

    /// The engine finished a sketch.
    pub fn on_shape_completed(&mut self, feature: Feature) -> IngestOutcome {
        if self.disposed {
            log::debug!("Ignoring completed shape on a disposed surface");
            return IngestOutcome::Detached;
        }
        let outcome =
            ingest::on_shape_completed(&mut self.store, &mut self.engine, &mut self.notifier, feature);
        if matches!(outcome, IngestOutcome::Committed(_)) {
            self.render();
        }
        outcome
    }

    /// The engine has no redraw pending.
    pub fn on_idle(&mut self) {
        if !self.disposed {
            self.capture.on_idle(&mut self.engine);
        }
    }

    // ── Capture ──────────────────────────────────────────────────────

    /// Render, ask for a repaint, and register for the frame read at the
    /// next idle notification.
    pub fn request_capture(&mut self) -> Result<oneshot::Receiver<CaptureResult>, CaptureError> {
        if self.disposed {
            return Err(CaptureError::SurfaceDisposed);
        }
        self.render();
        let rx = self.capture.request();
        self.engine.request_redraw();
        Ok(rx)
    }

    pub fn has_pending_capture(&self) -> bool {
        self.capture.has_pending()
    }

    pub fn latest_capture(&self) -> Option<&Bitmap> {
        self.capture.latest()
    }

    // ── Teardown ─────────────────────────────────────────────────────

    /// Tear down the surface. Pending captures resolve as disposed; later
    /// store changes are kept but no longer rendered.
    pub fn dispose(&mut self) {
        if !self.disposed {
            log::info!("Disposing map surface");
            self.disposed = true;
            self.capture.cancel();
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn render(&mut self) {
        if self.disposed {
            return;
        }
        self.synchronizer.sync(&self.store, &mut self.engine);
    }

    pub fn render_passes(&self) -> u64 {
        self.synchronizer.passes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::await_capture;
    use crate::testing::RecordingEngine;
    use mapsketch_core::{Geometry, Point};

    fn session() -> MapSession<RecordingEngine> {
        MapSession::new(RecordingEngine::with_frame(8, 8), NoticeLog::new())
    }

    fn point(x: f64, y: f64) -> Feature {
        Feature::new(Geometry::Point(Point::new(x, y)))
    }

    #[test]
    fn test_every_mutation_renders() {
        let mut s = session();
        let roads = s.add_layer("Roads", None);
        s.toggle_layer(roads);
        s.set_layer_color(roads, LayerColor::rgb(1, 1, 1));
        s.set_layer_visibility(roads, true);
        s.set_active_layer(roads);
        s.add_feature_to_layer(roads, point(0.0, 0.0));
        s.remove_layer(roads);
        assert_eq!(s.render_passes(), 7);
        assert!(s.engine().displayed.is_empty());
    }

    #[test]
    fn test_drawn_shape_reappears_via_render() {
        let mut s = session();
        let l = s.add_layer("L", Some(LayerColor::rgb(255, 0, 0)));
        let outcome = s.on_shape_completed(point(72.8, 19.0));
        assert_eq!(outcome, IngestOutcome::Committed(l));
        assert_eq!(s.engine().sketch_clears, 1);
        assert_eq!(s.engine().displayed.len(), 1);

        s.set_layer_color(l, LayerColor::rgb(0, 255, 0));
        assert_eq!(
            s.engine().displayed.features[0].stamped_color(),
            Some(LayerColor::rgb(0, 255, 0))
        );
    }

    #[test]
    fn test_hidden_layer_feature_not_displayed() {
        let mut s = session();
        let roads = s.add_layer("Roads", None);
        s.toggle_layer(roads);
        s.add_feature_to_layer(roads, point(1.0, 1.0));
        assert!(s.engine().displayed.is_empty());
        assert_eq!(s.store().feature_count(), 1);
    }

    #[test]
    fn test_drawing_without_layer_warns() {
        let mut s = session();
        let outcome = s.on_shape_completed(point(0.0, 0.0));
        assert_eq!(outcome, IngestOutcome::RejectedNoActiveLayer);
        assert_eq!(s.notifier().notices().len(), 1);
        assert_eq!(s.engine().sketch_clears, 1);
        assert_eq!(s.render_passes(), 0);
    }

    #[tokio::test]
    async fn test_request_capture_waits_for_idle() {
        let mut s = session();
        let rx = s.request_capture().unwrap();
        assert_eq!(s.engine().redraws, 1);
        assert_eq!(s.engine().captures, 0);
        s.on_idle();
        let bmp = await_capture(rx).await.unwrap();
        assert_eq!(bmp.width, 8);
        assert!(s.latest_capture().is_some());
    }

    #[tokio::test]
    async fn test_dispose_cancels_capture() {
        let mut s = session();
        let rx = s.request_capture().unwrap();
        s.dispose();
        s.on_idle();
        assert_eq!(await_capture(rx).await, Err(CaptureError::SurfaceDisposed));
        assert_eq!(s.request_capture().err(), Some(CaptureError::SurfaceDisposed));
        assert_eq!(s.engine().captures, 0);
    }

    #[test]
    fn test_mutations_after_dispose_skip_engine() {
        let mut s = session();
        let l = s.add_layer("L", None);
        s.dispose();
        s.toggle_layer(l);
        assert!(!s.store().layer(l).unwrap().visible);
        assert_eq!(s.render_passes(), 1);
    }

    #[test]
    fn test_shape_after_dispose_is_detached() {
        let mut s = session();
        let l = s.add_layer("L", None);
        s.dispose();
        let outcome = s.on_shape_completed(point(0.0, 0.0));
        assert_eq!(outcome, IngestOutcome::Detached);
        assert_eq!(s.store().layer(l).unwrap().feature_count(), 0);
        assert_eq!(s.engine().sketch_clears, 0);
        assert!(s.notifier().notices().is_empty());
    }
}
