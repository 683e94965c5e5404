//! Recording engine shared by this crate's unit tests.

use crate::engine::{Bitmap, DrawMode, DrawingEngine, EngineConfig, RasterOverlay};
use crate::error::RenderError;
use crate::render_data::FeatureCollection;

#[derive(Debug, Default)]
pub struct RecordingEngine {
    pub displayed: FeatureCollection,
    pub clear_calls: usize,
    pub replace_calls: usize,
    pub sketch_clears: usize,
    pub redraws: usize,
    pub captures: usize,
    pub mode: Option<DrawMode>,
    pub overlays: Vec<RasterOverlay>,
    pub frame: Option<Bitmap>,
}

impl RecordingEngine {
    pub fn with_frame(width: u32, height: u32) -> Self {
        Self {
            frame: Bitmap::from_rgba(width, height, vec![255; (width * height * 4) as usize]),
            ..Self::default()
        }
    }
}

impl DrawingEngine for RecordingEngine {
    fn initialize(_config: &EngineConfig) -> Result<Self, RenderError> {
        Ok(Self::default())
    }

    fn set_draw_mode(&mut self, mode: DrawMode) {
        self.mode = Some(mode);
    }

    fn replace_displayed_features(&mut self, features: &FeatureCollection) {
        self.replace_calls += 1;
        self.displayed = features.clone();
    }

    fn clear_displayed_features(&mut self) {
        self.clear_calls += 1;
        self.displayed = FeatureCollection::default();
    }

    fn clear_sketch(&mut self) {
        self.sketch_clears += 1;
    }

    fn request_redraw(&mut self) {
        self.redraws += 1;
    }

    fn capture_bitmap(&mut self) -> Option<Bitmap> {
        self.captures += 1;
        self.frame.clone()
    }

    fn add_raster_overlay(&mut self, overlay: &RasterOverlay) {
        self.overlays.push(overlay.clone());
    }
}
