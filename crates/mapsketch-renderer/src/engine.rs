use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::RenderError;
use crate::render_data::FeatureCollection;
use crate::viewport::Viewport;

/// Interactive sketch mode of the drawing engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawMode {
    /// Select and move existing shapes; nothing new is drawn.
    Simple,
    Point,
    LineString,
    Polygon,
}

impl DrawMode {
    pub fn engine_name(&self) -> &'static str {
        match self {
            DrawMode::Simple => "simple_select",
            DrawMode::Point => "draw_point",
            DrawMode::LineString => "draw_line_string",
            DrawMode::Polygon => "draw_polygon",
        }
    }
}

/// Everything an engine needs to attach to its host container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Host element the map is mounted in.
    pub container_id: String,
    /// Base map style descriptor URL.
    pub style_url: String,
    pub viewport: Viewport,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            container_id: "map".to_string(),
            style_url: "https://api.maptiler.com/maps/streets/style.json".to_string(),
            viewport: Viewport::default(),
        }
    }
}

/// A tiled raster source drawn beneath the sketched features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterOverlay {
    pub source_id: String,
    /// XYZ template, e.g. `https://host/tiles/{z}/{x}/{y}`.
    pub tile_url_template: String,
    pub opacity: f32,
}

impl RasterOverlay {
    pub fn new(source_id: &str, tile_url_template: &str, opacity: f32) -> Result<Self, RenderError> {
        if !["{z}", "{x}", "{y}"]
            .iter()
            .all(|token| tile_url_template.contains(token))
        {
            return Err(RenderError::InvalidTileTemplate(tile_url_template.to_string()));
        }
        if !(0.0..=1.0).contains(&opacity) {
            return Err(RenderError::InvalidOpacity(opacity));
        }
        Ok(Self {
            source_id: source_id.to_string(),
            tile_url_template: tile_url_template.to_string(),
            opacity,
        })
    }

    /// Concrete URL for one tile.
    pub fn tile_url(&self, z: u32, x: u32, y: u32) -> String {
        self.tile_url_template
            .replace("{z}", &z.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
    }
}

/// An RGBA8 frame read back from the rendering surface.
///
/// Pixel storage is shared, so clones are cheap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pixels: Arc<[u8]>,
}

impl Bitmap {
    /// Returns `None` unless `pixels` holds exactly `width * height` RGBA texels.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        if pixels.len() != width as usize * height as usize * 4 {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels: pixels.into(),
        })
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]])
    }
}

/// The external map/sketch engine, seen from the core.
///
/// Engine events flow the other way: the host forwards "shape completed"
/// to [`crate::MapSession::on_shape_completed`] and idle notifications to
/// [`crate::MapSession::on_idle`].
pub trait DrawingEngine: Send {
    fn initialize(config: &EngineConfig) -> Result<Self, RenderError>
    where
        Self: Sized;

    fn set_draw_mode(&mut self, mode: DrawMode);

    /// Swap the whole committed-feature display for `features`.
    fn replace_displayed_features(&mut self, features: &FeatureCollection);

    fn clear_displayed_features(&mut self);

    /// Drop whatever is in the transient sketch.
    fn clear_sketch(&mut self);

    /// Schedule a repaint. The engine signals idle once it has settled.
    fn request_redraw(&mut self);

    /// Read the current frame. Only meaningful once per idle notification;
    /// `None` when there is no surface to read.
    fn capture_bitmap(&mut self) -> Option<Bitmap>;

    fn add_raster_overlay(&mut self, overlay: &RasterOverlay);
}
