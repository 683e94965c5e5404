//! Software stand-in for the map engine: paints committed features into an
//! in-memory RGBA surface. No base map tiles are drawn.

use image::{Rgba, RgbaImage};
use mapsketch_core::{Feature, Geometry, LayerColor, Point};
use mapsketch_renderer::{
    Bitmap, DrawMode, DrawingEngine, EngineConfig, FeatureCollection, RasterOverlay, RenderError,
    Viewport,
};

const BACKGROUND: Rgba<u8> = Rgba([242, 239, 233, 255]);
const POINT_RADIUS: i64 = 4;
const FILL_ALPHA: u8 = 96;

#[derive(Debug)]
pub struct RasterEngine {
    viewport: Viewport,
    container_id: String,
    displayed: FeatureCollection,
    surface: RgbaImage,
    /// Display changed since the last repaint.
    dirty: bool,
}

impl RasterEngine {
    /// No repaint outstanding; the host turns this into an idle notification.
    pub fn is_idle(&self) -> bool {
        !self.dirty
    }

    fn repaint(&mut self) {
        let mut surface = RgbaImage::from_pixel(
            self.viewport.canvas_width,
            self.viewport.canvas_height,
            BACKGROUND,
        );
        let bounds = self.viewport.visible_bounds();
        let mut painted = 0;
        for feature in self.displayed.iter() {
            let on_screen = feature
                .geometry
                .as_ref()
                .and_then(Geometry::bbox)
                .is_some_and(|bbox| bbox.intersects(&bounds));
            if on_screen {
                paint_feature(&mut surface, &self.viewport, feature);
                painted += 1;
            }
        }
        self.surface = surface;
        self.dirty = false;
        log::debug!(
            "Repainted {} ({} of {} feature(s) on screen)",
            self.container_id,
            painted,
            self.displayed.len()
        );
    }
}

impl DrawingEngine for RasterEngine {
    fn initialize(config: &EngineConfig) -> Result<Self, RenderError> {
        let vp = config.viewport;
        if vp.canvas_width == 0 || vp.canvas_height == 0 {
            return Err(RenderError::Initialize {
                container: config.container_id.clone(),
                message: format!("canvas {}x{} has no area", vp.canvas_width, vp.canvas_height),
            });
        }
        log::info!(
            "Mounted raster engine in {:?} ({}x{}, centre {:.4},{:.4} z{})",
            config.container_id,
            vp.canvas_width,
            vp.canvas_height,
            vp.center_lon,
            vp.center_lat,
            vp.zoom
        );
        Ok(Self {
            viewport: vp,
            container_id: config.container_id.clone(),
            displayed: FeatureCollection::default(),
            surface: RgbaImage::from_pixel(vp.canvas_width, vp.canvas_height, BACKGROUND),
            dirty: false,
        })
    }

    fn set_draw_mode(&mut self, mode: DrawMode) {
        log::debug!("Draw mode -> {}", mode.engine_name());
    }

    fn replace_displayed_features(&mut self, features: &FeatureCollection) {
        self.displayed = features.clone();
        self.dirty = true;
    }

    fn clear_displayed_features(&mut self) {
        self.displayed = FeatureCollection::default();
        self.dirty = true;
    }

    fn clear_sketch(&mut self) {
        log::debug!("Sketch cleared");
    }

    fn request_redraw(&mut self) {
        self.repaint();
    }

    fn capture_bitmap(&mut self) -> Option<Bitmap> {
        Bitmap::from_rgba(
            self.surface.width(),
            self.surface.height(),
            self.surface.as_raw().clone(),
        )
    }

    fn add_raster_overlay(&mut self, overlay: &RasterOverlay) {
        let (z, x, y) = self.viewport.center_tile();
        log::info!(
            "Overlay {} registered at opacity {}, centre tile {}; tiles are not fetched headless",
            overlay.source_id,
            overlay.opacity,
            overlay.tile_url(z, x, y)
        );
    }
}

fn paint_feature(surface: &mut RgbaImage, viewport: &Viewport, feature: &Feature) {
    let color = feature.stamped_color().unwrap_or_default();
    let project = |p: &Point| viewport.lonlat_to_screen(p);
    match &feature.geometry {
        Some(Geometry::Point(p)) => {
            let (x, y) = project(p);
            fill_disc(surface, x, y, color);
        }
        Some(Geometry::LineString(points)) => {
            let screen: Vec<(f64, f64)> = points.iter().map(project).collect();
            stroke(surface, &screen, color);
        }
        Some(Geometry::Polygon(rings)) => {
            let screen: Vec<Vec<(f64, f64)>> = rings
                .iter()
                .map(|ring| ring.iter().map(project).collect())
                .collect();
            fill_rings(surface, &screen, color);
            for ring in &screen {
                let mut closed = ring.clone();
                if let Some(&first) = ring.first() {
                    closed.push(first);
                }
                stroke(surface, &closed, color);
            }
        }
        None => {}
    }
}

fn blend(surface: &mut RgbaImage, x: i64, y: i64, color: LayerColor, alpha: u8) {
    if x < 0 || y < 0 || x >= surface.width() as i64 || y >= surface.height() as i64 {
        return;
    }
    let dst = surface.get_pixel_mut(x as u32, y as u32);
    let a = alpha as u32;
    let src = color.to_rgba(255);
    for c in 0..3 {
        dst.0[c] = ((src[c] as u32 * a + dst.0[c] as u32 * (255 - a)) / 255) as u8;
    }
    dst.0[3] = 255;
}

fn fill_disc(surface: &mut RgbaImage, cx: f64, cy: f64, color: LayerColor) {
    let (cx, cy) = (cx.round() as i64, cy.round() as i64);
    for dy in -POINT_RADIUS..=POINT_RADIUS {
        for dx in -POINT_RADIUS..=POINT_RADIUS {
            if dx * dx + dy * dy <= POINT_RADIUS * POINT_RADIUS {
                blend(surface, cx + dx, cy + dy, color, 255);
            }
        }
    }
}

/// Two-pixel polyline, stamped along each segment.
fn stroke(surface: &mut RgbaImage, points: &[(f64, f64)], color: LayerColor) {
    for seg in points.windows(2) {
        let (x0, y0) = seg[0];
        let (x1, y1) = seg[1];
        let steps = (x1 - x0).abs().max((y1 - y0).abs()).ceil().max(1.0) as i64;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let x = (x0 + (x1 - x0) * t).round() as i64;
            let y = (y0 + (y1 - y0) * t).round() as i64;
            for (ox, oy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
                blend(surface, x + ox, y + oy, color, 255);
            }
        }
    }
}

/// Even-odd scanline fill across all rings, so holes stay open.
fn fill_rings(surface: &mut RgbaImage, rings: &[Vec<(f64, f64)>], color: LayerColor) {
    let height = surface.height() as i64;
    let (min_y, max_y) = rings
        .iter()
        .flatten()
        .fold((f64::MAX, f64::MIN), |(lo, hi), &(_, y)| (lo.min(y), hi.max(y)));
    if min_y > max_y {
        return;
    }
    let first_row = (min_y.floor() as i64).max(0);
    let last_row = (max_y.ceil() as i64).min(height - 1);

    for row in first_row..=last_row {
        let sy = row as f64 + 0.5;
        let mut crossings: Vec<f64> = Vec::new();
        for ring in rings {
            let n = ring.len();
            for i in 0..n {
                let (ax, ay) = ring[i];
                let (bx, by) = ring[(i + 1) % n];
                if (ay <= sy && by > sy) || (by <= sy && ay > sy) {
                    crossings.push(ax + (sy - ay) / (by - ay) * (bx - ax));
                }
            }
        }
        crossings.sort_by(f64::total_cmp);
        for pair in crossings.chunks_exact(2) {
            let start = pair[0].round() as i64;
            let end = pair[1].round() as i64;
            for x in start..end {
                blend(surface, x, row, color, FILL_ALPHA);
            }
        }
    }
}
