use std::f64::consts::PI;

use mapsketch_core::{BBox, Point};
use serde::{Deserialize, Serialize};

/// Side length of one Web-Mercator tile in pixels.
const TILE_SIZE: f64 = 256.0;
/// Latitude limit of the Web-Mercator projection.
const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

/// Initial camera of the map view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Centre longitude in degrees.
    pub center_lon: f64,
    /// Centre latitude in degrees.
    pub center_lat: f64,
    /// Web-Mercator zoom level.
    pub zoom: f64,
    /// Canvas width in pixels.
    pub canvas_width: u32,
    /// Canvas height in pixels.
    pub canvas_height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            center_lon: 72.8777,
            center_lat: 19.076,
            zoom: 10.0,
            canvas_width: 1400,
            canvas_height: 900,
        }
    }
}

impl Viewport {
    pub fn new(canvas_width: u32, canvas_height: u32) -> Self {
        Self {
            canvas_width,
            canvas_height,
            ..Self::default()
        }
    }

    pub fn centered_at(mut self, lon: f64, lat: f64, zoom: f64) -> Self {
        self.center_lon = lon;
        self.center_lat = lat;
        self.zoom = zoom;
        self
    }

    fn world_size(&self) -> f64 {
        TILE_SIZE * self.zoom.exp2()
    }

    /// Project a lon/lat position to absolute world pixels at this zoom.
    fn to_world(&self, lon: f64, lat: f64) -> (f64, f64) {
        let size = self.world_size();
        let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
        let x = (lon + 180.0) / 360.0 * size;
        let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * size;
        (x, y)
    }

    /// Convert a lon/lat position to canvas pixel coordinates.
    pub fn lonlat_to_screen(&self, p: &Point) -> (f64, f64) {
        let (cx, cy) = self.to_world(self.center_lon, self.center_lat);
        let (x, y) = self.to_world(p.x, p.y);
        (
            x - cx + self.canvas_width as f64 / 2.0,
            y - cy + self.canvas_height as f64 / 2.0,
        )
    }

    /// Convert canvas pixel coordinates back to lon/lat.
    pub fn screen_to_lonlat(&self, sx: f64, sy: f64) -> Point {
        let size = self.world_size();
        let (cx, cy) = self.to_world(self.center_lon, self.center_lat);
        let wx = sx - self.canvas_width as f64 / 2.0 + cx;
        let wy = sy - self.canvas_height as f64 / 2.0 + cy;
        let lon = wx / size * 360.0 - 180.0;
        let n = PI * (1.0 - 2.0 * wy / size);
        let lat = n.sinh().atan().to_degrees();
        Point::new(lon, lat)
    }

    /// Lon/lat box covered by the canvas.
    pub fn visible_bounds(&self) -> BBox {
        let nw = self.screen_to_lonlat(0.0, 0.0);
        let se = self.screen_to_lonlat(self.canvas_width as f64, self.canvas_height as f64);
        BBox::new(Point::new(nw.x, se.y), Point::new(se.x, nw.y))
    }

    /// `(z, x, y)` of the slippy-map tile under the centre, at the integer
    /// zoom at or below the current one.
    pub fn center_tile(&self) -> (u32, u32, u32) {
        let z = self.zoom.max(0.0).floor();
        let at_tile_zoom = Self { zoom: z, ..*self };
        let (wx, wy) = at_tile_zoom.to_world(self.center_lon, self.center_lat);
        let last = z.exp2() - 1.0;
        let tile = |w: f64| (w / TILE_SIZE).floor().clamp(0.0, last) as u32;
        (z as u32, tile(wx), tile(wy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_maps_to_canvas_middle() {
        let vp = Viewport::new(800, 600);
        let (x, y) = vp.lonlat_to_screen(&Point::new(vp.center_lon, vp.center_lat));
        assert!((x - 400.0).abs() < 1e-6);
        assert!((y - 300.0).abs() < 1e-6);
    }

    #[test]
    fn test_screen_round_trip() {
        let vp = Viewport::new(800, 600).centered_at(-0.1276, 51.5072, 12.0);
        let p = vp.screen_to_lonlat(10.0, 590.0);
        let (x, y) = vp.lonlat_to_screen(&p);
        assert!((x - 10.0).abs() < 1e-6);
        assert!((y - 590.0).abs() < 1e-6);
    }

    #[test]
    fn test_north_is_up() {
        let vp = Viewport::new(800, 600);
        let (_, y_north) = vp.lonlat_to_screen(&Point::new(vp.center_lon, vp.center_lat + 0.01));
        assert!(y_north < 300.0);
    }

    #[test]
    fn test_visible_bounds_surround_center() {
        let vp = Viewport::new(200, 100).centered_at(10.0, 20.0, 8.0);
        let bounds = vp.visible_bounds();
        assert!(bounds.min.x < 10.0 && 10.0 < bounds.max.x);
        assert!(bounds.min.y < 20.0 && 20.0 < bounds.max.y);
        // Wider canvas, wider span of longitude.
        assert!(bounds.max.x - bounds.min.x > bounds.max.y - bounds.min.y);
    }

    #[test]
    fn test_center_tile() {
        assert_eq!(Viewport::new(10, 10).centered_at(0.0, 0.0, 0.0).center_tile(), (0, 0, 0));
        assert_eq!(Viewport::new(10, 10).centered_at(0.0, 0.0, 1.5).center_tile(), (1, 1, 1));
        let (z, x, y) = Viewport::default().center_tile();
        assert_eq!(z, 10);
        // Mumbai sits in the north-east quadrant of the world.
        assert!(x > 512 && y < 512);
    }
}
