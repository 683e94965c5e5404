//! Environment-driven configuration for the headless host.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use mapsketch_export::ExportSettings;
use mapsketch_renderer::{EngineConfig, RasterOverlay, RenderError, Viewport};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory exports are written to (`MAPSKETCH_OUT_DIR`).
    pub out_dir: PathBuf,
    /// Settle time before an isolated capture (`MAPSKETCH_SETTLE_MS`).
    pub settle_ms: u64,
    pub viewport: Viewport,
    /// Optional XYZ raster drawn under the sketch (`MAPSKETCH_OVERLAY_URL`).
    pub overlay_url: Option<String>,
    pub overlay_opacity: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("exports"),
            settle_ms: 500,
            viewport: Viewport::default(),
            overlay_url: None,
            overlay_opacity: 0.6,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default)
}

impl AppConfig {
    /// Defaults, overridden by any `MAPSKETCH_*` variables that parse.
    pub fn from_env() -> Self {
        let base = Self::default();
        let viewport = Viewport {
            center_lon: env_or("MAPSKETCH_CENTER_LON", base.viewport.center_lon),
            center_lat: env_or("MAPSKETCH_CENTER_LAT", base.viewport.center_lat),
            zoom: env_or("MAPSKETCH_ZOOM", base.viewport.zoom),
            canvas_width: env_or("MAPSKETCH_CANVAS_WIDTH", base.viewport.canvas_width),
            canvas_height: env_or("MAPSKETCH_CANVAS_HEIGHT", base.viewport.canvas_height),
        };
        Self {
            out_dir: env::var("MAPSKETCH_OUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(base.out_dir),
            settle_ms: env_or("MAPSKETCH_SETTLE_MS", base.settle_ms),
            viewport,
            overlay_url: env::var("MAPSKETCH_OVERLAY_URL").ok().filter(|s| !s.is_empty()),
            overlay_opacity: env_or("MAPSKETCH_OVERLAY_OPACITY", base.overlay_opacity),
        }
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            viewport: self.viewport,
            ..EngineConfig::default()
        }
    }

    pub fn export_settings(&self) -> ExportSettings {
        ExportSettings {
            output_dir: self.out_dir.clone(),
            view_file_name: "map-export.png".to_string(),
            layer_file_pattern: "layer-{name}.png".to_string(),
            settle_delay_ms: self.settle_ms,
            ..ExportSettings::default()
        }
    }

    pub fn overlay(&self) -> Option<Result<RasterOverlay, RenderError>> {
        self.overlay_url
            .as_deref()
            .map(|url| RasterOverlay::new("base-raster", url, self.overlay_opacity))
    }
}
