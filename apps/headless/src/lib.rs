//! # MapSketch headless host
//!
//! Wires the layer store, a software raster engine and a PNG page writer
//! together and runs a scripted sketching session end to end.

pub mod config;
pub mod host;
pub mod png_page;
pub mod raster_engine;

use std::path::PathBuf;

use mapsketch_core::{Feature, Geometry, LayerColor, NoticeLog, Point};
use mapsketch_export::{ExportCoordinator, ExportError};
use mapsketch_renderer::{DrawMode, DrawingEngine, IngestOutcome, MapSession, RenderError};
use thiserror::Error;

pub use config::AppConfig;
pub use png_page::PngPageWriter;
pub use raster_engine::RasterEngine;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("engine error: {0}")]
    Render(#[from] RenderError),

    #[error("export error: {0}")]
    Export(#[from] ExportError),
}

/// What a demo run produced.
#[derive(Debug)]
pub struct DemoReport {
    pub layer_count: usize,
    pub feature_count: usize,
    pub exported: Vec<PathBuf>,
    pub notices: usize,
}

/// Sketch two layers around the configured centre, recolour one, and export
/// both the full view and the active layer alone.
pub async fn run(config: AppConfig) -> Result<DemoReport, AppError> {
    let engine = RasterEngine::initialize(&config.engine_config())?;
    let session = MapSession::new(engine, NoticeLog::new()).shared();
    let mut exporter = ExportCoordinator::new(PngPageWriter::default(), config.export_settings());

    let (cx, cy) = (config.viewport.center_lon, config.viewport.center_lat);
    let at = |dx: f64, dy: f64| Point::new(cx + dx, cy + dy);

    let roads = {
        let mut s = session.lock().map_err(|_| ExportError::SessionPoisoned)?;
        if let Some(overlay) = config.overlay() {
            s.add_raster_overlay(&overlay?);
        }
        s.set_draw_mode(DrawMode::Polygon);

        // Nothing to draw into yet.
        let early = s.on_shape_completed(Feature::new(Geometry::Point(at(0.0, 0.0))));
        if early == IngestOutcome::RejectedNoActiveLayer {
            log::info!("Sketch before any layer was rejected, as expected");
        }

        let roads = s.add_layer("Roads", Some(LayerColor::rgb(228, 87, 46)));
        for shape in [
            Geometry::LineString(vec![at(-0.4, -0.2), at(0.0, 0.0), at(0.4, 0.15)]),
            Geometry::LineString(vec![at(-0.1, 0.3), at(0.05, -0.3)]),
        ] {
            s.on_shape_completed(Feature::new(shape).with_property("kind", "road"));
        }

        s.add_layer("Parks", None);
        s.on_shape_completed(Feature::new(Geometry::Polygon(vec![vec![
            at(0.1, 0.1),
            at(0.3, 0.1),
            at(0.3, 0.25),
            at(0.1, 0.25),
            at(0.1, 0.1),
        ]])));
        s.on_shape_completed(Feature::new(Geometry::Point(at(-0.25, 0.2))));

        s.set_layer_color(roads, LayerColor::rgb(40, 40, 40));
        s.set_active_layer(roads);
        roads
    };

    let mut exported = Vec::new();
    exported.push(host::with_idle_events(&session, exporter.export_view(&session)).await?);
    exported.push(host::with_idle_events(&session, exporter.export_active_layer(&session)).await?);

    let s = session.lock().map_err(|_| ExportError::SessionPoisoned)?;
    log::info!(
        "Session finished: {} layer(s), {} feature(s), roads visible: {}",
        s.store().layer_count(),
        s.store().feature_count(),
        s.store().layer(roads).is_some_and(|l| l.visible)
    );
    Ok(DemoReport {
        layer_count: s.store().layer_count(),
        feature_count: s.store().feature_count(),
        exported,
        notices: s.notifier().notices().len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_demo_writes_both_pages() {
        let out_dir = std::env::temp_dir().join(format!("mapsketch-demo-{}", std::process::id()));
        let config = AppConfig {
            out_dir: out_dir.clone(),
            settle_ms: 0,
            ..AppConfig::default()
        };

        let report = run(config).await.unwrap();

        assert_eq!(report.layer_count, 2);
        assert_eq!(report.feature_count, 4);
        assert_eq!(report.notices, 1);
        assert_eq!(report.exported.len(), 2);
        for path in &report.exported {
            let img = image::open(path).unwrap();
            assert_eq!((img.width(), img.height()), (842, 595));
        }
        assert!(report.exported[1].ends_with("layer-Roads.png"));
        let _ = std::fs::remove_dir_all(out_dir);
    }
}
