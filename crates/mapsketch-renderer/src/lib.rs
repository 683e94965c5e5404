//! # MapSketch Renderer
//!
//! Bridge between the layer store and an external drawing engine.
//!
//! The engine (map display plus interactive sketching) sits behind the
//! [`DrawingEngine`] trait. This crate keeps the engine's committed-feature
//! display in step with the store, commits completed sketches into the
//! active layer, and captures rendered frames on idle for export.

pub mod capture;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod render_data;
pub mod session;
pub mod sync;
pub mod viewport;

pub use capture::CaptureController;
pub use engine::{Bitmap, DrawMode, DrawingEngine, EngineConfig, RasterOverlay};
pub use error::{CaptureError, RenderError};
pub use ingest::IngestOutcome;
pub use render_data::FeatureCollection;
pub use session::{MapSession, SharedSession};
pub use sync::RenderSynchronizer;
pub use viewport::Viewport;

#[cfg(test)]
pub(crate) mod testing;
