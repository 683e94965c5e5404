//! # MapSketch Core
//!
//! In-memory layer model for hand-drawn map sketches: named, coloured,
//! independently toggleable layers of GeoJSON-style features, plus the
//! store that owns them and the active-layer pointer.
//!
//! Nothing here talks to a drawing engine. The renderer crate bridges the
//! store to an engine; the export crate turns the rendered view into pages.

pub mod color;
pub mod error;
pub mod feature;
pub mod geometry;
pub mod layer;
pub mod notice;
pub mod store;

pub use color::LayerColor;
pub use error::MapError;
pub use feature::{Feature, COLOR_PROPERTY};
pub use geometry::{BBox, Geometry, Point};
pub use layer::{Layer, LayerId};
pub use notice::{Notice, NoticeLog, Notifier, Severity};
pub use store::LayerStore;
