//! # MapSketch Export
//!
//! Turns the rendered map into a printable page. A capture is taken at the
//! engine's next idle notification, scaled to cover the page, and saved
//! through a [`PageWriter`]. Layer isolation hides every other layer for
//! the duration of one export and always restores visibility afterwards.

pub mod coordinator;
pub mod error;
pub mod page;
pub mod settings;

pub use coordinator::ExportCoordinator;
pub use error::{ExportError, PageError};
pub use page::{cover_fit, Orientation, PageSize, PageWriter, Placement};
pub use settings::ExportSettings;
