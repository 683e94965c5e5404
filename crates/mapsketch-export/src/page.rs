use std::path::Path;

use mapsketch_renderer::Bitmap;
use serde::{Deserialize, Serialize};

use crate::error::PageError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Landscape,
    Portrait,
}

/// Page dimensions in the writer's units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

/// Where an image lands on the page. Offsets may be negative when the image
/// overhangs the page edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Scale `image` to cover the whole page, preserving aspect ratio, and
/// centre it. Returns `None` for a zero-sized image.
pub fn cover_fit(page: PageSize, image_width: u32, image_height: u32) -> Option<Placement> {
    if image_width == 0 || image_height == 0 {
        return None;
    }
    let (iw, ih) = (image_width as f64, image_height as f64);
    let scale = (page.width / iw).max(page.height / ih);
    let width = iw * scale;
    let height = ih * scale;
    Some(Placement {
        x: (page.width - width) / 2.0,
        y: (page.height - height) / 2.0,
        width,
        height,
    })
}

/// A document writer that can hold one page with one embedded image.
pub trait PageWriter {
    /// Start a fresh page, discarding anything not yet saved.
    fn create_page(&mut self, orientation: Orientation) -> Result<PageSize, PageError>;

    fn embed_image(&mut self, bitmap: &Bitmap, placement: Placement) -> Result<(), PageError>;

    fn save(&mut self, path: &Path) -> Result<(), PageError>;
}
