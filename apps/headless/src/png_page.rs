//! Page writer producing a single-page PNG at A4 proportions.

use std::fs;
use std::path::Path;

use image::imageops::{self, FilterType};
use image::{ImageFormat, Rgba, RgbaImage};
use mapsketch_export::{Orientation, PageError, PageSize, PageWriter, Placement};
use mapsketch_renderer::Bitmap;

/// A4 in PostScript points.
const A4_SHORT: f64 = 595.0;
const A4_LONG: f64 = 842.0;

#[derive(Debug)]
pub struct PngPageWriter {
    /// Output pixels per page point.
    scale: f64,
    page: Option<RgbaImage>,
}

impl Default for PngPageWriter {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl PngPageWriter {
    pub fn new(scale: f64) -> Self {
        Self { scale, page: None }
    }
}

impl PageWriter for PngPageWriter {
    fn create_page(&mut self, orientation: Orientation) -> Result<PageSize, PageError> {
        let size = match orientation {
            Orientation::Landscape => PageSize { width: A4_LONG, height: A4_SHORT },
            Orientation::Portrait => PageSize { width: A4_SHORT, height: A4_LONG },
        };
        let w = (size.width * self.scale).round() as u32;
        let h = (size.height * self.scale).round() as u32;
        self.page = Some(RgbaImage::from_pixel(w, h, Rgba([255, 255, 255, 255])));
        Ok(size)
    }

    fn embed_image(&mut self, bitmap: &Bitmap, placement: Placement) -> Result<(), PageError> {
        let scale = self.scale;
        let page = self.page.as_mut().ok_or(PageError::NoPage)?;
        let source = RgbaImage::from_raw(bitmap.width, bitmap.height, bitmap.pixels().to_vec())
            .ok_or(PageError::EmptyImage {
                width: bitmap.width,
                height: bitmap.height,
            })?;

        let w = (placement.width * scale).round().max(1.0) as u32;
        let h = (placement.height * scale).round().max(1.0) as u32;
        let resized = imageops::resize(&source, w, h, FilterType::Triangle);
        let x = (placement.x * scale).round() as i64;
        let y = (placement.y * scale).round() as i64;
        imageops::overlay(page, &resized, x, y);
        Ok(())
    }

    fn save(&mut self, path: &Path) -> Result<(), PageError> {
        let page = self.page.take().ok_or(PageError::NoPage)?;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        page.save_with_format(path, ImageFormat::Png)
            .map_err(|e| PageError::Encode(e.to_string()))
    }
}
