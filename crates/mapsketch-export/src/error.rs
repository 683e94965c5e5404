use std::io;

use mapsketch_renderer::CaptureError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("no page has been created")]
    NoPage,

    #[error("cannot place an empty {width}x{height} image")]
    EmptyImage { width: u32, height: u32 },

    #[error("encoding failed: {0}")]
    Encode(String),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("no active layer to export")]
    NoActiveLayer,

    #[error("capture failed: {0}")]
    Capture(#[from] CaptureError),

    #[error("page output failed: {0}")]
    Page(#[from] PageError),

    #[error("map session lock poisoned")]
    SessionPoisoned,
}
