use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("engine initialisation failed for container {container:?}: {message}")]
    Initialize { container: String, message: String },

    #[error("tile URL template {0:?} must contain {{z}}, {{x}} and {{y}}")]
    InvalidTileTemplate(String),

    #[error("overlay opacity {0} is outside 0.0..=1.0")]
    InvalidOpacity(f32),
}

/// Why an idle-time capture produced no bitmap.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureError {
    #[error("rendering surface is not available")]
    SurfaceUnavailable,

    #[error("rendering surface was torn down before the capture completed")]
    SurfaceDisposed,
}
