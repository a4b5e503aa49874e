//! Error types for the QR rendering library

use thiserror::Error;

/// Rendering error types
#[derive(Debug, Error)]
pub enum RenderError {
    /// Payload could not be encoded (usually too long for any QR version)
    #[error("QR encoding failed: {0}")]
    Encode(String),

    /// Requested raster is smaller than one pixel per module
    #[error("Size {requested}px too small, need at least {minimum}px")]
    TooSmall { requested: u32, minimum: u32 },

    /// Image encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
