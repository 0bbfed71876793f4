//! Error types for the inklab-stencil crate.

/// Errors that can occur while keying, compositing, encoding or exporting a stencil.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The source payload could not be decoded into a raster image.
    #[error("failed to decode image: {0}")]
    Decode(image::ImageError),

    /// The payload is not a well-formed base64 data URI.
    #[error("invalid image payload: {0}")]
    InvalidPayload(String),

    /// The payload declares a MIME type other than PNG or JPEG.
    #[error("unsupported MIME type: {0}")]
    UnsupportedMimeType(String),

    /// The source image has a zero width or height.
    #[error("source image has no pixels")]
    EmptyImage,

    /// The drawing surface for the export canvas could not be allocated.
    #[error("cannot allocate a {width}x{height} drawing surface")]
    Canvas {
        /// Requested canvas width in pixels.
        width: u64,
        /// Requested canvas height in pixels.
        height: u64,
    },

    /// The stencil generation service returned no image.
    #[error("stencil generation failed: {0}")]
    ExternalService(String),

    /// A preview or export was requested before a stencil was generated.
    #[error("no stencil is available; submit a source image first")]
    NotReady,

    /// An export frame configuration could not be parsed.
    #[error("invalid frame configuration: {0}")]
    Config(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error occurred while encoding an image.
    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let io_err = Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(io_err.to_string().contains("gone"));

        let mime = Error::UnsupportedMimeType("image/gif".to_string());
        assert!(mime.to_string().contains("image/gif"));

        let canvas = Error::Canvas {
            width: 70_000,
            height: 90_000,
        };
        assert!(canvas.to_string().contains("70000x90000"));

        let refused = Error::ExternalService("model replied with text".to_string());
        assert!(refused.to_string().contains("replied with text"));
    }
}
