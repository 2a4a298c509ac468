//! Error types for the text-watermark crate.

use std::error::Error as StdError;

/// Boxed underlying cause of a [`Error::RenderFailure`].
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Errors returned by the compositor and the session layer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No source image is loaded, or the image has zero area.
    #[error("no source image loaded")]
    EmptyImage,

    /// The watermark text is empty or whitespace-only.
    #[error("watermark text is empty")]
    EmptyText,

    /// Font lookup, rasterization, image codec or file I/O failed.
    #[error("{message}")]
    RenderFailure {
        /// Human-readable description of what went wrong.
        message: String,
        /// Underlying cause, when there is one.
        #[source]
        source: Option<BoxError>,
    },
}

impl Error {
    /// Build a [`Error::RenderFailure`] with no underlying cause.
    pub fn render(message: impl Into<String>) -> Self {
        Self::RenderFailure {
            message: message.into(),
            source: None,
        }
    }

    /// Build a [`Error::RenderFailure`] wrapping `source`.
    pub fn render_with(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::RenderFailure {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::render_with(format!("I/O error: {err}"), err)
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Self::render_with(format!("image processing error: {err}"), err)
    }
}

impl From<ab_glyph::InvalidFont> for Error {
    fn from(err: ab_glyph::InvalidFont) -> Self {
        Self::render_with(format!("invalid font data: {err}"), err)
    }
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        assert_eq!(Error::EmptyImage.to_string(), "no source image loaded");
        assert_eq!(Error::EmptyText.to_string(), "watermark text is empty");

        let io_err: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(io_err.to_string().contains("gone"));
        assert!(matches!(io_err, Error::RenderFailure { source: Some(_), .. }));

        let plain = Error::render("font `arial.ttf` not found");
        assert_eq!(plain.to_string(), "font `arial.ttf` not found");
        assert!(StdError::source(&plain).is_none());
    }

    #[test]
    fn invalid_font_maps_to_render_failure() {
        let err: Error = ab_glyph::InvalidFont.into();
        assert!(matches!(err, Error::RenderFailure { .. }));
        assert!(err.to_string().starts_with("invalid font data"));
    }
}
