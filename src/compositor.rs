//! Core watermark compositing.

use std::env;

use image::{DynamicImage, RgbaImage};

use crate::blending;
use crate::error::{Error, Result};
use crate::font::{self, FontSource, TextMask};
use crate::position;
use crate::style::{self, WatermarkSpec};

/// Environment variable selecting the watermark font (a path or a file name).
pub const FONT_ENV: &str = "TEXT_WATERMARK_FONT";

/// Options controlling how watermarks are rendered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompositorConfig {
    /// Font used for every watermark.
    pub font: FontSource,
}

impl CompositorConfig {
    /// Config with an explicit font source.
    #[must_use]
    pub fn with_font(font: FontSource) -> Self {
        Self { font }
    }

    /// Config from the environment.
    ///
    /// `TEXT_WATERMARK_FONT` selects the font; an existing file is used as a
    /// path, anything else is looked up by name. Unset falls back to the default.
    #[must_use]
    pub fn from_env() -> Self {
        match env::var(FONT_ENV) {
            Ok(value) if !value.trim().is_empty() => Self::with_font(FontSource::from_arg(value.trim())),
            _ => Self::default(),
        }
    }
}

/// Where and how large the watermark text ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Font size in pixels.
    pub font_size: u32,
    /// Rendered ink width.
    pub text_width: u32,
    /// Rendered ink height.
    pub text_height: u32,
    /// Resolved horizontal layout origin the text is drawn from.
    pub x: i64,
    /// Resolved vertical layout origin (top of the line) the text is drawn from.
    pub y: i64,
    /// Horizontal distance from the layout origin to the first ink column.
    pub ink_offset_x: i32,
    /// Vertical distance from the layout origin to the first ink row.
    pub ink_offset_y: i32,
}

/// Stateless text watermark compositor.
///
/// Holds only configuration; every call to [`Compositor::apply`] acquires the
/// font, renders, and releases it again.
#[derive(Debug, Clone, Default)]
pub struct Compositor {
    config: CompositorConfig,
}

impl Compositor {
    /// Create a compositor with the given configuration.
    #[must_use]
    pub fn new(config: CompositorConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &CompositorConfig {
        &self.config
    }

    /// Apply a text watermark to a copy of `image`.
    ///
    /// The source is left untouched; the watermarked copy is returned as RGBA.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyImage`] if the image has zero area.
    /// - [`Error::EmptyText`] if the text is blank.
    /// - [`Error::RenderFailure`] if the font cannot be loaded.
    pub fn apply(&self, image: &DynamicImage, spec: &WatermarkSpec) -> Result<RgbaImage> {
        self.apply_with_placement(image, spec).map(|(img, _)| img)
    }

    /// Like [`Compositor::apply`], also reporting where the text was placed.
    ///
    /// # Errors
    ///
    /// Same as [`Compositor::apply`].
    pub fn apply_with_placement(
        &self,
        image: &DynamicImage,
        spec: &WatermarkSpec,
    ) -> Result<(RgbaImage, Placement)> {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(Error::EmptyImage);
        }
        if spec.is_blank() {
            return Err(Error::EmptyText);
        }

        let mut working = image.to_rgba8();
        let font_size = style::font_size_for(width, height);

        #[allow(clippy::cast_precision_loss)]
        let size_px = font_size as f32;
        // The font lives only for this block.
        let mask = {
            let font = self.config.font.load()?;
            font::render_text(&font, &spec.text, size_px)
        };

        let placement = self.place(&mask, font_size, width, height, spec);
        tracing::debug!(
            anchor = %spec.anchor,
            font_size,
            x = placement.x,
            y = placement.y,
            "placing watermark"
        );

        // Text is drawn from the line origin, so the ink lands one offset past it.
        blending::blend_text_mask(&mut working, &mask, placement.x, placement.y, spec.fill());
        Ok((working, placement))
    }

    /// Resolve the layout origin for the watermark's anchor, sized by the ink extents.
    #[allow(clippy::unused_self)]
    fn place(
        &self,
        mask: &TextMask,
        font_size: u32,
        img_w: u32,
        img_h: u32,
        spec: &WatermarkSpec,
    ) -> Placement {
        let (x, y) = position::resolve(&spec.anchor, mask.width, mask.height, img_w, img_h);
        Placement {
            font_size,
            text_width: mask.width,
            text_height: mask.height,
            x,
            y,
            ink_offset_x: mask.offset_x,
            ink_offset_y: mask.offset_y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn missing_font() -> Compositor {
        Compositor::new(CompositorConfig::with_font(FontSource::Named(
            "missing-font-for-tests.ttf".to_string(),
        )))
    }

    #[test]
    fn zero_area_image_is_empty_image() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
        let err = missing_font().apply(&img, &WatermarkSpec::new("hi")).unwrap_err();
        assert!(matches!(err, Error::EmptyImage));
    }

    #[test]
    fn blank_text_is_checked_before_font_lookup() {
        let img = DynamicImage::ImageRgb8(RgbImage::new(40, 40));
        let err = missing_font().apply(&img, &WatermarkSpec::new("   ")).unwrap_err();
        assert!(matches!(err, Error::EmptyText));
    }

    #[test]
    fn missing_font_is_render_failure_and_source_untouched() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 40, Rgb([9, 9, 9])));
        let before = img.clone();
        let err = missing_font().apply(&img, &WatermarkSpec::new("hi")).unwrap_err();
        assert!(matches!(err, Error::RenderFailure { .. }));
        assert_eq!(img, before);
    }

    #[test]
    fn placement_uses_ink_dimensions() {
        let mask = TextMask {
            width: 100,
            height: 50,
            offset_x: 2,
            offset_y: 7,
            coverage: vec![0.0; 5000],
        };
        let spec = WatermarkSpec::new("x");
        let placement = Compositor::default().place(&mask, 15, 400, 300, &spec);
        assert_eq!((placement.x, placement.y), (150, 125));
        assert_eq!((placement.text_width, placement.text_height), (100, 50));
        assert_eq!((placement.ink_offset_x, placement.ink_offset_y), (2, 7));
    }

    #[test]
    fn config_defaults_to_named_font() {
        assert_eq!(CompositorConfig::default().font, FontSource::default());
    }
}
