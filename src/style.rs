//! Watermark style parameters.

use image::{Rgb, Rgba};

use crate::position::Anchor;

/// Default opacity percentage.
pub const DEFAULT_OPACITY: u8 = 50;

/// Image dimension divisor used to derive the font size.
const FONT_SIZE_DIVISOR: u32 = 20;

/// Everything the host supplies to describe one watermark.
#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkSpec {
    /// Text to render. Must contain at least one non-whitespace character.
    pub text: String,
    /// Fill color.
    pub color: Rgb<u8>,
    /// Opacity as a percentage; values above 100 are treated as 100.
    pub opacity: u8,
    /// Placement.
    pub anchor: Anchor,
}

impl Default for WatermarkSpec {
    fn default() -> Self {
        Self {
            text: String::new(),
            color: Rgb([0, 0, 0]),
            opacity: DEFAULT_OPACITY,
            anchor: Anchor::Center,
        }
    }
}

impl WatermarkSpec {
    /// Spec with the given text and default style.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Set the fill color.
    #[must_use]
    pub fn with_color(mut self, color: Rgb<u8>) -> Self {
        self.color = color;
        self
    }

    /// Set the opacity percentage.
    #[must_use]
    pub fn with_opacity(mut self, opacity: u8) -> Self {
        self.opacity = opacity;
        self
    }

    /// Set the placement.
    #[must_use]
    pub fn with_anchor(mut self, anchor: Anchor) -> Self {
        self.anchor = anchor;
        self
    }

    /// Whether the text has nothing to render.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Fill color with the opacity folded into the alpha channel.
    #[must_use]
    pub fn fill(&self) -> Rgba<u8> {
        let Rgb([r, g, b]) = self.color;
        Rgba([r, g, b, opacity_to_alpha(self.opacity)])
    }
}

/// Map an opacity percentage to an alpha byte: `round(255 * pct / 100)`.
#[must_use]
pub fn opacity_to_alpha(percent: u8) -> u8 {
    let pct = u32::from(percent.min(100));
    // Integer form of round-half-up for 255 * pct / 100.
    u8::try_from((255 * pct + 50) / 100).unwrap_or(u8::MAX)
}

/// Font size in pixels for an image: `min(width, height) / 20`, at least 1.
#[must_use]
pub fn font_size_for(width: u32, height: u32) -> u32 {
    (width.min(height) / FONT_SIZE_DIVISOR).max(1)
}

/// Error returned when a color is not six hex digits.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("color must be 6 hex digits like FF0000, got `{0}`")]
pub struct ParseColorError(String);

/// Parse a `RRGGBB` or `#RRGGBB` hex color.
///
/// # Errors
///
/// Returns [`ParseColorError`] if the input is not six hex digits.
pub fn parse_hex_color(hex: &str) -> std::result::Result<Rgb<u8>, ParseColorError> {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ParseColorError(hex.to_string()));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| ParseColorError(hex.to_string()))
    };
    Ok(Rgb([channel(0)?, channel(2)?, channel(4)?]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opacity_maps_linearly_with_rounding() {
        assert_eq!(opacity_to_alpha(0), 0);
        assert_eq!(opacity_to_alpha(1), 3); // 2.55
        assert_eq!(opacity_to_alpha(50), 128); // 127.5
        assert_eq!(opacity_to_alpha(33), 84); // 84.15
        assert_eq!(opacity_to_alpha(100), 255);
        assert_eq!(opacity_to_alpha(200), 255);
    }

    #[test]
    fn font_size_is_floored_with_minimum_one() {
        assert_eq!(font_size_for(400, 300), 15);
        assert_eq!(font_size_for(1000, 1039), 50);
        assert_eq!(font_size_for(19, 500), 1);
        assert_eq!(font_size_for(1, 1), 1);
    }

    #[test]
    fn blank_text_detection() {
        assert!(WatermarkSpec::new("").is_blank());
        assert!(WatermarkSpec::new(" \t\n").is_blank());
        assert!(!WatermarkSpec::new(" (c) me ").is_blank());
    }

    #[test]
    fn fill_carries_opacity_alpha() {
        let spec = WatermarkSpec::new("x")
            .with_color(Rgb([10, 20, 30]))
            .with_opacity(100);
        assert_eq!(spec.fill(), Rgba([10, 20, 30, 255]));
        assert_eq!(WatermarkSpec::default().fill(), Rgba([0, 0, 0, 128]));
    }

    #[test]
    fn parse_hex_color_accepts_optional_hash() {
        assert_eq!(parse_hex_color("FF8000").unwrap(), Rgb([255, 128, 0]));
        assert_eq!(parse_hex_color("#00ff7f").unwrap(), Rgb([0, 255, 127]));
        assert!(parse_hex_color("FFF").is_err());
        assert!(parse_hex_color("GG0000").is_err());
        assert!(parse_hex_color("ééé").is_err());
    }

    #[test]
    fn parse_hex_color_error_names_the_input() {
        let err = parse_hex_color("#12345").unwrap_err();
        assert_eq!(err, ParseColorError("#12345".to_string()));
        assert_eq!(
            err.to_string(),
            "color must be 6 hex digits like FF0000, got `#12345`"
        );
    }
}
