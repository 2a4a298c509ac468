//! Watermark placement.
//!
//! Maps an [`Anchor`] plus text and image dimensions to the pixel origin of
//! the text's ink box. Results are signed: text larger than the image yields
//! negative coordinates and renders partially off-canvas.

use std::fmt;
use std::str::FromStr;

/// Distance in pixels between the text and the image edge for corner anchors.
pub const PADDING: i64 = 20;

/// Custom placement as percentages of the free space on each axis.
///
/// Components that failed to parse are kept as `None`; [`resolve`] then
/// falls back to [`Anchor::Center`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CustomPosition {
    /// Horizontal percentage, `None` when the input was malformed.
    pub x: Option<f64>,
    /// Vertical percentage, `None` when the input was malformed.
    pub y: Option<f64>,
}

impl CustomPosition {
    /// Custom position from numeric percentages.
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
        }
    }

    /// Custom position from user-entered text.
    ///
    /// Non-numeric input is not an error here; it is remembered as malformed.
    #[must_use]
    pub fn parse(x: &str, y: &str) -> Self {
        Self {
            x: parse_percent(x),
            y: parse_percent(y),
        }
    }

    /// Both percentages, clamped to `[0, 100]`, or `None` if either is malformed.
    #[must_use]
    pub fn clamped(&self) -> Option<(f64, f64)> {
        match (self.x, self.y) {
            (Some(x), Some(y)) => Some((x.clamp(0.0, 100.0), y.clamp(0.0, 100.0))),
            _ => None,
        }
    }
}

fn parse_percent(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Reference point determining where the watermark is placed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Anchor {
    /// Centered on both axes.
    #[default]
    Center,
    /// [`PADDING`] pixels from the top and left edges.
    TopLeft,
    /// [`PADDING`] pixels from the top and right edges.
    TopRight,
    /// [`PADDING`] pixels from the bottom and left edges.
    BottomLeft,
    /// [`PADDING`] pixels from the bottom and right edges.
    BottomRight,
    /// Percentages of the free space on each axis.
    Custom(CustomPosition),
}

impl Anchor {
    /// Custom anchor from user-entered coordinate text.
    #[must_use]
    pub fn custom(x: &str, y: &str) -> Self {
        Self::Custom(CustomPosition::parse(x, y))
    }

    /// Lowercase, dash-separated name of this anchor.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Center => "center",
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomRight => "bottom-right",
            Self::Custom(_) => "custom",
        }
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown anchor name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown anchor `{0}` (expected center, top-left, top-right, bottom-left or bottom-right)")]
pub struct ParseAnchorError(String);

impl FromStr for Anchor {
    type Err = ParseAnchorError;

    /// Parses the named anchors. `custom` is rejected because it needs
    /// coordinates; build it with [`Anchor::custom`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "center" | "centre" => Ok(Self::Center),
            "top-left" => Ok(Self::TopLeft),
            "top-right" => Ok(Self::TopRight),
            "bottom-left" => Ok(Self::BottomLeft),
            "bottom-right" => Ok(Self::BottomRight),
            _ => Err(ParseAnchorError(s.to_string())),
        }
    }
}

/// Compute the top-left origin of the text for the given anchor.
///
/// Malformed custom coordinates fall back silently to the centered origin.
#[must_use]
pub fn resolve(anchor: &Anchor, text_w: u32, text_h: u32, img_w: u32, img_h: u32) -> (i64, i64) {
    let free_w = i64::from(img_w) - i64::from(text_w);
    let free_h = i64::from(img_h) - i64::from(text_h);
    let center = (free_w.div_euclid(2), free_h.div_euclid(2));

    match anchor {
        Anchor::Center => center,
        Anchor::TopLeft => (PADDING, PADDING),
        Anchor::TopRight => (free_w - PADDING, PADDING),
        Anchor::BottomLeft => (PADDING, free_h - PADDING),
        Anchor::BottomRight => (free_w - PADDING, free_h - PADDING),
        Anchor::Custom(custom) => match custom.clamped() {
            #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
            Some((px, py)) => (
                (free_w as f64 * px / 100.0) as i64,
                (free_h as f64 * py / 100.0) as i64,
            ),
            None => {
                tracing::debug!(?custom, "malformed custom position, centering watermark");
                center
            }
        },
    }
}
