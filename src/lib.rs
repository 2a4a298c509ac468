//! Overlay a text watermark onto raster images.
//!
//! The watermark is a single line of text rendered with one TrueType font,
//! sized to a twentieth of the image's shorter side, placed at a named
//! anchor or at custom percentages, and alpha-blended onto a copy of the
//! image with the chosen color and opacity.
//!
//! # Quick Start
//!
//! ```no_run
//! use text_watermark::{Anchor, Compositor, CompositorConfig, FontSource, WatermarkSpec};
//! use image::Rgb;
//!
//! let compositor = Compositor::new(CompositorConfig::with_font(FontSource::Named(
//!     "DejaVuSans.ttf".to_string(),
//! )));
//! let img = image::open("photo.jpg").unwrap();
//! let spec = WatermarkSpec::new("(c) 2024 Jane Doe")
//!     .with_color(Rgb([255, 255, 255]))
//!     .with_opacity(40)
//!     .with_anchor(Anchor::BottomRight);
//! let watermarked = compositor.apply(&img, &spec).unwrap();
//! watermarked.save("watermarked_image.png").unwrap();
//! ```
//!
//! # Placement
//!
//! Corner anchors keep the text 20px from the edges. Custom placement takes
//! percentages of the free space; input that does not parse as a number
//! silently centers the text instead.
//!
//! ```
//! use text_watermark::{position, Anchor};
//!
//! assert_eq!(position::resolve(&Anchor::TopRight, 100, 50, 400, 300), (280, 20));
//! assert_eq!(position::resolve(&Anchor::custom("oops", "10"), 100, 50, 400, 300), (150, 125));
//! ```

#![deny(missing_docs)]

pub mod blending;
mod compositor;
pub mod error;
pub mod font;
pub mod position;
mod session;
pub mod style;

pub use compositor::{Compositor, CompositorConfig, Placement, FONT_ENV};
pub use error::{Error, Result};
pub use font::{FontSource, TextMask};
pub use position::{Anchor, CustomPosition};
pub use session::{
    default_output_path, is_supported_image, save_image, Session, DEFAULT_OUTPUT_NAME,
    PREVIEW_SIZE,
};
pub use style::{ParseColorError, WatermarkSpec};
