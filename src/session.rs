//! Host-side session state: the current image, the current spec, and export.
//!
//! A GUI or CLI owns one [`Session`] and drives it in the order
//! load → configure → apply → (apply again, or export).

use std::path::{Path, PathBuf};

use image::{imageops, DynamicImage, ImageFormat, RgbaImage};

use crate::compositor::Compositor;
use crate::error::{Error, Result};
use crate::style::WatermarkSpec;

/// File name suggested for exported images.
pub const DEFAULT_OUTPUT_NAME: &str = "watermarked_image.png";

/// Longest edge of preview thumbnails.
pub const PREVIEW_SIZE: u32 = 400;

/// JPEG quality used on export.
const JPEG_QUALITY: u8 = 95;

/// The state a host keeps between user actions.
#[derive(Debug, Default)]
pub struct Session {
    compositor: Compositor,
    source: Option<DynamicImage>,
    source_path: Option<PathBuf>,
    spec: WatermarkSpec,
    result: Option<RgbaImage>,
}

impl Session {
    /// Start an empty session.
    #[must_use]
    pub fn new(compositor: Compositor) -> Self {
        Self {
            compositor,
            ..Self::default()
        }
    }

    /// Decode an image file and make it the current source.
    ///
    /// Any previous result is discarded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RenderFailure`] if the file cannot be read or decoded.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let img = image::open(path).map_err(|e| {
            Error::render_with(format!("failed to load {}: {e}", path.display()), e)
        })?;
        tracing::info!(path = %path.display(), width = img.width(), height = img.height(), "loaded image");
        self.load_image(img);
        self.source_path = Some(path.to_path_buf());
        Ok(())
    }

    /// Make an already-decoded image the current source.
    pub fn load_image(&mut self, image: DynamicImage) {
        self.source = Some(image);
        self.source_path = None;
        self.result = None;
    }

    /// The current source image, if one is loaded.
    #[must_use]
    pub fn source(&self) -> Option<&DynamicImage> {
        self.source.as_ref()
    }

    /// Path the current source was loaded from.
    #[must_use]
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// The current watermark spec.
    #[must_use]
    pub fn spec(&self) -> &WatermarkSpec {
        &self.spec
    }

    /// Mutable access to the current watermark spec.
    pub fn spec_mut(&mut self) -> &mut WatermarkSpec {
        &mut self.spec
    }

    /// Replace the current watermark spec.
    pub fn set_spec(&mut self, spec: WatermarkSpec) {
        self.spec = spec;
    }

    /// The last applied result, if any.
    #[must_use]
    pub fn result(&self) -> Option<&RgbaImage> {
        self.result.as_ref()
    }

    /// Watermark the current source with the current spec.
    ///
    /// The source itself is not modified; the result is kept for export.
    /// Any earlier result is dropped first, so a failed apply leaves nothing
    /// to export.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyImage`] when nothing is loaded, otherwise whatever
    /// [`Compositor::apply`] returns.
    pub fn apply(&mut self) -> Result<&RgbaImage> {
        self.result = None;
        let source = self.source.as_ref().ok_or(Error::EmptyImage)?;
        let watermarked = self.compositor.apply(source, &self.spec)?;
        Ok(&*self.result.insert(watermarked))
    }

    /// Save the last result to `path` and make it the new source.
    ///
    /// Returns the path actually written (`.png` is appended when `path` has
    /// no extension).
    ///
    /// # Errors
    ///
    /// [`Error::EmptyImage`] when nothing has been applied yet, or
    /// [`Error::RenderFailure`] if encoding or writing fails.
    pub fn export(&mut self, path: &Path) -> Result<PathBuf> {
        let result = self.result.take().ok_or(Error::EmptyImage)?;
        let written = match save_image(&result, path) {
            Ok(written) => written,
            Err(e) => {
                self.result = Some(result);
                return Err(e);
            }
        };
        tracing::info!(path = %written.display(), "exported watermarked image");
        self.source = Some(DynamicImage::ImageRgba8(result));
        Ok(written)
    }

    /// Thumbnail of the latest image (result if present, else source).
    #[must_use]
    pub fn preview(&self, max: u32) -> Option<DynamicImage> {
        match (&self.result, &self.source) {
            (Some(result), _) => {
                let (w, h) = fit_within(result.width(), result.height(), max);
                Some(DynamicImage::ImageRgba8(imageops::thumbnail(result, w, h)))
            }
            (None, Some(source)) => Some(source.thumbnail(max, max)),
            (None, None) => None,
        }
    }
}

/// Dimensions of a `width`x`height` image scaled to fit a `max`x`max` box.
fn fit_within(width: u32, height: u32, max: u32) -> (u32, u32) {
    let ratio = f64::from(max) / f64::from(width.max(height).max(1));
    let scale = |v: u32| {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let scaled = (f64::from(v) * ratio).round() as u32;
        scaled.max(1)
    };
    (scale(width), scale(height))
}

/// Check if a file has an extension the loader accepts.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => matches!(
            ext.to_lowercase().as_str(),
            "png" | "jpg" | "jpeg" | "gif" | "bmp"
        ),
        None => false,
    }
}

/// Save an RGBA image, picking the encoder from the file extension.
///
/// A path without an extension is saved as PNG with `.png` appended.
/// Formats without an alpha channel get the image flattened to RGB.
///
/// # Errors
///
/// Returns [`Error::RenderFailure`] if the format is unsupported or writing fails.
pub fn save_image(img: &RgbaImage, path: &Path) -> Result<PathBuf> {
    let path = if path.extension().is_none() {
        path.with_extension("png")
    } else {
        path.to_path_buf()
    };
    let format = ImageFormat::from_path(&path)
        .map_err(|e| Error::render_with(format!("unsupported output format: {e}"), e))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    match format {
        ImageFormat::Jpeg => {
            let file = std::fs::File::create(&path)?;
            let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(file, JPEG_QUALITY);
            encoder.encode_image(&DynamicImage::ImageRgba8(img.clone()).to_rgb8())?;
        }
        ImageFormat::Bmp => {
            DynamicImage::ImageRgba8(img.clone()).to_rgb8().save(&path)?;
        }
        ImageFormat::Png | ImageFormat::Gif => {
            img.save(&path)?;
        }
        _ => {
            return Err(Error::render(format!("unsupported output format: {format:?}")));
        }
    }

    Ok(path)
}

/// Default export path: [`DEFAULT_OUTPUT_NAME`] next to the input file.
#[must_use]
pub fn default_output_path(input: &Path) -> PathBuf {
    let parent = input.parent().unwrap_or(Path::new("."));
    parent.join(DEFAULT_OUTPUT_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn default_output_path_sits_next_to_input() {
        let p = default_output_path(Path::new("/tmp/photos/cat.jpg"));
        assert_eq!(p, PathBuf::from("/tmp/photos/watermarked_image.png"));

        let p = default_output_path(Path::new("cat.jpg"));
        assert_eq!(p.file_name().unwrap().to_str().unwrap(), DEFAULT_OUTPUT_NAME);
    }

    #[test]
    fn is_supported_image_accepts_loader_formats() {
        assert!(is_supported_image(Path::new("photo.png")));
        assert!(is_supported_image(Path::new("photo.JPG")));
        assert!(is_supported_image(Path::new("photo.jpeg")));
        assert!(is_supported_image(Path::new("photo.gif")));
        assert!(is_supported_image(Path::new("photo.bmp")));
    }

    #[test]
    fn is_supported_image_rejects_other_formats() {
        assert!(!is_supported_image(Path::new("photo.webp")));
        assert!(!is_supported_image(Path::new("notes.txt")));
        assert!(!is_supported_image(Path::new("photo")));
    }

    #[test]
    fn apply_without_source_is_empty_image() {
        let mut session = Session::default();
        session.set_spec(WatermarkSpec::new("hello"));
        assert!(matches!(session.apply(), Err(Error::EmptyImage)));
        assert!(session.result().is_none());
    }

    #[test]
    fn export_without_result_is_empty_image() {
        let mut session = Session::default();
        session.load_image(DynamicImage::ImageRgb8(RgbImage::new(10, 10)));
        let err = session.export(Path::new("never-written.png")).unwrap_err();
        assert!(matches!(err, Error::EmptyImage));
    }

    #[test]
    fn preview_fits_inside_bounds() {
        let mut session = Session::default();
        assert!(session.preview(PREVIEW_SIZE).is_none());

        session.load_image(DynamicImage::ImageRgb8(RgbImage::from_pixel(1000, 500, Rgb([1, 2, 3]))));
        let preview = session.preview(PREVIEW_SIZE).unwrap();
        assert_eq!((preview.width(), preview.height()), (400, 200));
    }

    #[test]
    fn preview_prefers_result_and_keeps_aspect() {
        let mut session = Session::default();
        session.load_image(DynamicImage::ImageRgb8(RgbImage::new(50, 50)));
        session.result = Some(RgbaImage::from_pixel(300, 900, image::Rgba([5, 6, 7, 255])));

        let preview = session.preview(PREVIEW_SIZE).unwrap();
        assert_eq!((preview.width(), preview.height()), (133, 400));
        assert_eq!(preview.to_rgba8().get_pixel(10, 10), &image::Rgba([5, 6, 7, 255]));
        assert_eq!(fit_within(1000, 500, 400), (400, 200));
        assert_eq!(fit_within(1, 5000, 400), (1, 400));
    }

    #[test]
    fn failed_apply_discards_earlier_result() {
        let mut session = Session::default();
        session.load_image(DynamicImage::ImageRgb8(RgbImage::new(40, 40)));
        session.result = Some(RgbaImage::new(40, 40));
        session.set_spec(WatermarkSpec::new("   "));

        assert!(matches!(session.apply(), Err(Error::EmptyText)));
        assert!(session.result().is_none());
        let err = session.export(Path::new("never-written.png")).unwrap_err();
        assert!(matches!(err, Error::EmptyImage));
    }

    #[test]
    fn save_image_appends_png_extension() {
        let dir = tempfile::tempdir().unwrap();
        let img = RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 40]));
        let written = save_image(&img, &dir.path().join("out")).unwrap();
        assert_eq!(written, dir.path().join("out.png"));
        let decoded = image::open(&written).unwrap().to_rgba8();
        assert_eq!(decoded, img);
    }

    #[test]
    fn save_image_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let img = RgbaImage::new(2, 2);
        let err = save_image(&img, &dir.path().join("out.xyz")).unwrap_err();
        assert!(matches!(err, Error::RenderFailure { .. }));
    }
}
