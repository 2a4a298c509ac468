//! Font resource handling and text rasterization.
//!
//! The font is acquired per render: bytes are read, parsed into an
//! [`ab_glyph::FontVec`] and dropped when the caller is done with it.

use std::env;
use std::path::{Path, PathBuf};

use ab_glyph::{point, Font, FontVec, GlyphId, OutlinedGlyph, PxScale, ScaleFont};
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Font file used when nothing else is configured.
pub const DEFAULT_FONT_NAME: &str = "arial.ttf";

/// Environment variable holding extra font directories (OS path-list syntax).
pub const FONT_DIRS_ENV: &str = "TEXT_WATERMARK_FONT_DIRS";

/// How deep to descend into each font directory when resolving by name.
const SEARCH_DEPTH: usize = 4;

/// Where the watermark font comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    /// A font file on disk.
    Path(PathBuf),
    /// Font file contents already in memory.
    Bytes(Vec<u8>),
    /// A font file name looked up in the font search directories.
    Named(String),
}

impl Default for FontSource {
    fn default() -> Self {
        Self::Named(DEFAULT_FONT_NAME.to_string())
    }
}

impl FontSource {
    /// Interpret user input: an existing file is a path, anything else a name.
    #[must_use]
    pub fn from_arg(arg: &str) -> Self {
        let path = Path::new(arg);
        if path.is_file() {
            Self::Path(path.to_path_buf())
        } else {
            Self::Named(arg.to_string())
        }
    }

    /// Read and parse the font.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RenderFailure`] if the font cannot be located, read or parsed.
    pub fn load(&self) -> Result<FontVec> {
        let bytes = match self {
            Self::Bytes(bytes) => bytes.clone(),
            Self::Path(path) => read_font_file(path)?,
            Self::Named(name) => {
                let path = find_font(name).ok_or_else(|| {
                    Error::render(format!("font `{name}` not found in any font directory"))
                })?;
                read_font_file(&path)?
            }
        };
        Ok(FontVec::try_from_vec(bytes)?)
    }
}

fn read_font_file(path: &Path) -> Result<Vec<u8>> {
    tracing::debug!(path = %path.display(), "reading font");
    std::fs::read(path).map_err(|e| {
        Error::render_with(format!("cannot read font {}: {e}", path.display()), e)
    })
}

/// Directories searched for [`FontSource::Named`], in priority order.
#[must_use]
pub fn font_search_dirs() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = env::var_os(FONT_DIRS_ENV)
        .map(|raw| env::split_paths(&raw).collect())
        .unwrap_or_default();

    if let Ok(cwd) = env::current_dir() {
        dirs.push(cwd);
    }

    let home = env::var_os("HOME").map(PathBuf::from);
    if cfg!(target_os = "windows") {
        let windir = env::var_os("WINDIR").map_or_else(|| PathBuf::from(r"C:\Windows"), PathBuf::from);
        dirs.push(windir.join("Fonts"));
        if let Some(local) = env::var_os("LOCALAPPDATA") {
            dirs.push(PathBuf::from(local).join(r"Microsoft\Windows\Fonts"));
        }
    } else if cfg!(target_os = "macos") {
        dirs.push(PathBuf::from("/Library/Fonts"));
        dirs.push(PathBuf::from("/System/Library/Fonts"));
        if let Some(home) = &home {
            dirs.push(home.join("Library/Fonts"));
        }
    } else {
        if let Some(home) = &home {
            dirs.push(home.join(".local/share/fonts"));
            dirs.push(home.join(".fonts"));
        }
        dirs.push(PathBuf::from("/usr/local/share/fonts"));
        dirs.push(PathBuf::from("/usr/share/fonts"));
    }
    dirs
}

/// Find a font file by name (case-insensitive) in [`font_search_dirs`].
#[must_use]
pub fn find_font(name: &str) -> Option<PathBuf> {
    font_search_dirs()
        .iter()
        .filter(|dir| dir.is_dir())
        .find_map(|dir| find_in_dir(dir, name))
}

fn find_in_dir(dir: &Path, name: &str) -> Option<PathBuf> {
    WalkDir::new(dir)
        .max_depth(SEARCH_DEPTH)
        .follow_links(true)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .find(|entry| entry.file_name().to_string_lossy().eq_ignore_ascii_case(name))
        .map(walkdir::DirEntry::into_path)
}

/// Pixel scale that makes one em `size` pixels tall.
fn em_scale(font: &impl Font, size: f32) -> PxScale {
    let units_per_em = font.units_per_em().unwrap_or(1000.0);
    PxScale::from(size * font.height_unscaled() / units_per_em)
}

/// Single-channel coverage of a rendered line of text, cropped to its ink.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextMask {
    /// Ink width in pixels.
    pub width: u32,
    /// Ink height in pixels.
    pub height: u32,
    /// Horizontal distance from the layout origin to the ink box.
    pub offset_x: i32,
    /// Vertical distance from the layout origin (top of the line) to the ink box.
    pub offset_y: i32,
    /// Row-major coverage in `[0, 1]`, `width * height` entries.
    pub coverage: Vec<f32>,
}

impl TextMask {
    /// Coverage at `(x, y)` inside the ink box.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> f32 {
        self.coverage[(y * self.width + x) as usize]
    }

    /// Whether the text produced no ink at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Lay out `text` on one line and rasterize its glyph coverage.
///
/// Glyphs are placed left to right with kerning, baseline at the ascent, so
/// the layout origin is the top-left of the line box.
#[must_use]
pub fn render_text(font: &impl Font, text: &str, size: f32) -> TextMask {
    let scale = em_scale(font, size);
    let scaled = font.as_scaled(scale);
    let ascent = scaled.ascent();

    let mut outlined: Vec<OutlinedGlyph> = Vec::new();
    let mut cursor_x = 0.0f32;
    let mut last_glyph: Option<GlyphId> = None;

    for ch in text.chars() {
        if ch.is_control() {
            continue;
        }
        let glyph_id = font.glyph_id(ch);
        if let Some(prev) = last_glyph {
            cursor_x += scaled.kern(prev, glyph_id);
        }
        let glyph = glyph_id.with_scale_and_position(scale, point(cursor_x, ascent));
        cursor_x += scaled.h_advance(glyph_id);
        last_glyph = Some(glyph_id);

        if let Some(og) = font.outline_glyph(glyph) {
            outlined.push(og);
        }
    }

    let Some(bounds) = outlined.iter().map(OutlinedGlyph::px_bounds).reduce(|a, b| {
        ab_glyph::Rect {
            min: point(a.min.x.min(b.min.x), a.min.y.min(b.min.y)),
            max: point(a.max.x.max(b.max.x), a.max.y.max(b.max.y)),
        }
    }) else {
        return TextMask::default();
    };

    // px_bounds are already whole pixels.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let (min_x, min_y, width, height) = (
        bounds.min.x as i32,
        bounds.min.y as i32,
        bounds.width().max(0.0) as u32,
        bounds.height().max(0.0) as u32,
    );
    let mut coverage = vec![0.0f32; width as usize * height as usize];

    for og in &outlined {
        let gb = og.px_bounds();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (gx, gy) = ((gb.min.x as i32 - min_x) as u32, (gb.min.y as i32 - min_y) as u32);
        og.draw(|x, y, c| {
            let (px, py) = (gx + x, gy + y);
            if px < width && py < height {
                let idx = (py * width + px) as usize;
                coverage[idx] = coverage[idx].max(c.clamp(0.0, 1.0));
            }
        });
    }

    tracing::debug!(width, height, size, "rasterized watermark text");
    TextMask {
        width,
        height,
        offset_x: min_x,
        offset_y: min_y,
        coverage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_named_font_is_render_failure() {
        let source = FontSource::Named("no-such-font-7f3a9.ttf".to_string());
        let err = source.load().unwrap_err();
        assert!(matches!(err, Error::RenderFailure { .. }));
        assert!(err.to_string().contains("no-such-font-7f3a9.ttf"));
    }

    #[test]
    fn missing_font_path_is_render_failure() {
        let source = FontSource::Path(PathBuf::from("/definitely/not/here.ttf"));
        assert!(matches!(source.load(), Err(Error::RenderFailure { source: Some(_), .. })));
    }

    #[test]
    fn garbage_bytes_are_render_failure() {
        let source = FontSource::Bytes(b"not a font".to_vec());
        assert!(matches!(source.load(), Err(Error::RenderFailure { .. })));
    }

    #[test]
    fn from_arg_treats_unknown_files_as_names() {
        assert_eq!(
            FontSource::from_arg("DejaVuSans.ttf-missing"),
            FontSource::Named("DejaVuSans.ttf-missing".to_string())
        );
        assert_eq!(FontSource::default(), FontSource::Named(DEFAULT_FONT_NAME.to_string()));
    }

    #[test]
    fn mask_lookup_is_row_major() {
        let mask = TextMask {
            width: 2,
            height: 2,
            offset_x: 0,
            offset_y: 0,
            coverage: vec![0.0, 0.25, 0.5, 1.0],
        };
        assert!((mask.get(1, 0) - 0.25).abs() < f32::EPSILON);
        assert!((mask.get(0, 1) - 0.5).abs() < f32::EPSILON);
        assert!(!mask.is_empty());
        assert!(TextMask::default().is_empty());
    }
}
