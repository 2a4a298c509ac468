//! Alpha blending math for applying a text watermark.
//!
//! Each covered pixel is blended with the standard forward equation:
//! `result = fill * alpha + dst * (1 - alpha)`
//! where `alpha = coverage * fill_alpha / 255`.

use image::{Rgba, RgbaImage};

use crate::font::TextMask;

/// Blend a single destination pixel toward `fill` by `alpha` in `[0, 1]`.
///
/// Color channels use the forward blend; the alpha channel composites
/// "over" so opaque destinations stay opaque.
pub fn blend_pixel(dst: &mut Rgba<u8>, fill: Rgba<u8>, alpha: f32) {
    if alpha <= 0.0 {
        return;
    }
    let alpha = alpha.min(1.0);
    let inv_alpha = 1.0 - alpha;

    for ch in 0..3 {
        let out = f32::from(fill[ch]) * alpha + f32::from(dst[ch]) * inv_alpha;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            dst[ch] = out.round().clamp(0.0, 255.0) as u8;
        }
    }

    let out_alpha = 255.0 * alpha + f32::from(dst[3]) * inv_alpha;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        dst[3] = out_alpha.round().clamp(0.0, 255.0) as u8;
    }
}

/// Blend `mask` onto `image` with its layout origin at `(origin_x, origin_y)`.
///
/// Pixels outside the image are skipped, as are pixels with zero coverage.
/// A fill alpha of zero leaves the image untouched.
pub fn blend_text_mask(
    image: &mut RgbaImage,
    mask: &TextMask,
    origin_x: i64,
    origin_y: i64,
    fill: Rgba<u8>,
) {
    if fill[3] == 0 || mask.is_empty() {
        return;
    }
    let fill_alpha = f32::from(fill[3]) / 255.0;
    let img_w = i64::from(image.width());
    let img_h = i64::from(image.height());
    let left = origin_x + i64::from(mask.offset_x);
    let top = origin_y + i64::from(mask.offset_y);

    for my in 0..mask.height {
        let y = top + i64::from(my);
        if y < 0 || y >= img_h {
            continue;
        }
        for mx in 0..mask.width {
            let x = left + i64::from(mx);
            if x < 0 || x >= img_w {
                continue;
            }
            let coverage = mask.get(mx, my);
            if coverage <= 0.0 {
                continue;
            }
            // Bounds checked above.
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let px = image.get_pixel_mut(x as u32, y as u32);
            blend_pixel(px, fill, coverage * fill_alpha);
        }
    }
}
