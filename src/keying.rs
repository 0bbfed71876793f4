//! Luma keying of white-background stencils.
//!
//! A stencil is black ink on white paper. Keying drops the paper by zeroing the
//! alpha of every pixel whose brightness, `(R + G + B) / 3`, exceeds
//! [`LUMA_THRESHOLD`]. The cut is a hard threshold: faint gray anti-aliasing
//! around the lines stays opaque.

use image::{Rgba, RgbaImage};
use tracing::debug;

/// Brightness above which a pixel is treated as background (0-255 scale).
///
/// The comparison is strict, so a brightness of exactly 200 is kept.
pub const LUMA_THRESHOLD: u8 = 200;

/// Whether a pixel lies above the keying threshold.
#[must_use]
pub fn is_background(px: Rgba<u8>) -> bool {
    // sum / 3 > t  <=>  sum > 3t, kept in integers to avoid rounding at the boundary
    let sum = u16::from(px[0]) + u16::from(px[1]) + u16::from(px[2]);
    sum > 3 * u16::from(LUMA_THRESHOLD)
}

/// Produce a transparent-background copy of a white-background stencil.
///
/// Background pixels get alpha 0 with their color channels untouched; every
/// other pixel is copied as is, including its alpha. The source is not modified
/// and the result has the same dimensions.
#[must_use]
pub fn key_transparent(source: &RgbaImage) -> RgbaImage {
    let keyed = RgbaImage::from_fn(source.width(), source.height(), |x, y| {
        let px = *source.get_pixel(x, y);
        if is_background(px) {
            Rgba([px[0], px[1], px[2], 0])
        } else {
            px
        }
    });

    debug!(
        width = source.width(),
        height = source.height(),
        "keyed stencil background to transparency"
    );

    keyed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_brightness_is_not_keyed() {
        assert!(!is_background(Rgba([200, 200, 200, 255])));
        assert!(is_background(Rgba([201, 200, 200, 255])));
        // 255 + 255 + 90 = 600 -> mean exactly 200
        assert!(!is_background(Rgba([255, 255, 90, 255])));
    }

    #[test]
    fn threshold_uses_channel_mean() {
        // mean 200.33 from uneven channels
        assert!(is_background(Rgba([255, 250, 96, 255])));
        // mean 60
        assert!(!is_background(Rgba([30, 60, 90, 0])));
    }

    #[test]
    fn keyed_pixels_keep_their_color() {
        let src = RgbaImage::from_pixel(3, 2, Rgba([250, 240, 230, 255]));
        let keyed = key_transparent(&src);
        for px in keyed.pixels() {
            assert_eq!(*px, Rgba([250, 240, 230, 0]));
        }
    }

    #[test]
    fn dark_pixels_are_copied_byte_identical() {
        let src = RgbaImage::from_pixel(4, 4, Rgba([12, 80, 150, 77]));
        let keyed = key_transparent(&src);
        assert_eq!(keyed, src);
    }

    #[test]
    fn transparent_input_stays_transparent() {
        let src = RgbaImage::from_pixel(2, 2, Rgba([255, 255, 255, 0]));
        let keyed = key_transparent(&src);
        assert!(keyed.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn source_is_left_untouched() {
        let src = RgbaImage::from_pixel(5, 5, Rgba([255, 255, 255, 255]));
        let before = src.clone();
        let _ = key_transparent(&src);
        assert_eq!(src, before);
    }

    #[test]
    fn empty_image_keys_to_empty_image() {
        let keyed = key_transparent(&RgbaImage::new(0, 0));
        assert_eq!(keyed.dimensions(), (0, 0));
    }
}
