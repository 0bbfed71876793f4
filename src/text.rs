//! Bitmap text for the export footer.
//!
//! Glyphs come from the 8x8 `font8x8` tables and are scaled up by an integer
//! cell size. A glyph's bottom row sits on the baseline.

use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

use crate::frame::TextLine;

/// Rows and columns in a source glyph.
const GLYPH_CELLS: u32 = 8;

/// Look up the bitmap for a character.
///
/// The bullet has no glyph in the tables and is drawn as a middle dot.
fn glyph(c: char) -> Option<[u8; 8]> {
    let c = if c == '\u{2022}' { '\u{b7}' } else { c };
    BASIC_FONTS.get(c).or_else(|| LATIN_FONTS.get(c))
}

/// Pixel size of one glyph cell for a nominal text size.
fn cell_size(size: u32) -> u32 {
    (size / GLYPH_CELLS).max(1)
}

/// Extra ink columns added to each cell of a bold glyph.
fn bold_extra(cell: u32, bold: bool) -> u32 {
    if bold {
        (cell / 4).max(1)
    } else {
        0
    }
}

/// Rendered width of `text` in pixels.
#[must_use]
pub fn measure(text: &str, size: u32, bold: bool) -> u32 {
    let cell = cell_size(size);
    let count = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
    if count == 0 {
        return 0;
    }
    count
        .saturating_mul(GLYPH_CELLS * cell)
        .saturating_add(bold_extra(cell, bold))
}

/// Draw `text` with its left edge at `x` and its baseline at `baseline`.
///
/// Cells falling outside the canvas are clipped.
pub fn draw_text(
    canvas: &mut RgbaImage,
    text: &str,
    size: u32,
    bold: bool,
    x: i64,
    baseline: i64,
    color: Rgba<u8>,
) {
    let cell = cell_size(size);
    let extra = bold_extra(cell, bold);
    let advance = i64::from(GLYPH_CELLS * cell);
    let top = baseline - i64::from((GLYPH_CELLS - 1) * cell);
    let (canvas_w, canvas_h) = (i64::from(canvas.width()), i64::from(canvas.height()));

    let mut pen_x = x;
    for c in text.chars() {
        if let Some(rows) = glyph(c) {
            for (row, bits) in (0i64..).zip(rows) {
                for col in 0..GLYPH_CELLS {
                    if bits & (1 << col) == 0 {
                        continue;
                    }
                    let px = pen_x + i64::from(col * cell);
                    let py = top + row * i64::from(cell);
                    let w = cell + extra;
                    if px >= canvas_w
                        || py >= canvas_h
                        || px + i64::from(w) <= 0
                        || py + i64::from(cell) <= 0
                    {
                        continue;
                    }
                    // Clipped above, so the coordinates fit the canvas range.
                    #[allow(clippy::cast_possible_truncation)]
                    let rect = Rect::at(px as i32, py as i32).of_size(w, cell);
                    draw_filled_rect_mut(canvas, rect, color);
                }
            }
        }
        pen_x += advance;
    }
}

/// Draw a configured footer line centered on `center_x`.
pub fn draw_line_centered(
    canvas: &mut RgbaImage,
    line: &TextLine,
    color: Rgba<u8>,
    center_x: i64,
    baseline: i64,
) {
    let text = line.display_text();
    let width = measure(&text, line.size, line.bold);
    let x = center_x - i64::from(width / 2);
    draw_text(canvas, &text, line.size, line.bold, x, baseline, color);
}

#[cfg(test)]
mod tests {
    use super::*;

    const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    fn inked(img: &RgbaImage) -> Vec<(u32, u32)> {
        img.enumerate_pixels()
            .filter(|(_, _, p)| p[3] != 0)
            .map(|(x, y, _)| (x, y))
            .collect()
    }

    #[test]
    fn measure_scales_with_size_and_length() {
        assert_eq!(measure("", 40, true), 0);
        assert_eq!(measure("AB", 8, false), 16);
        assert_eq!(measure("AB", 20, false), 32);
        assert_eq!(measure("AB", 40, false), 80);
        assert_eq!(measure("AB", 40, true), 81);
    }

    #[test]
    fn bullet_falls_back_to_middle_dot() {
        assert!(glyph('\u{2022}').is_some());
        assert_eq!(glyph('\u{2022}'), glyph('\u{b7}'));
    }

    #[test]
    fn text_stays_above_baseline_band() {
        let mut img = RgbaImage::new(200, 100);
        draw_text(&mut img, "EH", 16, false, 10, 60, INK);
        let pixels = inked(&img);
        assert!(!pixels.is_empty());
        for (x, y) in pixels {
            assert!((10..42).contains(&x), "x={x}");
            // cell 2: rows from 60 - 14 up to the baseline cell
            assert!((46..62).contains(&y), "y={y}");
        }
    }

    #[test]
    fn bold_adds_ink() {
        let mut regular = RgbaImage::new(120, 40);
        let mut bold = RgbaImage::new(120, 40);
        draw_text(&mut regular, "Ink", 16, false, 4, 30, INK);
        draw_text(&mut bold, "Ink", 16, true, 4, 30, INK);
        assert!(inked(&bold).len() > inked(&regular).len());
    }

    #[test]
    fn drawing_off_canvas_is_clipped() {
        let mut img = RgbaImage::new(20, 20);
        draw_text(&mut img, "WWWW", 40, true, -50, 10, INK);
        draw_text(&mut img, "WWWW", 40, true, 15, 200, INK);
        // no panic; only the visible part is painted
        assert!(inked(&img).iter().all(|&(x, y)| x < 20 && y < 20));
    }

    #[test]
    fn centered_line_straddles_center() {
        let mut img = RgbaImage::new(101, 30);
        let line = TextLine {
            text: "H".to_string(),
            size: 8,
            ..TextLine::default()
        };
        draw_line_centered(&mut img, &line, INK, 50, 20);
        let xs: Vec<u32> = inked(&img).iter().map(|&(x, _)| x).collect();
        let (min, max) = (xs.iter().min().unwrap(), xs.iter().max().unwrap());
        assert!(*min >= 46 && *max <= 53, "H spans {min}..={max}");
    }
}
