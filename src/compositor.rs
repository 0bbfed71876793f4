//! Branded export compositing.
//!
//! The stencil is scaled to fit a padded region of a new canvas, optionally
//! over a filled background inside a stroked border, and the brand lines are
//! written into the footer band.

use image::imageops::{self, FilterType};
use image::{Rgba, Rgba32FImage, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::frame::{ExportFrameSpec, FrameLayout};
use crate::text;

/// Largest canvas, in pixels, a drawing surface can be acquired for.
pub const MAX_CANVAS_PIXELS: u64 = 16_384 * 16_384;

/// Render `source` into a branded export canvas.
///
/// With `transparent_background` the canvas is left clear and no border is
/// stroked; the footer text is drawn either way.
///
/// # Errors
///
/// Returns [`Error::EmptyImage`] for a zero-sized source and [`Error::Canvas`]
/// if the canvas is too large to allocate.
#[instrument(
    skip_all,
    fields(width = source.width(), height = source.height(), transparent = transparent_background)
)]
pub fn composite(
    source: &RgbaImage,
    transparent_background: bool,
    spec: &ExportFrameSpec,
) -> Result<RgbaImage> {
    let layout = spec.layout(source.width(), source.height())?;

    let fill = if transparent_background {
        Rgba([0, 0, 0, 0])
    } else {
        spec.background.to_rgba()
    };
    let mut canvas = acquire_canvas(&layout, fill)?;

    if !transparent_background {
        stroke_frame(&mut canvas, spec);
    }

    draw_source(&mut canvas, source, &layout);
    draw_footer(&mut canvas, spec);

    debug!(
        canvas_width = layout.canvas_width,
        canvas_height = layout.canvas_height,
        scale = layout.scale,
        "composited export frame"
    );

    Ok(canvas)
}

/// Allocate the canvas filled with `fill`, refusing sizes beyond the surface limit.
fn acquire_canvas(layout: &FrameLayout, fill: Rgba<u8>) -> Result<RgbaImage> {
    let (width, height) = (layout.canvas_width, layout.canvas_height);
    if u64::from(width) * u64::from(height) > MAX_CANVAS_PIXELS {
        return Err(Error::Canvas {
            width: u64::from(width),
            height: u64::from(height),
        });
    }
    Ok(RgbaImage::from_pixel(width, height, fill))
}

/// Stroke the border rectangle, centered on a path `frame_inset` in from each edge.
fn stroke_frame(canvas: &mut RgbaImage, spec: &ExportFrameSpec) {
    let stroke = spec.frame_width;
    let outer = spec.frame_inset.saturating_sub(stroke / 2);
    let (width, height) = canvas.dimensions();
    if stroke == 0 || 2 * u64::from(outer) + u64::from(stroke) > u64::from(width.min(height)) {
        return;
    }

    let span_w = width - 2 * outer;
    let span_h = height - 2 * outer;
    let color = spec.frame_color.to_rgba();

    // The canvas is bounded by MAX_CANVAS_PIXELS, so edges fit in i32.
    #[allow(clippy::cast_possible_wrap)]
    let (near, far_x, far_y) = (
        outer as i32,
        (width - outer - stroke) as i32,
        (height - outer - stroke) as i32,
    );

    for rect in [
        Rect::at(near, near).of_size(span_w, stroke),
        Rect::at(near, far_y).of_size(span_w, stroke),
        Rect::at(near, near).of_size(stroke, span_h),
        Rect::at(far_x, near).of_size(stroke, span_h),
    ] {
        draw_filled_rect_mut(canvas, rect, color);
    }
}

/// Scale the source to the layout's drawn size and blend it onto the canvas.
fn draw_source(canvas: &mut RgbaImage, source: &RgbaImage, layout: &FrameLayout) {
    let (draw_w, draw_h) = layout.pixel_size();
    let (x, y) = layout.pixel_origin();

    if source.dimensions() == (draw_w, draw_h) {
        imageops::overlay(canvas, source, x, y);
    } else {
        let scaled = resize_premultiplied(source, draw_w, draw_h);
        imageops::overlay(canvas, &scaled, x, y);
    }
}

/// Resample with color weighted by alpha.
///
/// Hidden pixels of a keyed stencil keep their white color, so filtering
/// straight RGBA would bleed it into the partially covered edge pixels.
fn resize_premultiplied(source: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let premultiplied = Rgba32FImage::from_fn(source.width(), source.height(), |x, y| {
        let px = source.get_pixel(x, y);
        let a = f32::from(px[3]) / 255.0;
        Rgba([
            f32::from(px[0]) / 255.0 * a,
            f32::from(px[1]) / 255.0 * a,
            f32::from(px[2]) / 255.0 * a,
            a,
        ])
    });
    let scaled = imageops::resize(&premultiplied, width, height, FilterType::CatmullRom);

    RgbaImage::from_fn(width, height, |x, y| {
        let px = scaled.get_pixel(x, y);
        // Catmull-Rom overshoots near hard edges
        let a = px[3].clamp(0.0, 1.0);
        let channel = |c: f32| {
            if a <= 0.0 {
                0
            } else {
                to_u8(c.clamp(0.0, a) / a)
            }
        };
        Rgba([channel(px[0]), channel(px[1]), channel(px[2]), to_u8(a)])
    })
}

/// Map a unit value onto 0-255.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_u8(v: f32) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Write the brand and tagline lines into the footer band.
fn draw_footer(canvas: &mut RgbaImage, spec: &ExportFrameSpec) {
    let center_x = i64::from(canvas.width() / 2);
    let bottom = i64::from(canvas.height());
    let color = spec.text_color.to_rgba();

    for line in [&spec.brand, &spec.tagline] {
        text::draw_line_centered(
            canvas,
            line,
            color,
            center_x,
            bottom - i64::from(line.baseline_offset),
        );
    }
}
