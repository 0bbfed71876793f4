//! Export frame configuration and geometry.
//!
//! [`ExportFrameSpec`] gathers every constant of the branded export frame:
//! padding, footer band, minimum canvas size, border, colors and the two
//! footer text lines. [`FrameLayout`] is the pure geometry derived from a spec
//! and a source size, so placement can be checked without rendering anything.

use std::fmt;
use std::path::Path;

use image::Rgba;
use serde::Deserialize;

use crate::error::{Error, Result};

/// An RGBA color, written in configuration files as `#rrggbb` or `#rrggbbaa`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Color(pub [u8; 4]);

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self([0, 0, 0, 255]);
    /// Opaque white.
    pub const WHITE: Self = Self([255, 255, 255, 255]);

    /// Parse a `#rrggbb` or `#rrggbbaa` hex string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the string is not a valid hex color.
    pub fn parse_hex(s: &str) -> Result<Self> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| Error::Config(format!("color must start with '#': {s}")))?;
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return Err(Error::Config(format!("color must be #rrggbb or #rrggbbaa: {s}")));
        }

        let mut rgba = [0, 0, 0, 255];
        for (i, slot) in rgba.iter_mut().enumerate().take(hex.len() / 2) {
            *slot = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
                .map_err(|_| Error::Config(format!("invalid hex digits in color: {s}")))?;
        }
        Ok(Self(rgba))
    }

    /// The color as an `image` pixel.
    #[must_use]
    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba(self.0)
    }
}

impl TryFrom<String> for Color {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse_hex(&value)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.0;
        if a == 255 {
            write!(f, "#{r:02x}{g:02x}{b:02x}")
        } else {
            write!(f, "#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }
}

/// One line of footer text.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TextLine {
    /// The text as configured.
    pub text: String,
    /// Nominal glyph height in pixels.
    pub size: u32,
    /// Render with a heavier stroke.
    pub bold: bool,
    /// Render the text in upper case.
    pub uppercase: bool,
    /// Distance of the baseline above the bottom edge of the canvas.
    pub baseline_offset: u32,
}

impl TextLine {
    /// The text as it will be drawn, with the case transform applied.
    #[must_use]
    pub fn display_text(&self) -> String {
        if self.uppercase {
            self.text.to_uppercase()
        } else {
            self.text.clone()
        }
    }
}

impl Default for TextLine {
    fn default() -> Self {
        Self {
            text: String::new(),
            size: 20,
            bold: false,
            uppercase: false,
            baseline_offset: 50,
        }
    }
}

/// Geometry and branding of the export frame.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExportFrameSpec {
    /// Space kept around the image on every side.
    pub padding: u32,
    /// Height of the footer band reserved below the padded image area.
    pub footer: u32,
    /// Minimum canvas width.
    pub min_width: u32,
    /// Minimum canvas height.
    pub min_height: u32,
    /// Distance of the border stroke's center line from the canvas edges.
    pub frame_inset: u32,
    /// Width of the border stroke.
    pub frame_width: u32,
    /// Border stroke color.
    pub frame_color: Color,
    /// Canvas fill for opaque exports.
    pub background: Color,
    /// Color of both footer text lines.
    pub text_color: Color,
    /// Bold brand name line.
    pub brand: TextLine,
    /// Smaller attribution line below the brand.
    pub tagline: TextLine,
}

impl Default for ExportFrameSpec {
    fn default() -> Self {
        Self {
            padding: 100,
            footer: 150,
            min_width: 1200,
            min_height: 1600,
            frame_inset: 40,
            frame_width: 4,
            frame_color: Color::BLACK,
            background: Color::WHITE,
            text_color: Color::BLACK,
            brand: TextLine {
                text: "EasyInkLab".to_string(),
                size: 40,
                bold: true,
                uppercase: false,
                baseline_offset: 90,
            },
            tagline: TextLine {
                text: "Generated Stencil \u{2022} sonerkaya.art".to_string(),
                size: 20,
                bold: false,
                uppercase: true,
                baseline_offset: 50,
            },
        }
    }
}

impl ExportFrameSpec {
    /// Parse a spec from TOML. Missing keys keep their default values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the document is malformed or describes an
    /// unusable frame.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let spec: Self = toml::from_str(s).map_err(|e| Error::Config(e.to_string()))?;
        spec.validate()?;
        Ok(spec)
    }

    /// Load a spec from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, or [`Error::Config`]
    /// if it does not describe a valid frame.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Check that the spec describes a drawable frame.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.min_width == 0 || self.min_height == 0 {
            return Err(Error::Config("minimum canvas size must be non-zero".into()));
        }
        if self.frame_width / 2 > self.frame_inset {
            return Err(Error::Config(
                "frame_width must not exceed twice the frame_inset".into(),
            ));
        }
        for (name, line) in [("brand", &self.brand), ("tagline", &self.tagline)] {
            if line.size == 0 {
                return Err(Error::Config(format!("{name}.size must be non-zero")));
            }
        }
        Ok(())
    }

    /// Compute where a `width` x `height` source lands on the export canvas.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyImage`] for a zero-sized source and
    /// [`Error::Canvas`] if the canvas dimensions overflow.
    pub fn layout(&self, width: u32, height: u32) -> Result<FrameLayout> {
        if width == 0 || height == 0 {
            return Err(Error::EmptyImage);
        }

        let pad = u64::from(self.padding);
        let canvas_w = (u64::from(width) + 2 * pad).max(u64::from(self.min_width));
        let canvas_h =
            (u64::from(height) + 2 * pad + u64::from(self.footer)).max(u64::from(self.min_height));

        let overflow = || Error::Canvas {
            width: canvas_w,
            height: canvas_h,
        };
        let canvas_width = u32::try_from(canvas_w).map_err(|_| overflow())?;
        let canvas_height = u32::try_from(canvas_h).map_err(|_| overflow())?;

        #[allow(clippy::cast_precision_loss)]
        let (avail_w, avail_h) = (
            (canvas_w - 2 * pad) as f64,
            (canvas_h - u64::from(self.footer) - 2 * pad) as f64,
        );
        let (src_w, src_h) = (f64::from(width), f64::from(height));

        let scale = (avail_w / src_w).min(avail_h / src_h);
        let draw_width = src_w * scale;
        let draw_height = src_h * scale;

        Ok(FrameLayout {
            canvas_width,
            canvas_height,
            available_height: avail_h,
            scale,
            draw_x: (f64::from(canvas_width) - draw_width) / 2.0,
            draw_y: f64::from(self.padding) + (avail_h - draw_height) / 2.0,
            draw_width,
            draw_height,
        })
    }
}

/// Placement of a source image on the export canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameLayout {
    /// Canvas width in pixels.
    pub canvas_width: u32,
    /// Canvas height in pixels.
    pub canvas_height: u32,
    /// Height of the image region above the footer, excluding padding.
    pub available_height: f64,
    /// Uniform scale applied to the source.
    pub scale: f64,
    /// Left edge of the drawn image.
    pub draw_x: f64,
    /// Top edge of the drawn image.
    pub draw_y: f64,
    /// Width of the drawn image.
    pub draw_width: f64,
    /// Height of the drawn image.
    pub draw_height: f64,
}

impl FrameLayout {
    /// Drawn size snapped to whole pixels, never below 1x1.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (self.draw_width.round() as u32).max(1),
            (self.draw_height.round() as u32).max(1),
        )
    }

    /// Drawn origin snapped to whole pixels.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn pixel_origin(&self) -> (i64, i64) {
        (self.draw_x.round() as i64, self.draw_y.round() as i64)
    }
}
