//! Export artifacts: branded JPG, transparent PNG and the print page.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use image::RgbaImage;
use tracing::{info, instrument};

use crate::compositor;
use crate::error::{Error, Result};
use crate::frame::ExportFrameSpec;
use crate::keying;
use crate::payload::{self, EncodedPayload, DEFAULT_JPEG_QUALITY};
use crate::print;

/// Base name of exported files.
pub const DEFAULT_FILE_STEM: &str = "EasyInkLab-stencil";

/// The three export targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ExportFormat {
    /// Branded frame on an opaque white page, JPEG encoded.
    Jpg,
    /// Keyed stencil in a branded frame with a transparent background.
    Png,
    /// Print-ready page around the unframed stencil.
    Pdf,
}

impl ExportFormat {
    /// Every format, in menu order.
    pub const ALL: [Self; 3] = [Self::Jpg, Self::Png, Self::Pdf];

    /// File extension of the produced artifact.
    ///
    /// The print target is an HTML page handed to the print dialog.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpg => "jpg",
            Self::Png => "png",
            Self::Pdf => "html",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(Self::Jpg),
            "png" => Ok(Self::Png),
            "pdf" | "print" => Ok(Self::Pdf),
            other => Err(Error::Config(format!("unknown export format: {other}"))),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Jpg => "jpg",
            Self::Png => "png",
            Self::Pdf => "pdf",
        })
    }
}

/// Content of an export artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactContent {
    /// An encoded image to download.
    Image(EncodedPayload),
    /// A markup document to print.
    Document(String),
}

/// A finished export: a suggested file name and its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    /// Suggested file name, e.g. `EasyInkLab-stencil.png`.
    pub file_name: String,
    /// The encoded image or document.
    pub content: ArtifactContent,
}

impl ExportArtifact {
    /// Raw bytes of the artifact as they would be saved.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        match &self.content {
            ArtifactContent::Image(payload) => &payload.bytes,
            ArtifactContent::Document(html) => html.as_bytes(),
        }
    }

    /// Write the artifact to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be written.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.as_bytes())?;
        Ok(())
    }
}

/// Produce the export artifact for `stencil` in `format`.
///
/// The stencil is the white-background image from the generation service.
/// PNG exports key it to transparency before framing.
///
/// # Errors
///
/// Propagates compositing and encoding failures; nothing is substituted on error.
pub fn export_stencil(
    stencil: &RgbaImage,
    format: ExportFormat,
    spec: &ExportFrameSpec,
) -> Result<ExportArtifact> {
    render(stencil, None, format, spec)
}

/// Like [`export_stencil`], with the keyed variant of `stencil` already at hand.
///
/// `keyed` is framed for PNG exports; the other formats only use `stencil`.
///
/// # Errors
///
/// Propagates compositing and encoding failures.
pub fn export_with_keyed(
    stencil: &RgbaImage,
    keyed: &RgbaImage,
    format: ExportFormat,
    spec: &ExportFrameSpec,
) -> Result<ExportArtifact> {
    render(stencil, Some(keyed), format, spec)
}

#[instrument(skip(stencil, keyed, spec), fields(width = stencil.width(), height = stencil.height()))]
fn render(
    stencil: &RgbaImage,
    keyed: Option<&RgbaImage>,
    format: ExportFormat,
    spec: &ExportFrameSpec,
) -> Result<ExportArtifact> {
    let content = match format {
        ExportFormat::Jpg => {
            let framed = compositor::composite(stencil, false, spec)?;
            ArtifactContent::Image(payload::encode_jpeg(&framed, DEFAULT_JPEG_QUALITY)?)
        }
        ExportFormat::Png => {
            let framed = match keyed {
                Some(keyed) => compositor::composite(keyed, true, spec)?,
                None => compositor::composite(&keying::key_transparent(stencil), true, spec)?,
            };
            ArtifactContent::Image(payload::encode_png(&framed)?)
        }
        ExportFormat::Pdf => {
            let page = payload::encode_png(stencil)?;
            ArtifactContent::Document(print::render_print_document(&page, spec))
        }
    };

    let artifact = ExportArtifact {
        file_name: format!("{DEFAULT_FILE_STEM}.{}", format.extension()),
        content,
    };
    info!(file_name = %artifact.file_name, bytes = artifact.as_bytes().len(), "export ready");
    Ok(artifact)
}
