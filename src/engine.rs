//! File and batch front end over the export pipeline.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::Result;
use crate::export::{self, ExportFormat};
use crate::frame::ExportFrameSpec;

/// Options controlling batch export behavior.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Formats to export for every stencil.
    pub formats: Vec<ExportFormat>,
    /// Enable verbose logging.
    pub verbose: bool,
    /// Suppress non-error output.
    pub quiet: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            formats: ExportFormat::ALL.to_vec(),
            verbose: false,
            quiet: false,
        }
    }
}

impl ProcessOptions {
    /// Whether `result` should be reported; quiet runs only report failures.
    #[must_use]
    pub fn reports(&self, result: &ProcessResult) -> bool {
        !(self.quiet && result.success)
    }
}

/// Result of processing a single stencil file.
#[derive(Debug)]
pub struct ProcessResult {
    /// Path of the processed file.
    pub path: PathBuf,
    /// Whether every requested export was written.
    pub success: bool,
    /// Files written for this input.
    pub outputs: Vec<PathBuf>,
    /// Human-readable status message.
    pub message: String,
}

/// Exports stencil files through a fixed frame configuration.
///
/// Create once and reuse for multiple files.
#[derive(Debug, Clone, Default)]
pub struct StencilEngine {
    spec: ExportFrameSpec,
}

impl StencilEngine {
    /// Create an engine exporting with `spec`.
    #[must_use]
    pub fn new(spec: ExportFrameSpec) -> Self {
        Self { spec }
    }

    /// The frame configuration in use.
    #[must_use]
    pub fn spec(&self) -> &ExportFrameSpec {
        &self.spec
    }

    /// Process a single stencil file: load, export every format, save.
    ///
    /// Outputs land in `output_dir` as `<stem>-stencil.<ext>`. The first
    /// failing format stops the file; exports already written are kept.
    #[must_use]
    pub fn process_file(
        &self,
        input: &Path,
        output_dir: &Path,
        opts: &ProcessOptions,
    ) -> ProcessResult {
        let mut result = ProcessResult {
            path: input.to_path_buf(),
            success: false,
            outputs: Vec::new(),
            message: String::new(),
        };

        // Load image
        let stencil = match image::open(input) {
            Ok(img) => img.to_rgba8(),
            Err(e) => {
                result.message = format!("Failed to load: {e}");
                return result;
            }
        };
        debug!(
            path = %input.display(),
            width = stencil.width(),
            height = stencil.height(),
            "loaded stencil"
        );

        if let Err(e) = ensure_dir(output_dir) {
            result.message = format!("Failed to create output directory: {e}");
            return result;
        }

        for &format in &opts.formats {
            let output = output_path(input, output_dir, format);
            let written = export::export_stencil(&stencil, format, &self.spec)
                .and_then(|artifact| artifact.write_to(&output));
            if let Err(e) = written {
                warn!(path = %input.display(), %format, error = %e, "export failed");
                result.message = format!("Failed to export {format}: {e}");
                return result;
            }
            result.outputs.push(output);
        }

        result.success = true;
        result.message = format!("Exported {} file(s)", result.outputs.len());
        result
    }

    /// Process all supported images in a directory.
    ///
    /// Uses parallel iteration when the `cli` feature is enabled (via rayon).
    /// Returns a [`ProcessResult`] for each image found.
    #[must_use]
    pub fn process_directory(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        opts: &ProcessOptions,
    ) -> Vec<ProcessResult> {
        let entries: Vec<PathBuf> = match std::fs::read_dir(input_dir) {
            Ok(rd) => rd
                .filter_map(std::result::Result::ok)
                .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
                .map(|e| e.path())
                .filter(|p| is_supported_image(p))
                .collect(),
            Err(e) => {
                return vec![ProcessResult {
                    path: input_dir.to_path_buf(),
                    success: false,
                    outputs: Vec::new(),
                    message: format!("Failed to read directory: {e}"),
                }];
            }
        };

        #[cfg(feature = "cli")]
        {
            use rayon::prelude::*;
            entries
                .par_iter()
                .map(|input| self.process_file(input, output_dir, opts))
                .collect()
        }

        #[cfg(not(feature = "cli"))]
        {
            entries
                .iter()
                .map(|input| self.process_file(input, output_dir, opts))
                .collect()
        }
    }
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// Check if a file has a supported image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => matches!(
            ext.to_lowercase().as_str(),
            "jpg" | "jpeg" | "png" | "webp" | "bmp"
        ),
        None => false,
    }
}

/// Output path for one export of `input`.
///
/// Example: `"dragon.png"` exported as PNG becomes `"<dir>/dragon-stencil.png"`.
#[must_use]
pub fn output_path(input: &Path, output_dir: &Path, format: ExportFormat) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    output_dir.join(format!("{stem}-stencil.{}", format.extension()))
}

/// Default output directory: next to the input.
#[must_use]
pub fn default_output_dir(input: &Path) -> PathBuf {
    match input.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
