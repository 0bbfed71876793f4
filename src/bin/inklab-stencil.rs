use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use tracing::{error, info, warn};

use inklab_stencil::logger::{self, Verbosity};
use inklab_stencil::{
    default_output_dir, ExportFormat, ExportFrameSpec, ProcessOptions, ProcessResult,
    StencilEngine,
};

#[derive(Parser)]
#[command(
    name = "inklab-stencil",
    about = "Export tattoo stencils as branded JPG, transparent PNG and print pages",
    version,
    after_help = "Simple usage: inklab-stencil <stencil.png>  (writes all formats next to the input)\n\n\
                  The input must already be a black-on-white stencil; generating it from a\n\
                  photo is done by the stencil service, not by this tool."
)]
struct Cli {
    /// Input stencil image or directory of stencils
    input: String,

    /// Output directory (default: next to the input)
    #[arg(short, long)]
    output: Option<String>,

    /// Export formats; repeat for several (default: all)
    #[arg(short, long = "format", value_enum)]
    formats: Vec<ExportFormat>,

    /// TOML file overriding the export frame settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();
    logger::init(Verbosity::from_flags(cli.quiet, cli.verbose));

    let spec = match &cli.config {
        Some(path) => match ExportFrameSpec::from_path(path) {
            Ok(spec) => spec,
            Err(e) => {
                error!("Failed to load frame config {}: {e}", path.display());
                process::exit(1);
            }
        },
        None => ExportFrameSpec::default(),
    };

    let mut formats: Vec<ExportFormat> = Vec::new();
    for format in &cli.formats {
        if !formats.contains(format) {
            formats.push(*format);
        }
    }
    let opts = ProcessOptions {
        formats: if formats.is_empty() {
            ExportFormat::ALL.to_vec()
        } else {
            formats
        },
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    let input_path = Path::new(&cli.input);
    if !input_path.exists() {
        error!("Input path does not exist: {}", cli.input);
        process::exit(1);
    }

    let output_dir = cli
        .output
        .as_ref()
        .map_or_else(|| default_output_dir(input_path), PathBuf::from);

    let engine = StencilEngine::new(spec);
    let results = if input_path.is_dir() {
        if cli.output.is_none() {
            error!("Output directory is required for batch processing");
            eprintln!("Usage: inklab-stencil <input_dir> -o <output_dir>");
            process::exit(1);
        }
        engine.process_directory(input_path, &output_dir, &opts)
    } else {
        vec![engine.process_file(input_path, &output_dir, &opts)]
    };

    let mut success_count = 0u32;
    let mut fail_count = 0u32;

    for r in &results {
        report(r, &opts);
        if r.success {
            success_count += 1;
        } else {
            fail_count += 1;
        }
    }

    if results.len() > 1 {
        info!(
            "[Summary] Exported: {success_count}, Failed: {fail_count} (Total: {})",
            results.len()
        );
    } else if results.is_empty() {
        warn!("No supported images found in {}", cli.input);
    }

    if fail_count > 0 {
        process::exit(1);
    }
}

fn report(result: &ProcessResult, opts: &ProcessOptions) {
    if !opts.reports(result) {
        return;
    }

    let filename = result.path.file_name().map_or_else(
        || result.path.display().to_string(),
        |f| f.to_string_lossy().to_string(),
    );

    if result.success {
        info!("[OK] {filename}: {}", result.message);
        if opts.verbose {
            for output in &result.outputs {
                info!("  -> {}", output.display());
            }
        }
    } else {
        error!("[FAIL] {filename}: {}", result.message);
    }
}
