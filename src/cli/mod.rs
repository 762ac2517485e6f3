//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod convert;
mod layout;
mod palettes;
mod render;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::{load_config, merge_cli_overrides, CliOverrides, ConfigError, LoadedConfig};
use crate::layout::Orientation;

pub use palettes::PaletteAction;

/// Process exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Environment variable holding a log filter, checked before `RUST_LOG`.
pub const LOG_ENV: &str = "BEAD_LOG";

/// bead - Turn images into printable bead patterns
#[derive(Parser)]
#[command(name = "bead")]
#[command(about = "bead - Turn images into printable fixed-palette bead patterns")]
#[command(version)]
pub struct Cli {
    /// Path to bead.toml (default: search upward from the current directory)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert an image into a pattern file (JSON)
    Convert {
        /// Input image (any format the image crate decodes)
        input: PathBuf,

        /// Output pattern file. Default: {input}.json
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Source region to use, as X,Y,WIDTH,HEIGHT in image pixels
        #[arg(long, value_name = "X,Y,W,H")]
        crop: Option<String>,

        #[command(flatten)]
        pattern: PatternArgs,
    },

    /// Compute sheet layouts for a pattern and print them as JSON
    Layout {
        /// Pattern file produced by `bead convert`
        pattern: PathBuf,

        /// Only this sheet (0-based index)
        #[arg(long)]
        sheet: Option<usize>,

        /// Write JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Render pattern sheets to PNG (sheet_<label>.png)
    Render {
        /// Pattern file produced by `bead convert`
        pattern: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// Only this sheet (0-based index)
        #[arg(long)]
        sheet: Option<usize>,

        #[command(flatten)]
        page: PageArgs,
    },

    /// List and inspect palettes
    Palettes {
        #[command(subcommand)]
        action: PaletteAction,
    },
}

/// Pattern flags shared with bead.toml `[pattern]` and `[outline]`
#[derive(Args, Debug, Default, Clone)]
pub struct PatternArgs {
    /// Built-in palette name or palette file
    #[arg(short, long)]
    pub palette: Option<String>,

    /// Cells per sheet side
    #[arg(short, long)]
    pub resolution: Option<usize>,

    /// Sheets per side (N gives NxN sheets)
    #[arg(long)]
    pub partitions: Option<usize>,

    /// Maximum number of distinct colors
    #[arg(long)]
    pub max_colors: Option<usize>,

    /// Merge colors used fewer times than this into common ones
    #[arg(long)]
    pub merge_threshold: Option<usize>,

    /// Pixels with alpha below this are empty (0-255)
    #[arg(long)]
    pub alpha_threshold: Option<u8>,

    /// Only use these palette codes (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub restrict: Option<Vec<String>>,

    /// Outline rings to add around the design
    #[arg(long)]
    pub outline: Option<usize>,

    /// Palette code for the outline
    #[arg(long)]
    pub outline_color: Option<String>,
}

impl PatternArgs {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            palette: self.palette.clone(),
            resolution: self.resolution,
            partitions: self.partitions,
            max_colors: self.max_colors,
            merge_threshold: self.merge_threshold,
            alpha_threshold: self.alpha_threshold,
            restrict: self.restrict.clone(),
            outline_width: self.outline,
            outline_color: self.outline_color.clone(),
            ..CliOverrides::default()
        }
    }
}

/// Page flags shared with bead.toml `[page]`
#[derive(Args, Debug, Default, Clone)]
pub struct PageArgs {
    /// Page width in output pixels
    #[arg(long)]
    pub page_width: Option<f64>,

    /// Page height in output pixels
    #[arg(long)]
    pub page_height: Option<f64>,

    /// Page margin in output pixels
    #[arg(long)]
    pub margin: Option<f64>,

    /// Where the thumbnail and legend go
    #[arg(long, value_enum)]
    pub orientation: Option<Orientation>,

    /// Upper bound on legend columns
    #[arg(long)]
    pub max_legend_columns: Option<usize>,
}

impl PageArgs {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            page_width: self.page_width,
            page_height: self.page_height,
            margin: self.margin,
            orientation: self.orientation,
            max_legend_columns: self.max_legend_columns,
            ..CliOverrides::default()
        }
    }
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Convert { input, output, crop, pattern } => {
            convert::run_convert(&input, output.as_deref(), crop.as_deref(), &pattern, config_path)
        }
        Commands::Layout { pattern, sheet, output, page } => {
            layout::run_layout(&pattern, sheet, output.as_deref(), &page, config_path)
        }
        Commands::Render { pattern, out_dir, sheet, page } => {
            render::run_render(&pattern, &out_dir, sheet, &page, config_path)
        }
        Commands::Palettes { action } => palettes::run_palettes(action, config_path),
    }
}

/// Install the stderr log subscriber. `-v` flags win over the environment.
fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_env(LOG_ENV)
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    // A second init (tests calling run twice) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Load bead.toml and apply command-line overrides.
///
/// Read/parse failures map to [`EXIT_ERROR`]; values rejected only after
/// the overrides map to [`EXIT_INVALID_ARGS`].
pub(crate) fn resolve_config(
    config_path: Option<&Path>,
    overrides: &CliOverrides,
) -> Result<LoadedConfig, ExitCode> {
    let mut loaded = load_config(config_path).map_err(|e| {
        eprintln!("Error: {}", e);
        ExitCode::from(EXIT_ERROR)
    })?;
    merge_cli_overrides(&mut loaded.config, overrides).map_err(|e| {
        eprintln!("Error: {}", e);
        match e {
            ConfigError::Validation(_) => ExitCode::from(EXIT_INVALID_ARGS),
            _ => ExitCode::from(EXIT_ERROR),
        }
    })?;
    Ok(loaded)
}
