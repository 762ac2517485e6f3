//! Convert command implementation

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::palettes::resolve_palette;
use crate::pipeline::{build_pattern, PatternError};
use crate::quantize::CropRegion;

use super::{resolve_config, PatternArgs, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// Execute the convert command
pub fn run_convert(
    input: &Path,
    output: Option<&Path>,
    crop: Option<&str>,
    args: &PatternArgs,
    config_path: Option<&Path>,
) -> ExitCode {
    let crop = match crop.map(parse_crop).transpose() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: --crop {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let loaded = match resolve_config(config_path, &args.overrides()) {
        Ok(l) => l,
        Err(code) => return code,
    };

    let palette = match resolve_palette(&loaded.config.pattern.palette, loaded.base_dir()) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let image = match image::open(input) {
        Ok(img) => img.to_rgba8(),
        Err(e) => {
            eprintln!("Error: Failed to open '{}': {}", input.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let mut options = loaded.config.pattern_options();
    options.crop = crop;

    let pattern = match build_pattern(&image, &palette, &options) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            let code = match e {
                PatternError::CropOutOfBounds { .. }
                | PatternError::UnknownOutlineColor { .. }
                | PatternError::UnknownRestrictedColor { .. }
                | PatternError::GridTooLarge { .. } => EXIT_INVALID_ARGS,
                _ => EXIT_ERROR,
            };
            return ExitCode::from(code);
        }
    };

    let output_path = output.map(Path::to_path_buf).unwrap_or_else(|| default_output(input));
    let json = match pattern.to_json() {
        Ok(j) => j,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    if let Err(e) = std::fs::write(&output_path, json) {
        eprintln!("Error: Failed to write '{}': {}", output_path.display(), e);
        return ExitCode::from(EXIT_ERROR);
    }

    let side = pattern.grid.width();
    println!(
        "Converted: {} ({}x{}, {} colors, {} sheets)",
        output_path.display(),
        side,
        side,
        pattern.colors().len(),
        pattern.sheet_count()
    );
    if !pattern.merges.is_empty() {
        println!("  Merged {} colors", pattern.merges.len());
    }

    ExitCode::from(EXIT_SUCCESS)
}

/// `cat.png` -> `cat.json`, next to the input.
fn default_output(input: &Path) -> PathBuf {
    input.with_extension("json")
}

/// Parse `X,Y,W,H`.
fn parse_crop(s: &str) -> Result<CropRegion, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let &[x, y, width, height] = parts.as_slice() else {
        return Err(format!("expects X,Y,W,H, got '{}'", s));
    };
    let num = |v: &str| {
        v.parse::<u32>().map_err(|_| format!("'{}' is not a non-negative integer", v))
    };
    Ok(CropRegion { x: num(x)?, y: num(y)?, width: num(width)?, height: num(height)? })
}
