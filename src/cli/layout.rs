//! Layout command implementation

use std::path::Path;
use std::process::ExitCode;

use crate::config::LoadedConfig;
use crate::layout::{layout_all, layout_sheet, LayoutError, PageSpec, SheetLayout};
use crate::palette::Palette;
use crate::palettes::resolve_palette;
use crate::pipeline::Pattern;

use super::{resolve_config, PageArgs, EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};

/// A pattern with the layouts of the requested sheets.
pub(super) struct Planned {
    pub pattern: Pattern,
    pub page: PageSpec,
    pub layouts: Vec<SheetLayout>,
}

/// Load a pattern file and lay out one sheet or all of them.
pub(super) fn plan(
    pattern_path: &Path,
    sheet: Option<usize>,
    page: &PageArgs,
    config_path: Option<&Path>,
) -> Result<Planned, ExitCode> {
    let loaded = resolve_config(config_path, &page.overrides())?;
    let page = loaded.config.page.to_page_spec();

    let pattern = Pattern::load(pattern_path).map_err(|e| {
        eprintln!("Error: Failed to load '{}': {}", pattern_path.display(), e);
        ExitCode::from(EXIT_ERROR)
    })?;

    match pattern_palette(&pattern.palette, &loaded) {
        Some(palette) => pattern.check_palette(&palette).map_err(|e| {
            eprintln!("Error: '{}': {}", pattern_path.display(), e);
            ExitCode::from(EXIT_ERROR)
        })?,
        None => tracing::warn!(
            palette = %pattern.palette,
            "palette not found; pattern colors are not checked"
        ),
    }

    let (block_size, partitions) = (pattern.block_size, pattern.partitions);
    let result = match sheet {
        Some(index) => {
            layout_sheet(&pattern.grid, block_size, partitions, &page, index).map(|l| vec![l])
        }
        None => layout_all(&pattern.grid, block_size, partitions, &page),
    };
    let layouts = result.map_err(|e| {
        eprintln!("Error: {}", e);
        match e {
            LayoutError::SheetOutOfRange { .. } | LayoutError::PageTooSmall { .. } => {
                ExitCode::from(EXIT_INVALID_ARGS)
            }
            _ => ExitCode::from(EXIT_ERROR),
        }
    })?;

    Ok(Planned { pattern, page, layouts })
}

/// The palette a pattern was built with: a built-in or file palette of that
/// name, or the configured palette when its name matches.
fn pattern_palette(name: &str, loaded: &LoadedConfig) -> Option<Palette> {
    resolve_palette(name, loaded.base_dir()).ok().or_else(|| {
        resolve_palette(&loaded.config.pattern.palette, loaded.base_dir())
            .ok()
            .filter(|palette| palette.name() == name)
    })
}

/// Execute the layout command
pub fn run_layout(
    pattern_path: &Path,
    sheet: Option<usize>,
    output: Option<&Path>,
    page: &PageArgs,
    config_path: Option<&Path>,
) -> ExitCode {
    let planned = match plan(pattern_path, sheet, page, config_path) {
        Ok(p) => p,
        Err(code) => return code,
    };

    let json = match serde_json::to_string_pretty(&planned.layouts) {
        Ok(j) => j,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    match output {
        Some(path) => {
            if let Err(e) = std::fs::write(path, json) {
                eprintln!("Error: Failed to write '{}': {}", path.display(), e);
                return ExitCode::from(EXIT_ERROR);
            }
            println!("Wrote {} sheet layouts to {}", planned.layouts.len(), path.display());
        }
        None => println!("{}", json),
    }

    ExitCode::from(EXIT_SUCCESS)
}
