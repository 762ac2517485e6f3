//! Render command implementation

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use rayon::prelude::*;

use crate::render::{render_sheet, save_png, RenderError};

use super::layout::plan;
use super::{PageArgs, EXIT_ERROR, EXIT_SUCCESS};

/// Execute the render command
pub fn run_render(
    pattern_path: &Path,
    out_dir: &Path,
    sheet: Option<usize>,
    page: &PageArgs,
    config_path: Option<&Path>,
) -> ExitCode {
    let planned = match plan(pattern_path, sheet, page, config_path) {
        Ok(p) => p,
        Err(code) => return code,
    };

    // Sheets are independent, so render them in parallel.
    let results: Vec<(PathBuf, Result<(), RenderError>)> = planned
        .layouts
        .par_iter()
        .map(|layout| {
            let path = out_dir.join(sheet_file_name(&layout.label));
            let image = render_sheet(&planned.pattern.grid, layout, &planned.page);
            let saved = save_png(&image, &path);
            (path, saved)
        })
        .collect();

    let mut failed = false;
    for (path, result) in results {
        match result {
            Ok(()) => println!("Rendered: {}", path.display()),
            Err(e) => {
                eprintln!("Error: Failed to write '{}': {}", path.display(), e);
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::from(EXIT_ERROR)
    } else {
        ExitCode::from(EXIT_SUCCESS)
    }
}

fn sheet_file_name(label: &str) -> String {
    format!("sheet_{}.png", label)
}
