//! Palettes command implementation

use std::path::Path;
use std::process::ExitCode;

use clap::Subcommand;

use crate::config::load_config;
use crate::palettes::{list_builtins, resolve_palette};

use super::{EXIT_ERROR, EXIT_SUCCESS};

#[derive(Subcommand)]
pub enum PaletteAction {
    /// List all built-in palettes
    List,
    /// Show the colors of a built-in palette or palette file
    Show {
        /// Palette name or path
        name: String,
    },
}

/// Execute the palettes command
pub fn run_palettes(action: PaletteAction, config_path: Option<&Path>) -> ExitCode {
    match action {
        PaletteAction::List => {
            println!("Built-in palettes:");
            for name in list_builtins() {
                println!("  {}", name);
            }
            ExitCode::from(EXIT_SUCCESS)
        }
        PaletteAction::Show { name } => {
            // Relative palette paths resolve like they do in bead.toml.
            let loaded = load_config(config_path).ok();
            let base_dir = loaded.as_ref().and_then(|l| l.base_dir());
            match resolve_palette(&name, base_dir) {
                Ok(palette) => {
                    println!("Palette: {} ({} colors)", palette.name(), palette.len());
                    println!();
                    for color in palette.iter() {
                        println!("  {:<6} {}", color.code, color.hex);
                    }
                    ExitCode::from(EXIT_SUCCESS)
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    eprintln!();
                    eprintln!("Available palettes:");
                    for builtin in list_builtins() {
                        eprintln!("  {}", builtin);
                    }
                    ExitCode::from(EXIT_ERROR)
                }
            }
        }
    }
}
