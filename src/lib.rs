//! beadsheet - Library for turning images into fixed-palette bead patterns
//!
//! This library provides functionality to:
//! - Map pixels onto a small named palette and build a bead grid
//! - Reduce the colors in use to a budget by agglomerative merging
//! - Grow an outline around the design
//! - Split the grid into printable sheets with a thumbnail and legend
//! - Render sheets to PNG

pub mod cli;
pub mod color;
pub mod config;
pub mod grid;
pub mod layout;
pub mod outline;
pub mod palette;
pub mod palettes;
pub mod pipeline;
pub mod quantize;
pub mod reduce;
pub mod render;
pub mod suggest;

pub use color::{DistanceMetric, Rgb};
pub use grid::{Bead, Cell, ColorCount, Grid};
pub use layout::{layout_all, layout_sheet, PageSpec, SheetLayout};
pub use palette::{Palette, PaletteColor};
pub use pipeline::{build_pattern, Pattern, PatternOptions};
