//! Image to pattern conversion.
//!
//! This is the validating boundary in front of the algorithm modules: it
//! rejects impossible parameters up front, then runs
//! sample → quantize → rare-color merge → color budget → outline.

use std::path::Path;

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::Rgb;
use crate::grid::{Cell, ColorCount, Grid};
use crate::layout::Sheet;
use crate::outline::grow_outline;
use crate::palette::{hint_suffix, Palette, PaletteError};
use crate::quantize::{quantize, sample, CropRegion, DEFAULT_ALPHA_THRESHOLD};
use crate::reduce::{merge_rare_colors, reduce_colors, Merge};
use crate::suggest::did_you_mean;

/// Largest supported grid side (`resolution * partitions`) in cells.
pub const MAX_GRID_SIZE: usize = 2048;

/// Error type for pattern building and pattern files
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PatternError {
    #[error("resolution must be at least 1")]
    ZeroResolution,
    #[error("partitions must be at least 1")]
    ZeroPartitions,
    #[error("crop {crop:?} lies outside the {width}x{height} image")]
    CropOutOfBounds { crop: CropRegion, width: u32, height: u32 },
    #[error("outline color '{code}' is not in palette '{palette}'{}", hint_suffix(.hint))]
    UnknownOutlineColor { code: String, palette: String, hint: Option<String> },
    #[error("restricted color '{code}' is not in palette '{palette}'{}", hint_suffix(.hint))]
    UnknownRestrictedColor { code: String, palette: String, hint: Option<String> },
    #[error("image is empty")]
    EmptyImage,
    #[error("pattern grid is {width}x{height}, expected {expected}x{expected}")]
    GridSizeMismatch { expected: usize, width: usize, height: usize },
    #[error("{partitions} partitions of {resolution} cells exceeds the {max}-cell grid limit")]
    GridTooLarge { resolution: usize, partitions: usize, max: usize },
    #[error("cell ({x}, {y}) holds a bead marked ({bead_x}, {bead_y})")]
    MisplacedBead { x: usize, y: usize, bead_x: usize, bead_y: usize },
    #[error("pattern color '{code}' is not in palette '{palette}'")]
    UnknownPatternColor { code: String, palette: String },
    #[error("pattern color '{code}' is stored as {hex} but palette '{palette}' has {expected}")]
    StaleColor { code: String, hex: String, palette: String, expected: String },
    #[error(transparent)]
    Palette(#[from] PaletteError),
    #[error("failed to read image: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid pattern file: {0}")]
    Json(#[from] serde_json::Error),
}

/// Outline settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineOptions {
    pub width: usize,
    pub code: String,
}

/// Parameters for [`build_pattern`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternOptions {
    /// Cells per sheet side
    pub resolution: usize,
    /// Sheets per side
    pub partitions: usize,
    /// Upper bound on distinct colors. Values below 1 are clamped to 1.
    pub max_colors: Option<usize>,
    /// Colors used fewer times than this are merged away; 0 disables
    pub merge_threshold: usize,
    pub alpha_threshold: u8,
    pub outline: Option<OutlineOptions>,
    /// Only these codes are used when quantizing
    pub restrict: Option<Vec<String>>,
    /// Region of the source image to use; the whole image when `None`
    pub crop: Option<CropRegion>,
}

impl Default for PatternOptions {
    fn default() -> Self {
        Self {
            resolution: 29,
            partitions: 1,
            max_colors: None,
            merge_threshold: 0,
            alpha_threshold: DEFAULT_ALPHA_THRESHOLD,
            outline: None,
            restrict: None,
            crop: None,
        }
    }
}

impl PatternOptions {
    /// Full grid side length in cells, or `None` if it overflows.
    pub fn grid_size(&self) -> Option<usize> {
        self.resolution.checked_mul(self.partitions)
    }
}

/// Side length of a `partitions x partitions` tiling of `resolution` cells,
/// bounded by [`MAX_GRID_SIZE`].
fn checked_grid_size(resolution: usize, partitions: usize) -> Result<usize, PatternError> {
    if resolution == 0 {
        return Err(PatternError::ZeroResolution);
    }
    if partitions == 0 {
        return Err(PatternError::ZeroPartitions);
    }
    resolution
        .checked_mul(partitions)
        .filter(|&size| size <= MAX_GRID_SIZE)
        .ok_or(PatternError::GridTooLarge { resolution, partitions, max: MAX_GRID_SIZE })
}

/// A finished bead pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    /// Name of the palette the codes refer to
    pub palette: String,
    pub block_size: usize,
    pub partitions: usize,
    pub grid: Grid,
    /// Merges applied while building, rare-color merges first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub merges: Vec<Merge>,
}

impl Pattern {
    /// Bill of materials for the whole pattern.
    pub fn colors(&self) -> Vec<ColorCount> {
        self.grid.count_colors()
    }

    pub fn sheet_count(&self) -> usize {
        self.partitions.saturating_mul(self.partitions)
    }

    /// Bill of materials for sheet `index`, or `None` if out of range.
    pub fn sheet_colors(&self, index: usize) -> Option<Vec<ColorCount>> {
        Sheet::new(index, self.partitions, self.block_size)
            .map(|sheet| sheet.window(&self.grid).count_colors())
    }

    /// Check that the grid matches the declared tiling and that every bead
    /// sits where its coordinates say.
    pub fn validate(&self) -> Result<(), PatternError> {
        let expected = checked_grid_size(self.block_size, self.partitions)?;
        if self.grid.width() != expected || self.grid.height() != expected {
            return Err(PatternError::GridSizeMismatch {
                expected,
                width: self.grid.width(),
                height: self.grid.height(),
            });
        }
        for (y, row) in self.grid.rows().iter().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                if let Cell::Filled(bead) = cell {
                    if (bead.x, bead.y) != (x, y) {
                        return Err(PatternError::MisplacedBead {
                            x,
                            y,
                            bead_x: bead.x,
                            bead_y: bead.y,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Check every bead against `palette`: the code must exist and the stored
    /// hex must be the palette's color for it.
    pub fn check_palette(&self, palette: &Palette) -> Result<(), PatternError> {
        for bead in self.grid.beads() {
            let Some(color) = palette.get(&bead.code) else {
                return Err(PatternError::UnknownPatternColor {
                    code: bead.code.clone(),
                    palette: palette.name().to_string(),
                });
            };
            if Rgb::from_hex(&bead.hex).ok() != Some(color.rgb) {
                return Err(PatternError::StaleColor {
                    code: bead.code.clone(),
                    hex: bead.hex.clone(),
                    palette: palette.name().to_string(),
                    expected: color.hex.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, PatternError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, PatternError> {
        let pattern: Pattern = serde_json::from_str(json)?;
        pattern.validate()?;
        Ok(pattern)
    }

    /// Read and validate a pattern file.
    pub fn load(path: &Path) -> Result<Self, PatternError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }
}

/// Convert `image` into a pattern using `palette`.
///
/// The grid side is capped at [`MAX_GRID_SIZE`] cells.
pub fn build_pattern(
    image: &RgbaImage,
    palette: &Palette,
    options: &PatternOptions,
) -> Result<Pattern, PatternError> {
    let size = validate_options(image, palette, options)?;
    let crop = options.crop.unwrap_or_else(|| CropRegion::full(image));
    let pixels = sample(image, crop, size as u32);
    let grid = quantize(&pixels, palette, options.restrict.as_deref(), options.alpha_threshold);
    tracing::info!(size, colors = grid.distinct_colors(), "quantized image");

    let rare = merge_rare_colors(&grid, options.merge_threshold, palette);
    let mut merges = rare.merges;
    let mut grid = rare.grid;

    if let Some(max) = options.max_colors {
        let reduced = reduce_colors(&grid, max.max(1), palette);
        merges.extend(reduced.merges);
        grid = reduced.grid;
    }
    if !merges.is_empty() {
        tracing::info!(merges = merges.len(), colors = grid.distinct_colors(), "reduced colors");
    }

    if let Some(outline) = &options.outline {
        // Presence checked in validate_options.
        if let Some(color) = palette.get(&outline.code) {
            grid = grow_outline(&grid, outline.width, color);
        }
    }

    Ok(Pattern {
        palette: palette.name().to_string(),
        block_size: options.resolution,
        partitions: options.partitions,
        grid,
        merges,
    })
}

/// Returns the grid side length.
fn validate_options(
    image: &RgbaImage,
    palette: &Palette,
    options: &PatternOptions,
) -> Result<usize, PatternError> {
    let size = checked_grid_size(options.resolution, options.partitions)?;
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(PatternError::EmptyImage);
    }
    if let Some(crop) = options.crop {
        if !crop.fits(width, height) {
            return Err(PatternError::CropOutOfBounds { crop, width, height });
        }
    }
    if let Some(outline) = &options.outline {
        if !palette.contains(&outline.code) {
            return Err(PatternError::UnknownOutlineColor {
                code: outline.code.clone(),
                palette: palette.name().to_string(),
                hint: did_you_mean(&outline.code, palette.codes()),
            });
        }
    }
    if let Some(restrict) = &options.restrict {
        if let Some(code) = restrict.iter().find(|c| !palette.contains(c)) {
            return Err(PatternError::UnknownRestrictedColor {
                code: code.clone(),
                palette: palette.name().to_string(),
                hint: did_you_mean(code, palette.codes()),
            });
        }
    }
    Ok(size)
}
