//! Pixel sampling and palette quantization.
//!
//! Turns RGBA samples into a [`Grid`] of palette codes. Transparency is a
//! binary decision: any pixel whose alpha is below the threshold becomes an
//! empty cell.

use std::collections::HashMap;

use image::imageops::{self, FilterType};
use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::grid::{Bead, Cell, Grid};
use crate::palette::{Palette, PaletteColor};

/// Pixels with alpha below this value are treated as fully transparent.
pub const DEFAULT_ALPHA_THRESHOLD: u8 = 50;

/// A rectangular region of the source image, in source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRegion {
    /// The whole image.
    pub fn full(image: &RgbaImage) -> Self {
        Self { x: 0, y: 0, width: image.width(), height: image.height() }
    }

    /// True when the region is non-empty and lies inside `width x height`.
    pub fn fits(&self, width: u32, height: u32) -> bool {
        self.width > 0
            && self.height > 0
            && self.x.checked_add(self.width).is_some_and(|right| right <= width)
            && self.y.checked_add(self.height).is_some_and(|bottom| bottom <= height)
    }
}

/// Crop `image` and resize the crop to `size x size` with nearest-neighbour
/// sampling.
pub fn sample(image: &RgbaImage, crop: CropRegion, size: u32) -> RgbaImage {
    let cropped = imageops::crop_imm(image, crop.x, crop.y, crop.width, crop.height).to_image();
    if cropped.width() == size && cropped.height() == size {
        return cropped;
    }
    imageops::resize(&cropped, size, size, FilterType::Nearest)
}

/// Map every pixel of `pixels` to its nearest palette color.
///
/// The output grid has the same dimensions as `pixels`. `restrict` limits the
/// candidate codes; see [`Palette::find_nearest_color`].
pub fn quantize(
    pixels: &RgbaImage,
    palette: &Palette,
    restrict: Option<&[String]>,
    alpha_threshold: u8,
) -> Grid {
    let (width, height) = (pixels.width() as usize, pixels.height() as usize);
    let mut grid = Grid::new(width, height);
    let mut resolved: HashMap<Rgb, &PaletteColor> = HashMap::new();

    for (x, y, px) in pixels.enumerate_pixels() {
        if px[3] < alpha_threshold {
            continue;
        }
        let rgb = Rgb::from(*px);
        let color =
            *resolved.entry(rgb).or_insert_with(|| palette.find_nearest_color(rgb, restrict));
        let (x, y) = (x as usize, y as usize);
        grid.rows_mut()[y][x] = Cell::Filled(Bead::new(color, x, y));
    }

    tracing::debug!(
        width,
        height,
        unique_samples = resolved.len(),
        filled = grid.filled_count(),
        "quantized pixels"
    );
    grid
}
