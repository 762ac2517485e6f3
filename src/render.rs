//! Raster output for sheet layouts.
//!
//! Draws a [`SheetLayout`] into an RGBA page image: beads as filled circles on
//! a light cell grid, the thumbnail as dots or squares with the sheet
//! highlight, and the legend as swatches with proportional count bars.
//! Label text is left to callers that have a font renderer.

use std::ops::Range;
use std::path::Path;

use image::{Rgba, RgbaImage};
use thiserror::Error;

use crate::color::Rgb;
use crate::grid::{Cell, Grid};
use crate::layout::{PageSpec, Rect, SheetLayout, Stroke, ThumbnailStyle};

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const GRID_LINE: Rgba<u8> = Rgba([210, 210, 210, 255]);
const PEG: Rgba<u8> = Rgba([225, 225, 225, 255]);
const SWATCH_BORDER: Rgba<u8> = Rgba([0, 0, 0, 255]);
const COUNT_BAR: Rgba<u8> = Rgba([150, 150, 150, 255]);

/// Bead radius as a fraction of the cell size.
const BEAD_RADIUS: f64 = 0.42;
const PEG_RADIUS: f64 = 0.1;
const THUMB_DOT_RADIUS: f64 = 0.45;

/// Error type for writing rendered sheets
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Render one sheet. `grid` is the full pattern grid the layout was computed
/// from.
pub fn render_sheet(grid: &Grid, layout: &SheetLayout, page: &PageSpec) -> RgbaImage {
    let width = page.width.round().max(1.0) as u32;
    let height = page.height.round().max(1.0) as u32;
    let mut image = RgbaImage::from_pixel(width, height, BACKGROUND);

    draw_cells(&mut image, grid, layout);
    draw_thumbnail(&mut image, grid, layout);
    draw_legend(&mut image, layout);

    tracing::debug!(sheet = %layout.label, width, height, "rendered sheet");
    image
}

/// Save an image as PNG, creating parent directories as needed.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), RenderError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    image.save(path)?;
    Ok(())
}

fn draw_cells(image: &mut RgbaImage, grid: &Grid, layout: &SheetLayout) {
    let sheet = &layout.sheet;
    let cell = layout.cell_size;
    let origin = layout.grid;

    if cell >= 3.0 {
        for i in 0..=sheet.size {
            let offset = i as f64 * cell;
            let column = Rect { x: origin.x + offset, width: 1.0, ..origin };
            let row = Rect { y: origin.y + offset, height: 1.0, ..origin };
            fill_rect(image, &column, GRID_LINE);
            fill_rect(image, &row, GRID_LINE);
        }
    }

    let window = sheet.window(grid);
    for (r, row) in window.rows().iter().enumerate() {
        for (c, cell_value) in row.iter().enumerate() {
            let cx = origin.x + (c as f64 + 0.5) * cell;
            let cy = origin.y + (r as f64 + 0.5) * cell;
            match cell_value {
                Cell::Filled(bead) => {
                    let color = Rgba::from(Rgb::from_hex_lossy(&bead.hex));
                    fill_circle(image, cx, cy, cell * BEAD_RADIUS, color);
                }
                Cell::Empty => fill_circle(image, cx, cy, cell * PEG_RADIUS, PEG),
            }
        }
    }
}

fn draw_thumbnail(image: &mut RgbaImage, grid: &Grid, layout: &SheetLayout) {
    let thumb = &layout.thumbnail;
    let cell = thumb.cell_size;

    for bead in grid.beads() {
        let color = Rgba::from(Rgb::from_hex_lossy(&bead.hex));
        let x = thumb.rect.x + bead.x as f64 * cell;
        let y = thumb.rect.y + bead.y as f64 * cell;
        let radius = cell * THUMB_DOT_RADIUS;
        match thumb.style {
            ThumbnailStyle::Dots if radius >= 0.5 => {
                fill_circle(image, x + cell / 2.0, y + cell / 2.0, radius, color)
            }
            _ => fill_rect(image, &Rect { x, y, width: cell, height: cell }, color),
        }
    }

    for stroke in &thumb.highlight.strokes {
        stroke_rect(image, &thumb.highlight.rect, stroke);
    }
}

fn draw_legend(image: &mut RgbaImage, layout: &SheetLayout) {
    let max_count = layout.legend.entries.iter().map(|e| e.color.count).max().unwrap_or(0);
    if max_count == 0 {
        return;
    }

    for entry in &layout.legend.entries {
        let rect = entry.rect;
        let pad = rect.height * 0.1;
        let side = rect.height - 2.0 * pad;
        if side <= 0.0 {
            continue;
        }
        let swatch = Rect { x: rect.x + pad, y: rect.y + pad, width: side, height: side };
        fill_rect(image, &swatch, Rgba::from(Rgb::from_hex_lossy(&entry.color.hex)));
        let border = Stroke { color: Rgb::BLACK, width: 1.0, dash: None };
        stroke_rect_with(image, &swatch, &border, SWATCH_BORDER);

        let bar_x = swatch.right() + pad;
        let bar_room = rect.right() - pad - bar_x;
        if bar_room > 0.0 {
            let share = entry.color.count as f64 / max_count as f64;
            let bar = Rect {
                x: bar_x,
                y: rect.y + rect.height * 0.35,
                width: bar_room * share,
                height: rect.height * 0.3,
            };
            fill_rect(image, &bar, COUNT_BAR);
        }
    }
}

/// Pixel indices covering `[start, end)`, clipped to `0..limit`.
fn span(start: f64, end: f64, limit: u32) -> Range<u32> {
    let clamp = |v: f64| v.round().clamp(0.0, limit as f64) as u32;
    clamp(start)..clamp(end)
}

fn fill_rect(image: &mut RgbaImage, rect: &Rect, color: Rgba<u8>) {
    for y in span(rect.y, rect.bottom(), image.height()) {
        for x in span(rect.x, rect.right(), image.width()) {
            image.put_pixel(x, y, color);
        }
    }
}

fn fill_circle(image: &mut RgbaImage, cx: f64, cy: f64, radius: f64, color: Rgba<u8>) {
    let r2 = radius * radius;
    for y in span(cy - radius, cy + radius, image.height()) {
        for x in span(cx - radius, cx + radius, image.width()) {
            let (dx, dy) = (x as f64 + 0.5 - cx, y as f64 + 0.5 - cy);
            if dx * dx + dy * dy <= r2 {
                image.put_pixel(x, y, color);
            }
        }
    }
}

fn stroke_rect(image: &mut RgbaImage, rect: &Rect, stroke: &Stroke) {
    stroke_rect_with(image, rect, stroke, Rgba::from(stroke.color));
}

/// Draw the border of `rect` inside its bounds. Dashes restart at the start
/// of each edge.
fn stroke_rect_with(image: &mut RgbaImage, rect: &Rect, stroke: &Stroke, color: Rgba<u8>) {
    let w = stroke.width.max(1.0);
    let on = |pos: u32| match stroke.dash {
        Some([dash, gap]) if dash + gap > 0.0 => (pos as f64) % (dash + gap) < dash,
        _ => true,
    };

    let xs = span(rect.x, rect.right(), image.width());
    let ys = span(rect.y, rect.bottom(), image.height());
    let top = span(rect.y, rect.y + w, image.height());
    let bottom = span(rect.bottom() - w, rect.bottom(), image.height());
    let left = span(rect.x, rect.x + w, image.width());
    let right = span(rect.right() - w, rect.right(), image.width());

    for x in xs.clone() {
        if !on(x - xs.start) {
            continue;
        }
        for y in top.clone().chain(bottom.clone()) {
            image.put_pixel(x, y, color);
        }
    }
    for y in ys.clone() {
        if !on(y - ys.start) {
            continue;
        }
        for x in left.clone().chain(right.clone()) {
            image.put_pixel(x, y, color);
        }
    }
}
