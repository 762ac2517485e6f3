//! Outline growth by binary dilation.
//!
//! Each pass fills every empty cell that touches a filled cell (8-connected)
//! with the outline color. Neighbors are read from the previous pass only, so
//! one pass adds exactly one ring.

use crate::grid::{Bead, Cell, Grid};
use crate::palette::PaletteColor;

/// Grow the filled region of `grid` by `width` rings of `outline`.
///
/// `width == 0` and grids without filled cells come back unchanged.
pub fn grow_outline(grid: &Grid, width: usize, outline: &PaletteColor) -> Grid {
    if width == 0 || grid.is_blank() {
        return grid.clone();
    }

    let mut current = grid.clone();
    for pass in 0..width {
        let (next, added) = dilate_once(&current, outline);
        tracing::debug!(pass, added, "outline pass");
        current = next;
        if added == 0 {
            break;
        }
    }
    current
}

fn dilate_once(snapshot: &Grid, outline: &PaletteColor) -> (Grid, usize) {
    let (w, h) = (snapshot.width(), snapshot.height());
    let mut next = snapshot.clone();
    let mut added = 0;

    for y in 0..h {
        for x in 0..w {
            if snapshot.rows()[y][x].is_filled() {
                continue;
            }
            if has_filled_neighbor(snapshot, x, y) {
                next.rows_mut()[y][x] = Cell::Filled(Bead::new(outline, x, y));
                added += 1;
            }
        }
    }
    (next, added)
}

/// Check the up-to-8 neighbors of `(x, y)`, clamped at the grid edges.
fn has_filled_neighbor(grid: &Grid, x: usize, y: usize) -> bool {
    let rows = grid.rows();
    let y_range = y.saturating_sub(1)..=(y + 1).min(grid.height() - 1);
    for ny in y_range {
        let x_range = x.saturating_sub(1)..=(x + 1).min(grid.width() - 1);
        for nx in x_range {
            if (nx, ny) != (x, y) && rows[ny][nx].is_filled() {
                return true;
            }
        }
    }
    false
}
