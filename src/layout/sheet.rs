//! Sheet partitioning and labels.

use serde::Serialize;

use crate::grid::Grid;

/// One printable partition of the full grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Sheet {
    pub index: usize,
    /// Block row (0-based)
    pub row: usize,
    /// Block column (0-based)
    pub col: usize,
    /// Left edge of the sheet window in grid cells
    pub x: usize,
    /// Top edge of the sheet window in grid cells
    pub y: usize,
    /// Side length of the window in grid cells
    pub size: usize,
}

impl Sheet {
    /// Sheet `index` of a `partitions x partitions` tiling with square
    /// windows of `block_size` cells. `None` when the index is out of range
    /// or the tiling does not fit in `usize`.
    pub fn new(index: usize, partitions: usize, block_size: usize) -> Option<Self> {
        if index >= partitions.checked_mul(partitions)? {
            return None;
        }
        let (row, col) = (index / partitions, index % partitions);
        let x = col.checked_mul(block_size)?;
        let y = row.checked_mul(block_size)?;
        Some(Self { index, row, col, x, y, size: block_size })
    }

    /// Row letter plus 1-based column number, e.g. `A1`, `B3`.
    pub fn label(&self) -> String {
        format!("{}{}", column_label(self.row), self.col + 1)
    }

    /// The cells of `grid` covered by this sheet.
    pub fn window(&self, grid: &Grid) -> Grid {
        grid.window(self.x, self.y, self.size, self.size)
    }
}

/// All sheets of a tiling in index order. Empty if the sheet count overflows.
pub fn sheets(partitions: usize, block_size: usize) -> Vec<Sheet> {
    let count = partitions.checked_mul(partitions).unwrap_or(0);
    (0..count).filter_map(|i| Sheet::new(i, partitions, block_size)).collect()
}

/// Spreadsheet-style label for a 0-based index: A..Z, AA..AZ, BA, ...
///
/// Bijective base-26, so there is no zero digit.
///
/// ```
/// use beadsheet::layout::column_label;
///
/// assert_eq!(column_label(0), "A");
/// assert_eq!(column_label(25), "Z");
/// assert_eq!(column_label(26), "AA");
/// assert_eq!(column_label(701), "ZZ");
/// assert_eq!(column_label(702), "AAA");
/// ```
pub fn column_label(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.iter().rev().map(|&b| b as char).collect()
}
