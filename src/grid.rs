//! Bead grids: rectangular rows of empty or filled cells.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::palette::PaletteColor;

/// Error type for grid construction
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    /// A row has a different length from the first row
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow { row: usize, expected: usize, found: usize },
}

/// A filled grid position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bead {
    pub code: String,
    pub hex: String,
    pub x: usize,
    pub y: usize,
}

impl Bead {
    pub fn new(color: &PaletteColor, x: usize, y: usize) -> Self {
        Self { code: color.code.clone(), hex: color.hex.clone(), x, y }
    }
}

/// One grid position. Serializes as `null` when empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Empty,
    Filled(Bead),
}

impl Cell {
    pub fn is_filled(&self) -> bool {
        matches!(self, Cell::Filled(_))
    }

    pub fn bead(&self) -> Option<&Bead> {
        match self {
            Cell::Filled(bead) => Some(bead),
            Cell::Empty => None,
        }
    }
}

/// Occurrence count of one color in a grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorCount {
    pub code: String,
    pub hex: String,
    pub count: usize,
}

/// A rectangular, row-major grid of cells.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Cell>>", into = "Vec<Vec<Cell>>")]
pub struct Grid {
    rows: Vec<Vec<Cell>>,
}

impl Grid {
    /// An all-empty grid.
    pub fn new(width: usize, height: usize) -> Self {
        Self { rows: vec![vec![Cell::Empty; width]; height] }
    }

    /// Build a grid from rows, rejecting rows of unequal length.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Result<Self, GridError> {
        if let Some(first) = rows.first() {
            let expected = first.len();
            if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != expected) {
                return Err(GridError::RaggedRow { row, expected, found: r.len() });
            }
        }
        Ok(Self { rows })
    }

    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&Cell> {
        self.rows.get(y).and_then(|row| row.get(x))
    }

    /// Fill `(x, y)` with `color`. Out-of-range positions are ignored.
    pub fn fill(&mut self, x: usize, y: usize, color: &PaletteColor) {
        if let Some(cell) = self.rows.get_mut(y).and_then(|row| row.get_mut(x)) {
            *cell = Cell::Filled(Bead::new(color, x, y));
        }
    }

    pub fn beads(&self) -> impl Iterator<Item = &Bead> {
        self.rows.iter().flatten().filter_map(Cell::bead)
    }

    pub fn filled_count(&self) -> usize {
        self.beads().count()
    }

    /// True when the grid has no filled cells.
    pub fn is_blank(&self) -> bool {
        self.beads().next().is_none()
    }

    /// Count colors, most frequent first. Equal counts keep row-major
    /// first-appearance order.
    pub fn count_colors(&self) -> Vec<ColorCount> {
        count_beads(self.beads())
    }

    /// Number of distinct codes in use.
    pub fn distinct_colors(&self) -> usize {
        self.count_colors().len()
    }

    /// Copy of the `width x height` window whose top-left corner is `(x, y)`,
    /// clipped to the grid. Beads keep their full-grid coordinates.
    pub fn window(&self, x: usize, y: usize, width: usize, height: usize) -> Grid {
        let rows = self
            .rows
            .iter()
            .skip(y)
            .take(height)
            .map(|row| row.iter().skip(x).take(width).cloned().collect())
            .collect();
        Grid { rows }
    }

    pub(crate) fn rows_mut(&mut self) -> &mut [Vec<Cell>] {
        &mut self.rows
    }
}

impl TryFrom<Vec<Vec<Cell>>> for Grid {
    type Error = GridError;

    fn try_from(rows: Vec<Vec<Cell>>) -> Result<Self, Self::Error> {
        Grid::from_rows(rows)
    }
}

impl From<Grid> for Vec<Vec<Cell>> {
    fn from(grid: Grid) -> Self {
        grid.rows
    }
}

/// Aggregate beads into counts sorted by descending count.
pub fn count_beads<'a>(beads: impl Iterator<Item = &'a Bead>) -> Vec<ColorCount> {
    let mut order: Vec<ColorCount> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();

    for bead in beads {
        match slots.get(bead.code.as_str()) {
            Some(&i) => order[i].count += 1,
            None => {
                slots.insert(bead.code.as_str(), order.len());
                order.push(ColorCount { code: bead.code.clone(), hex: bead.hex.clone(), count: 1 });
            }
        }
    }

    // Stable sort keeps first-appearance order among ties.
    order.sort_by(|a, b| b.count.cmp(&a.count));
    order
}
