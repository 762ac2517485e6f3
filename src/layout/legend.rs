//! Legend (bill of materials) column fitting.
//!
//! Tries every column count up to a maximum and keeps the one that gives the
//! tallest items. Items are capped in height, may not be taller than a
//! quarter of their slot width, and need a minimum slot width to be readable.

use serde::Serialize;

use super::Rect;

/// Narrowest usable legend slot.
pub const MIN_ITEM_WIDTH: f64 = 60.0;
/// Tallest legend item.
pub const MAX_ITEM_HEIGHT: f64 = 140.0;
/// Item height may not exceed slot width divided by this.
pub const MAX_ITEM_ASPECT: f64 = 4.0;
/// Default upper bound on legend columns.
pub const DEFAULT_MAX_COLUMNS: usize = 6;

/// Chosen legend configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LegendFit {
    pub columns: usize,
    pub rows: usize,
    pub item_width: f64,
    pub item_height: f64,
    /// False when no column count met the minimum slot width and the best
    /// remaining configuration was used instead.
    pub fits: bool,
}

impl LegendFit {
    /// Rectangle of item `i` (row-major) inside `area`.
    pub fn item_rect(&self, area: &Rect, i: usize) -> Rect {
        let columns = self.columns.max(1);
        let (row, col) = (i / columns, i % columns);
        Rect {
            x: area.x + col as f64 * self.item_width,
            y: area.y + row as f64 * self.item_height,
            width: self.item_width,
            height: self.item_height,
        }
    }
}

/// Pick the column count for `items` entries in a `width x height` area.
pub fn fit_legend(width: f64, height: f64, items: usize, max_columns: usize) -> LegendFit {
    let width = width.max(0.0);
    let height = height.max(0.0);
    if items == 0 {
        return LegendFit { columns: 1, rows: 0, item_width: width, item_height: 0.0, fits: true };
    }

    let limit = max_columns.clamp(1, items);
    let mut best_fitting: Option<LegendFit> = None;
    let mut best_any: Option<LegendFit> = None;

    for columns in 1..=limit {
        let rows = items.div_ceil(columns);
        let item_width = width / columns as f64;
        let item_height = (height / rows as f64)
            .min(item_width / MAX_ITEM_ASPECT)
            .min(MAX_ITEM_HEIGHT);
        let fits = item_width >= MIN_ITEM_WIDTH;
        let candidate = LegendFit { columns, rows, item_width, item_height, fits };

        let slot = if fits { &mut best_fitting } else { &mut best_any };
        if slot.map_or(true, |b| candidate.item_height > b.item_height) {
            *slot = Some(candidate);
        }
    }

    match (best_fitting, best_any) {
        (Some(fit), _) => fit,
        (None, Some(fallback)) => {
            tracing::warn!(
                width,
                items,
                columns = fallback.columns,
                "legend slots are narrower than {MIN_ITEM_WIDTH}; using best available layout"
            );
            fallback
        }
        (None, None) => {
            LegendFit { columns: 1, rows: items, item_width: width, item_height: 0.0, fits: false }
        }
    }
}
