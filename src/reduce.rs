//! Color-budget reduction.
//!
//! [`reduce_colors`] merges the two closest in-use colors until the grid uses
//! at most `max_colors` codes. The less frequent color of each pair is always
//! absorbed into the more frequent one, so dominant colors survive unchanged.
//!
//! [`merge_rare_colors`] is the threshold variant: every color used fewer
//! than `threshold` times moves to its nearest sufficiently common color.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::grid::{Cell, ColorCount, Grid};
use crate::palette::Palette;

/// One absorption step: `from` was merged into `into`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Merge {
    pub from: String,
    pub into: String,
    /// Tracked count of `from` before the merge
    pub from_count: usize,
    /// Tracked count of `into` before the merge
    pub into_count: usize,
}

/// Result of a reduction pass.
#[derive(Debug, Clone)]
pub struct Reduction {
    pub grid: Grid,
    /// Merge steps in the order they were applied. Empty when nothing changed.
    pub merges: Vec<Merge>,
}

impl Reduction {
    fn unchanged(grid: &Grid) -> Self {
        Self { grid: grid.clone(), merges: Vec::new() }
    }

    pub fn is_noop(&self) -> bool {
        self.merges.is_empty()
    }
}

/// Reduce `grid` to at most `max_colors` distinct codes.
///
/// Grids already within budget come back unchanged. Callers are expected to
/// pass `max_colors >= 1`; with 0 the pass stops once a single color remains.
pub fn reduce_colors(grid: &Grid, max_colors: usize, palette: &Palette) -> Reduction {
    let counts = grid.count_colors();
    if counts.len() <= max_colors {
        return Reduction::unchanged(grid);
    }

    let n = counts.len();
    let colors: Vec<Rgb> = counts.iter().map(|c| color_of(c, palette)).collect();
    let distances = DistanceTable::new(&colors, palette);
    let mut tally: Vec<usize> = counts.iter().map(|c| c.count).collect();
    let mut active = vec![true; n];
    let mut remaining = n;
    let mut successor: Vec<Option<usize>> = vec![None; n];
    let mut merges = Vec::new();

    while remaining > max_colors {
        let Some((i, j)) = distances.closest_active_pair(&active) else {
            tracing::warn!(remaining, max_colors, "no mergeable pair left; stopping early");
            break;
        };

        // Pairs come back with i < j, so equal tallies keep the earlier color.
        let (survivor, victim) = if tally[j] > tally[i] { (j, i) } else { (i, j) };
        tracing::debug!(
            from = %counts[victim].code,
            into = %counts[survivor].code,
            distance = distances.get(i, j),
            "merging colors"
        );
        merges.push(Merge {
            from: counts[victim].code.clone(),
            into: counts[survivor].code.clone(),
            from_count: tally[victim],
            into_count: tally[survivor],
        });

        tally[survivor] += tally[victim];
        active[victim] = false;
        successor[victim] = Some(survivor);
        remaining -= 1;
    }

    let mut mapping = HashMap::new();
    for start in 0..n {
        let end = resolve_chain(&successor, start);
        if end != start {
            mapping.insert(counts[start].code.clone(), &counts[end]);
        }
    }

    Reduction { grid: remap(grid, &mapping, palette), merges }
}

/// Merge every color used fewer than `threshold` times into the nearest color
/// used at least `threshold` times.
///
/// Does nothing when `threshold` is 0, when no color is rare, or when every
/// color is rare.
pub fn merge_rare_colors(grid: &Grid, threshold: usize, palette: &Palette) -> Reduction {
    if threshold == 0 {
        return Reduction::unchanged(grid);
    }

    let counts = grid.count_colors();
    let (common, rare): (Vec<&ColorCount>, Vec<&ColorCount>) =
        counts.iter().partition(|c| c.count >= threshold);
    if common.is_empty() || rare.is_empty() {
        return Reduction::unchanged(grid);
    }

    let keep: Vec<String> = common.iter().map(|c| c.code.clone()).collect();
    let mut mapping = HashMap::new();
    let mut merges = Vec::new();

    for victim in rare {
        let Some(target) = palette.find_nearest_in_palette(&victim.code, &keep) else {
            tracing::warn!(code = %victim.code, "rare color is not in the palette; keeping it");
            continue;
        };
        let Some(survivor) = common.iter().find(|c| c.code == target.code) else {
            continue;
        };
        merges.push(Merge {
            from: victim.code.clone(),
            into: survivor.code.clone(),
            from_count: victim.count,
            into_count: survivor.count,
        });
        mapping.insert(victim.code.clone(), *survivor);
    }

    Reduction { grid: remap(grid, &mapping, palette), merges }
}

/// Follow victim -> survivor links to the final survivor.
///
/// Every link points at a color that was still active when the link was made,
/// so a chain can never be longer than the number of colors.
fn resolve_chain(successor: &[Option<usize>], start: usize) -> usize {
    let mut current = start;
    for _ in 0..successor.len() {
        match successor[current] {
            Some(next) => current = next,
            None => break,
        }
    }
    current
}

/// Rewrite beads whose code appears in `mapping`; all other cells are copied
/// as they are. The new hex comes from the palette, not from the grid.
fn remap(grid: &Grid, mapping: &HashMap<String, &ColorCount>, palette: &Palette) -> Grid {
    let mut out = grid.clone();
    if mapping.is_empty() {
        return out;
    }
    let targets: HashMap<&str, (&str, &str)> = mapping
        .iter()
        .map(|(from, target)| {
            let hex = palette.get(&target.code).map_or(target.hex.as_str(), |c| c.hex.as_str());
            (from.as_str(), (target.code.as_str(), hex))
        })
        .collect();
    for cell in out.rows_mut().iter_mut().flatten() {
        if let Cell::Filled(bead) = cell {
            if let Some(&(code, hex)) = targets.get(bead.code.as_str()) {
                bead.code = code.to_string();
                bead.hex = hex.to_string();
            }
        }
    }
    out
}

fn color_of(count: &ColorCount, palette: &Palette) -> Rgb {
    palette.get(&count.code).map_or_else(|| Rgb::from_hex_lossy(&count.hex), |c| c.rgb)
}

/// Upper-triangular pairwise distance table.
struct DistanceTable {
    n: usize,
    values: Vec<f64>,
}

impl DistanceTable {
    fn new(colors: &[Rgb], palette: &Palette) -> Self {
        let n = colors.len();
        let mut values = vec![0.0; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                values[i * n + j] = palette.distance(colors[i], colors[j]);
            }
        }
        Self { n, values }
    }

    fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.n + j]
    }

    /// Closest pair of active colors, scanning `(i, j)` with `i < j` in
    /// index order; the first pair at the minimum distance wins.
    fn closest_active_pair(&self, active: &[bool]) -> Option<(usize, usize)> {
        let mut best = None;
        let mut best_distance = f64::INFINITY;
        for i in (0..self.n).filter(|&i| active[i]) {
            for j in ((i + 1)..self.n).filter(|&j| active[j]) {
                let d = self.get(i, j);
                if d < best_distance {
                    best_distance = d;
                    best = Some((i, j));
                }
            }
        }
        best
    }
}
