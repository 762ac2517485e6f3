//! Print layout for pattern sheets.
//!
//! For one sheet of an `N x N` tiling this computes, in output pixel space:
//! - the grid rectangle (largest square that fits the page)
//! - a thumbnail of the whole pattern with the current sheet highlighted
//! - a legend listing the colors used on this sheet
//! - ruler labels along the top and left edges of the grid
//!
//! Layouts are pure geometry; [`crate::render`] or any other rasterizer can
//! draw them.

mod legend;
mod sheet;

pub use legend::{
    fit_legend, LegendFit, DEFAULT_MAX_COLUMNS, MAX_ITEM_ASPECT, MAX_ITEM_HEIGHT, MIN_ITEM_WIDTH,
};
pub use sheet::{column_label, sheets, Sheet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::Rgb;
use crate::grid::{ColorCount, Grid};

/// Patterns wider than this many cells use squares instead of dots in the
/// thumbnail.
pub const THUMBNAIL_DOT_LIMIT: usize = 64;

/// Error type for layout failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("block size must be at least 1")]
    ZeroBlockSize,
    #[error("partitions must be at least 1")]
    ZeroPartitions,
    #[error("sheet {index} does not exist; the pattern has {count} sheets")]
    SheetOutOfRange { index: usize, count: usize },
    #[error("grid is {width}x{height}, expected {expected}x{expected}")]
    GridSizeMismatch { expected: usize, width: usize, height: usize },
    #[error("{partitions} partitions of {block_size} cells is too large a grid")]
    SizeOverflow { block_size: usize, partitions: usize },
    #[error("page {width}x{height} has no room inside a margin of {margin}")]
    PageTooSmall { width: f64, height: f64, margin: f64 },
}

/// An axis-aligned rectangle in output pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// True when the interiors of the two rectangles overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// True when `other` lies entirely inside `self` (with a small tolerance
    /// for rounding).
    pub fn contains(&self, other: &Rect) -> bool {
        const EPS: f64 = 1e-6;
        other.x >= self.x - EPS
            && other.y >= self.y - EPS
            && other.right() <= self.right() + EPS
            && other.bottom() <= self.bottom() + EPS
    }
}

/// Where the thumbnail and legend go relative to the grid.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Grid on top; thumbnail bottom-left, legend bottom-right.
    #[default]
    Tall,
    /// Grid on the left; thumbnail top-right, legend below it.
    Wide,
}

/// Output page geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSpec {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    pub orientation: Orientation,
    pub max_legend_columns: usize,
}

impl Default for PageSpec {
    fn default() -> Self {
        // A4 at 300 dpi
        Self {
            width: 2480.0,
            height: 3508.0,
            margin: 80.0,
            orientation: Orientation::Tall,
            max_legend_columns: DEFAULT_MAX_COLUMNS,
        }
    }
}

/// How the thumbnail draws cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThumbnailStyle {
    Dots,
    Squares,
}

/// One outline pass of the sheet highlight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stroke {
    pub color: Rgb,
    pub width: f64,
    /// Dash and gap lengths; `None` for a solid line
    pub dash: Option<[f64; 2]>,
}

/// Marks the current sheet inside the thumbnail. Drawn as a solid dark stroke
/// followed by a dashed light stroke so it shows on any background.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Highlight {
    pub rect: Rect,
    pub strokes: [Stroke; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Thumbnail {
    pub rect: Rect,
    pub cell_size: f64,
    pub style: ThumbnailStyle,
    pub highlight: Highlight,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    #[serde(flatten)]
    pub color: ColorCount,
    pub rect: Rect,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Legend {
    pub rect: Rect,
    pub fit: LegendFit,
    pub entries: Vec<LegendEntry>,
}

/// A label centred on `(x, y)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisLabel {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

/// Column letters above the grid and 1-based row numbers to its left, both
/// counted across the whole pattern.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Rulers {
    pub columns: Vec<AxisLabel>,
    pub rows: Vec<AxisLabel>,
}

/// Complete geometry for one sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetLayout {
    pub sheet: Sheet,
    pub label: String,
    pub grid: Rect,
    pub cell_size: f64,
    pub thumbnail: Thumbnail,
    pub legend: Legend,
    pub rulers: Rulers,
}

/// Lay out sheet `index` of `grid`, which must be
/// `partitions * block_size` cells on each side.
pub fn layout_sheet(
    grid: &Grid,
    block_size: usize,
    partitions: usize,
    page: &PageSpec,
    index: usize,
) -> Result<SheetLayout, LayoutError> {
    let count = check_grid(grid, block_size, partitions)?;
    let sheet = Sheet::new(index, partitions, block_size)
        .ok_or(LayoutError::SheetOutOfRange { index, count })?;

    let regions = page_regions(page)?;
    let cell_size = regions.grid.width / block_size as f64;

    let thumbnail = thumbnail(grid.width(), &sheet, regions.thumbnail);
    let legend = legend(&sheet.window(grid), regions.legend, page.max_legend_columns);
    let rulers = rulers(&sheet, &regions.grid, cell_size, page.margin);

    tracing::debug!(
        sheet = %sheet.label(),
        side = regions.grid.width,
        legend_columns = legend.fit.columns,
        legend_items = legend.entries.len(),
        "laid out sheet"
    );

    Ok(SheetLayout {
        label: sheet.label(),
        sheet,
        grid: regions.grid,
        cell_size,
        thumbnail,
        legend,
        rulers,
    })
}

/// Lay out every sheet in index order.
pub fn layout_all(
    grid: &Grid,
    block_size: usize,
    partitions: usize,
    page: &PageSpec,
) -> Result<Vec<SheetLayout>, LayoutError> {
    let count = check_grid(grid, block_size, partitions)?;
    (0..count).map(|index| layout_sheet(grid, block_size, partitions, page, index)).collect()
}

/// Returns the number of sheets.
fn check_grid(grid: &Grid, block_size: usize, partitions: usize) -> Result<usize, LayoutError> {
    if block_size == 0 {
        return Err(LayoutError::ZeroBlockSize);
    }
    if partitions == 0 {
        return Err(LayoutError::ZeroPartitions);
    }
    let overflow = LayoutError::SizeOverflow { block_size, partitions };
    let expected = block_size.checked_mul(partitions).ok_or_else(|| overflow.clone())?;
    let count = partitions.checked_mul(partitions).ok_or(overflow)?;
    if grid.width() != expected || grid.height() != expected {
        return Err(LayoutError::GridSizeMismatch {
            expected,
            width: grid.width(),
            height: grid.height(),
        });
    }
    Ok(count)
}

/// Page split into the three content areas.
#[derive(Debug, Clone, Copy)]
struct Regions {
    grid: Rect,
    thumbnail: Rect,
    legend: Rect,
}

/// The thumbnail side is a third of the grid side; the space between areas
/// is half the margin.
fn page_regions(page: &PageSpec) -> Result<Regions, LayoutError> {
    let safe = Rect {
        x: page.margin,
        y: page.margin,
        width: page.width - 2.0 * page.margin,
        height: page.height - 2.0 * page.margin,
    };
    let gap = page.margin / 2.0;
    if safe.width <= 0.0 || safe.height <= gap {
        return Err(LayoutError::PageTooSmall {
            width: page.width,
            height: page.height,
            margin: page.margin,
        });
    }

    let regions = match page.orientation {
        Orientation::Tall => {
            let side = safe.width.min((safe.height - gap) * 0.75).floor();
            let thumb = side / 3.0;
            let grid = Rect {
                x: safe.x + (safe.width - side) / 2.0,
                y: safe.y,
                width: side,
                height: side,
            };
            let strip_y = grid.bottom() + gap;
            let strip_height = safe.bottom() - strip_y;
            Regions {
                grid,
                thumbnail: Rect { x: grid.x, y: strip_y, width: thumb, height: thumb },
                legend: Rect {
                    x: grid.x + thumb + gap,
                    y: strip_y,
                    width: (side - thumb - gap).max(0.0),
                    height: strip_height.max(0.0),
                },
            }
        }
        Orientation::Wide => {
            let side = safe.height.min((safe.width - gap) * 0.75).floor();
            let thumb = side / 3.0;
            let grid = Rect { x: safe.x, y: safe.y, width: side, height: side };
            let column_x = grid.right() + gap;
            let thumbnail =
                Rect { x: safe.right() - thumb, y: grid.y, width: thumb, height: thumb };
            let legend_y = thumbnail.bottom() + gap;
            Regions {
                grid,
                thumbnail,
                legend: Rect {
                    x: column_x,
                    y: legend_y,
                    width: (safe.right() - column_x).max(0.0),
                    height: (grid.bottom() - legend_y).max(0.0),
                },
            }
        }
    };
    Ok(regions)
}

fn thumbnail(full_side: usize, sheet: &Sheet, rect: Rect) -> Thumbnail {
    let cell_size = rect.width / full_side.max(1) as f64;
    let style = if full_side > THUMBNAIL_DOT_LIMIT {
        ThumbnailStyle::Squares
    } else {
        ThumbnailStyle::Dots
    };
    let span = sheet.size as f64 * cell_size;
    let stroke_width = (rect.width / 120.0).max(1.0);

    Thumbnail {
        rect,
        cell_size,
        style,
        highlight: Highlight {
            rect: Rect {
                x: rect.x + sheet.x as f64 * cell_size,
                y: rect.y + sheet.y as f64 * cell_size,
                width: span,
                height: span,
            },
            strokes: [
                Stroke { color: Rgb::BLACK, width: stroke_width, dash: None },
                Stroke {
                    color: Rgb::WHITE,
                    width: stroke_width,
                    dash: Some([stroke_width * 3.0, stroke_width * 3.0]),
                },
            ],
        },
    }
}

fn legend(window: &Grid, rect: Rect, max_columns: usize) -> Legend {
    let counts = window.count_colors();
    let fit = fit_legend(rect.width, rect.height, counts.len(), max_columns);
    let entries = counts
        .into_iter()
        .enumerate()
        .map(|(i, color)| LegendEntry { rect: fit.item_rect(&rect, i), color })
        .collect();
    Legend { rect, fit, entries }
}

fn rulers(sheet: &Sheet, grid: &Rect, cell_size: f64, margin: f64) -> Rulers {
    let offset = cell_size.min(margin) / 2.0;
    let columns = (0..sheet.size)
        .map(|c| AxisLabel {
            text: column_label(sheet.x + c),
            x: grid.x + (c as f64 + 0.5) * cell_size,
            y: grid.y - offset,
        })
        .collect();
    let rows = (0..sheet.size)
        .map(|r| AxisLabel {
            text: (sheet.y + r + 1).to_string(),
            x: grid.x - offset,
            y: grid.y + (r as f64 + 0.5) * cell_size,
        })
        .collect();
    Rulers { columns, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::test_support::{grid_from_art, letters_palette};

    fn page(orientation: Orientation) -> PageSpec {
        PageSpec { orientation, ..PageSpec::default() }
    }

    fn safe_area(page: &PageSpec) -> Rect {
        Rect {
            x: page.margin,
            y: page.margin,
            width: page.width - 2.0 * page.margin,
            height: page.height - 2.0 * page.margin,
        }
    }

    fn sample_grid() -> Grid {
        let palette = letters_palette();
        grid_from_art(&palette, &["RRGG", "RRGB", "XX..", "XYZZ"])
    }

    #[test]
    fn test_regions_do_not_overlap_and_fit_page() {
        for orientation in [Orientation::Tall, Orientation::Wide] {
            let page = page(orientation);
            let layout = layout_sheet(&sample_grid(), 2, 2, &page, 0).unwrap();
            let safe = safe_area(&page);
            assert!(safe.contains(&layout.grid), "{orientation:?}");
            assert!(safe.contains(&layout.thumbnail.rect), "{orientation:?}");
            assert!(safe.contains(&layout.legend.rect), "{orientation:?}");
            assert!(!layout.grid.overlaps(&layout.thumbnail.rect));
            assert!(!layout.grid.overlaps(&layout.legend.rect));
            assert!(!layout.thumbnail.rect.overlaps(&layout.legend.rect));
        }
    }

    #[test]
    fn test_grid_is_square_and_thumbnail_is_a_third() {
        let layout = layout_sheet(&sample_grid(), 2, 2, &PageSpec::default(), 0).unwrap();
        assert_eq!(layout.grid.width, layout.grid.height);
        assert!((layout.thumbnail.rect.width - layout.grid.width / 3.0).abs() < 1e-9);
        assert!((layout.cell_size - layout.grid.width / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_wide_thumbnail_is_right_aligned() {
        let page = page(Orientation::Wide);
        let layout = layout_sheet(&sample_grid(), 2, 2, &page, 0).unwrap();
        let safe = safe_area(&page);
        assert!((layout.thumbnail.rect.right() - safe.right()).abs() < 1e-9);
        assert!(layout.legend.rect.y > layout.thumbnail.rect.bottom());
    }

    #[test]
    fn test_tall_thumbnail_is_below_left() {
        let layout = layout_sheet(&sample_grid(), 2, 2, &page(Orientation::Tall), 0).unwrap();
        assert_eq!(layout.thumbnail.rect.x, layout.grid.x);
        assert!(layout.thumbnail.rect.y > layout.grid.bottom());
        assert!(layout.legend.rect.x > layout.thumbnail.rect.right());
    }

    #[test]
    fn test_legend_lists_only_sheet_colors() {
        let grid = sample_grid();
        let layout = layout_sheet(&grid, 2, 2, &PageSpec::default(), 3).unwrap();
        let codes: Vec<&str> =
            layout.legend.entries.iter().map(|e| e.color.code.as_str()).collect();
        assert_eq!(codes, vec!["Z"]);
        assert_eq!(layout.label, "B2");

        let layout = layout_sheet(&grid, 2, 2, &PageSpec::default(), 1).unwrap();
        let summary: Vec<(&str, usize)> =
            layout.legend.entries.iter().map(|e| (e.color.code.as_str(), e.color.count)).collect();
        assert_eq!(summary, vec![("G", 3), ("B", 1)]);
    }

    #[test]
    fn test_legend_entries_inside_legend_rect() {
        let layout = layout_sheet(&sample_grid(), 4, 1, &PageSpec::default(), 0).unwrap();
        assert_eq!(layout.legend.entries.len(), 6);
        for entry in &layout.legend.entries {
            assert!(layout.legend.rect.contains(&entry.rect), "{entry:?}");
        }
    }

    #[test]
    fn test_highlight_marks_sheet_region() {
        let layout = layout_sheet(&sample_grid(), 2, 2, &PageSpec::default(), 2).unwrap();
        let thumb = &layout.thumbnail;
        let half = thumb.rect.width / 2.0;
        assert!((thumb.highlight.rect.x - thumb.rect.x).abs() < 1e-9);
        assert!((thumb.highlight.rect.y - (thumb.rect.y + half)).abs() < 1e-9);
        assert!((thumb.highlight.rect.width - half).abs() < 1e-9);
        assert!(thumb.highlight.strokes[0].dash.is_none());
        assert!(thumb.highlight.strokes[1].dash.is_some());
        assert_ne!(thumb.highlight.strokes[0].color, thumb.highlight.strokes[1].color);
    }

    #[test]
    fn test_thumbnail_style_switches_on_size() {
        let small = Grid::new(64, 64);
        let layout = layout_sheet(&small, 32, 2, &PageSpec::default(), 0).unwrap();
        assert_eq!(layout.thumbnail.style, ThumbnailStyle::Dots);

        let large = Grid::new(66, 66);
        let layout = layout_sheet(&large, 33, 2, &PageSpec::default(), 0).unwrap();
        assert_eq!(layout.thumbnail.style, ThumbnailStyle::Squares);
    }

    #[test]
    fn test_rulers_use_global_indices() {
        let layout = layout_sheet(&Grid::new(60, 60), 30, 2, &PageSpec::default(), 1).unwrap();
        let first = &layout.rulers.columns[0];
        assert_eq!(first.text, "AE"); // column 30
        assert_eq!(layout.rulers.rows[0].text, "1");
        assert_eq!(layout.rulers.columns.len(), 30);
        assert!(first.y < layout.grid.y);
    }

    #[test]
    fn test_errors() {
        let grid = Grid::new(4, 4);
        let page = PageSpec::default();
        assert_eq!(
            layout_sheet(&grid, 2, 2, &page, 4),
            Err(LayoutError::SheetOutOfRange { index: 4, count: 4 })
        );
        assert_eq!(layout_sheet(&grid, 0, 2, &page, 0), Err(LayoutError::ZeroBlockSize));
        assert_eq!(layout_sheet(&grid, 2, 0, &page, 0), Err(LayoutError::ZeroPartitions));
        assert!(matches!(
            layout_sheet(&grid, 3, 2, &page, 0),
            Err(LayoutError::GridSizeMismatch { expected: 6, .. })
        ));
        let huge = 1usize << (usize::BITS / 2);
        assert_eq!(
            layout_all(&Grid::new(0, 0), huge, huge, &page),
            Err(LayoutError::SizeOverflow { block_size: huge, partitions: huge })
        );
        let tiny = PageSpec { width: 100.0, height: 100.0, margin: 60.0, ..page };
        assert!(matches!(
            layout_sheet(&grid, 2, 2, &tiny, 0),
            Err(LayoutError::PageTooSmall { .. })
        ));
    }

    #[test]
    fn test_layout_is_deterministic() {
        let grid = sample_grid();
        let a = layout_all(&grid, 2, 2, &PageSpec::default()).unwrap();
        let b = layout_all(&grid, 2, 2, &PageSpec::default()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 4);
    }
}
