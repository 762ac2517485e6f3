//! Criterion benchmarks for beadsheet critical paths
//!
//! Benchmarks the core performance-critical operations:
//! - Quantize: pixel to palette mapping
//! - Reduce: agglomerative color-budget merging
//! - Outline: multi-pass dilation
//! - Layout: sheet geometry and legend fitting
//! - Render: sheet rasterization

use beadsheet::layout::{fit_legend, layout_sheet, PageSpec};
use beadsheet::outline::grow_outline;
use beadsheet::palettes::get_builtin;
use beadsheet::quantize::{quantize, DEFAULT_ALPHA_THRESHOLD};
use beadsheet::reduce::reduce_colors;
use beadsheet::render::render_sheet;
use beadsheet::{Grid, Palette};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use image::{Rgba, RgbaImage};

// =============================================================================
// Test Data Generators
// =============================================================================

/// A smooth gradient that touches most palette colors
fn make_gradient(size: u32) -> RgbaImage {
    RgbaImage::from_fn(size, size, |x, y| {
        let r = (x * 255 / size.max(1)) as u8;
        let g = (y * 255 / size.max(1)) as u8;
        let b = ((x + y) * 127 / size.max(1)) as u8;
        Rgba([r, g, b, 255])
    })
}

fn basic_palette() -> Palette {
    get_builtin("basic").expect("basic palette exists")
}

fn make_grid(size: u32) -> Grid {
    quantize(&make_gradient(size), &basic_palette(), None, DEFAULT_ALPHA_THRESHOLD)
}

/// A filled disc in the middle of an otherwise empty image
fn make_disc(size: u32) -> Grid {
    let c = size as f64 / 2.0;
    let image = RgbaImage::from_fn(size, size, |x, y| {
        let (dx, dy) = (x as f64 - c, y as f64 - c);
        if dx * dx + dy * dy < (c / 2.0) * (c / 2.0) {
            Rgba([200, 30, 40, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    });
    quantize(&image, &basic_palette(), None, DEFAULT_ALPHA_THRESHOLD)
}

// =============================================================================
// Benchmarks
// =============================================================================

fn bench_quantize(c: &mut Criterion) {
    let mut group = c.benchmark_group("quantize");
    let palette = basic_palette();

    for size in [29u32, 58, 116].iter() {
        let image = make_gradient(*size);
        group.throughput(Throughput::Elements((*size * *size) as u64));
        group.bench_with_input(BenchmarkId::new("gradient", size), &image, |b, image| {
            b.iter(|| quantize(black_box(image), &palette, None, DEFAULT_ALPHA_THRESHOLD))
        });
    }

    group.finish();
}

fn bench_reduce(c: &mut Criterion) {
    let mut group = c.benchmark_group("reduce");
    let palette = basic_palette();
    let grid = make_grid(116);

    for budget in [16usize, 8, 2].iter() {
        group.bench_with_input(BenchmarkId::new("to_budget", budget), budget, |b, &budget| {
            b.iter(|| reduce_colors(black_box(&grid), budget, &palette))
        });
    }

    group.finish();
}

fn bench_outline(c: &mut Criterion) {
    let mut group = c.benchmark_group("outline");
    let palette = basic_palette();
    let outline = palette.get("H7").expect("H7 exists").clone();
    let grid = make_disc(116);

    for width in [1usize, 3].iter() {
        group.bench_with_input(BenchmarkId::new("disc_116", width), width, |b, &width| {
            b.iter(|| grow_outline(black_box(&grid), width, &outline))
        });
    }

    group.finish();
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    let grid = make_grid(87);
    let page = PageSpec::default();

    group.bench_function("layout_sheet_3x3", |b| {
        b.iter(|| layout_sheet(black_box(&grid), 29, 3, &page, 4))
    });
    group.bench_function("fit_legend_24", |b| {
        b.iter(|| fit_legend(black_box(1500.0), black_box(900.0), 24, 6))
    });

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    group.sample_size(20);
    let grid = make_grid(29);
    let page = PageSpec { width: 1240.0, height: 1754.0, margin: 40.0, ..PageSpec::default() };
    let layout = layout_sheet(&grid, 29, 1, &page, 0).expect("layout fits");

    group.bench_function("render_sheet_half_a4", |b| {
        b.iter(|| render_sheet(black_box(&grid), &layout, &page))
    });

    group.finish();
}

criterion_group!(benches, bench_quantize, bench_reduce, bench_outline, bench_layout, bench_render);
criterion_main!(benches);
