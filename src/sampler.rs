// Pixel sampling: turns the raw RGBA frame into a per-cell brightness grid.
//
// Each cell is sampled at four fixed sub-positions rather than averaged
// whole; the offsets sit well inside the cell so grid-line and border pixels
// never contaminate the metric.

use crate::config::Config;
use crate::types::{Cell, CellMetric, FrameBuffer};

const LUMA_R: f32 = 0.2126;
const LUMA_G: f32 = 0.7152;
const LUMA_B: f32 = 0.0722;

/// Samples a single grid cell. Sample coordinates are clamped into buffer
/// bounds, so there are no error conditions.
pub fn sample_cell(frame: &FrameBuffer, cell: Cell, config: &Config) -> CellMetric {
    let px = config.grid.cell_px as f32;
    let offsets = [config.sampling.offset_lo, config.sampling.offset_hi];

    let mut r = 0.0f32;
    let mut g = 0.0f32;
    let mut b = 0.0f32;
    let mut a = 0.0f32;

    for oy in &offsets {
        for ox in &offsets {
            let sx = (cell.x as f32 * px + px * ox) as i32;
            let sy = (cell.y as f32 * px + px * oy) as i32;
            let (pr, pg, pb, pa) = frame.pixel(sx, sy);
            r += pr as f32;
            g += pg as f32;
            b += pb as f32;
            a += pa as f32;
        }
    }

    r /= 4.0;
    g /= 4.0;
    b /= 4.0;
    a /= 4.0;

    let value = LUMA_R * r + LUMA_G * g + LUMA_B * b;
    let bright =
        value > config.sampling.brightness_threshold && a > config.sampling.alpha_threshold;

    CellMetric { r, g, b, a, value, bright }
}

/// Samples every cell of the grid into a flat row-major metric vector of
/// length `grid * grid`.
pub fn sample_grid(frame: &FrameBuffer, config: &Config) -> Vec<CellMetric> {
    let grid = config.grid.size;
    let mut metrics = Vec::with_capacity(grid * grid);

    for y in 0..grid as i32 {
        for x in 0..grid as i32 {
            metrics.push(sample_cell(frame, Cell::new(x, y), config));
        }
    }

    metrics
}
