//! ASCII/Unicode plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - observed specimens: `o`
//! - fitted curve(s): `-` line (population), `=` line (subset)

use crate::domain::{FittedModel, Observation};

/// Number of samples along each rendered curve.
const CURVE_SAMPLES: usize = 64;

/// Render a scatter of observations with one fitted curve.
pub fn render_fit_plot(
    obs: &[Observation],
    fit: &FittedModel,
    width: usize,
    height: usize,
) -> String {
    let (l_min, l_max) = svl_range(obs).unwrap_or((20.0, 100.0));
    let curve = sample_curve(fit, l_min, l_max, CURVE_SAMPLES);
    render_plot(obs, &[(curve.as_slice(), '-')], l_min, l_max, width, height)
}

/// Render a scatter of subset observations with both fitted curves overlaid.
pub fn render_comparison_plot(
    obs: &[Observation],
    general: &FittedModel,
    subset: &FittedModel,
    width: usize,
    height: usize,
) -> String {
    let (l_min, l_max) = svl_range(obs).unwrap_or((20.0, 100.0));
    let general_curve = sample_curve(general, l_min, l_max, CURVE_SAMPLES);
    let subset_curve = sample_curve(subset, l_min, l_max, CURVE_SAMPLES);
    let mut out = render_plot(
        obs,
        &[(general_curve.as_slice(), '-'), (subset_curve.as_slice(), '=')],
        l_min,
        l_max,
        width,
        height,
    );
    out.push_str("curves: '-' general | '=' subset\n");
    out
}

fn render_plot(
    obs: &[Observation],
    curves: &[(&[(f64, f64)], char)],
    l_min: f64,
    l_max: f64,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    // Determine y-range from observed points and curve points.
    let (w_min, w_max) = weight_range(obs, curves).unwrap_or((0.0, 1.0));
    let (w_min, w_max) = pad_range(w_min, w_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw curves first (so points can overlay).
    for (curve, ch) in curves {
        draw_curve(&mut grid, curve, l_min, l_max, w_min, w_max, *ch);
    }

    for o in obs {
        let x = map_x(o.svl_mm, l_min, l_max, width);
        let y = map_y(o.weight_g, w_min, w_max, height);
        grid[y][x] = 'o';
    }

    // Build final string. We include a small header with ranges.
    let mut out = String::new();
    out.push_str(&format!(
        "Plot: svl=[{l_min:.1}, {l_max:.1}]mm | weight=[{w_min:.2}, {w_max:.2}]g\n"
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

fn svl_range(obs: &[Observation]) -> Option<(f64, f64)> {
    let mut min_l = f64::INFINITY;
    let mut max_l = f64::NEG_INFINITY;
    for o in obs {
        min_l = min_l.min(o.svl_mm);
        max_l = max_l.max(o.svl_mm);
    }
    if min_l.is_finite() && max_l.is_finite() && max_l > min_l {
        Some((min_l, max_l))
    } else {
        None
    }
}

fn sample_curve(fit: &FittedModel, l_min: f64, l_max: f64, n: usize) -> Vec<(f64, f64)> {
    let n = n.max(2);
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let u = i as f64 / (n as f64 - 1.0);
        let l = l_min + u * (l_max - l_min);
        out.push((l, fit.predict(l)));
    }
    out
}

fn weight_range(obs: &[Observation], curves: &[(&[(f64, f64)], char)]) -> Option<(f64, f64)> {
    let mut min_w = f64::INFINITY;
    let mut max_w = f64::NEG_INFINITY;

    for o in obs {
        min_w = min_w.min(o.weight_g);
        max_w = max_w.max(o.weight_g);
    }
    for (curve, _) in curves {
        for &(_, w) in *curve {
            min_w = min_w.min(w);
            max_w = max_w.max(w);
        }
    }

    if min_w.is_finite() && max_w.is_finite() && max_w > min_w {
        Some((min_w, max_w))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(l: f64, l_min: f64, l_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((l - l_min) / (l_max - l_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(w: f64, w_min: f64, w_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((w - w_min) / (w_max - w_min)).clamp(0.0, 1.0);
    // w=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

fn draw_curve(
    grid: &mut [Vec<char>],
    curve: &[(f64, f64)],
    l_min: f64,
    l_max: f64,
    w_min: f64,
    w_max: f64,
    ch: char,
) {
    if curve.len() < 2 {
        return;
    }
    let height = grid.len();
    let width = grid[0].len();

    let mut prev = None;
    for &(l, w) in curve {
        let x = map_x(l, l_min, l_max, width);
        let y = map_y(w, w_min, w_max, height);
        if let Some((x0, y0)) = prev {
            draw_line(grid, x0, y0, x, y, ch);
        } else {
            grid[y][x] = ch;
        }
        prev = Some((x, y));
    }
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
