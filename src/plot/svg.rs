//! SVG report figures via Plotters.
//!
//! Two figures back the rendered report:
//! - scatter of observations with the fitted curve (one per fit)
//! - dual-model comparison on the subset (general vs subset curves)
//!
//! The SVG backend keeps the build free of native font/raster dependencies.

use std::path::Path;

use plotters::prelude::*;

use crate::domain::{FittedModel, Observation};
use crate::error::AppError;

/// Samples along each rendered curve.
const CURVE_SAMPLES: usize = 200;

struct CurveSeries {
    label: String,
    points: Vec<(f64, f64)>,
    color: RGBColor,
}

/// Write the scatter + fitted-curve figure for a single model.
pub fn write_fit_svg(path: &Path, obs: &[Observation], fit: &FittedModel) -> Result<(), AppError> {
    let (l_min, l_max) = svl_range(obs)?;
    let curves = vec![CurveSeries {
        label: format!("fit '{}'", fit.label),
        points: sample_curve(fit, l_min, l_max),
        color: BLUE,
    }];
    render(path, &format!("Weight vs SVL ('{}')", fit.label), obs, &curves)
}

/// Write the dual-model comparison figure on the subset observations.
pub fn write_comparison_svg(
    path: &Path,
    obs: &[Observation],
    general: &FittedModel,
    subset: &FittedModel,
) -> Result<(), AppError> {
    let (l_min, l_max) = svl_range(obs)?;
    let curves = vec![
        CurveSeries {
            label: format!("general '{}'", general.label),
            points: sample_curve(general, l_min, l_max),
            color: BLUE,
        },
        CurveSeries {
            label: format!("subset '{}'", subset.label),
            points: sample_curve(subset, l_min, l_max),
            color: RED,
        },
    ];
    render(
        path,
        &format!("Model comparison on '{}'", subset.label),
        obs,
        &curves,
    )
}

fn render(
    path: &Path,
    caption: &str,
    obs: &[Observation],
    curves: &[CurveSeries],
) -> Result<(), AppError> {
    draw(path, caption, obs, curves)
        .map_err(|e| AppError::input(format!("Failed to write SVG '{}': {e}", path.display())))
}

fn draw(
    path: &Path,
    caption: &str,
    obs: &[Observation],
    curves: &[CurveSeries],
) -> Result<(), Box<dyn std::error::Error>> {
    let root = SVGBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let (x0, x1, y0, y1) = bounds(obs, curves);

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption(caption, ("sans-serif", 20))
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    chart
        .configure_mesh()
        .x_desc("SVL (mm)")
        .y_desc("Weight (g)")
        .draw()?;

    for series in curves {
        let color = series.color;
        chart
            .draw_series(LineSeries::new(series.points.iter().copied(), &color))?
            .label(series.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart
        .draw_series(
            obs.iter()
                .map(|o| Circle::new((o.svl_mm, o.weight_g), 3, BLACK.filled())),
        )?
        .label("observed")
        .legend(|(x, y)| Circle::new((x, y), 3, BLACK.filled()));

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

fn svl_range(obs: &[Observation]) -> Result<(f64, f64), AppError> {
    let mut min_l = f64::INFINITY;
    let mut max_l = f64::NEG_INFINITY;
    for o in obs {
        min_l = min_l.min(o.svl_mm);
        max_l = max_l.max(o.svl_mm);
    }
    if min_l.is_finite() && max_l.is_finite() && max_l > min_l {
        Ok((min_l, max_l))
    } else {
        Err(AppError::data(
            "Cannot plot: need at least two distinct SVL values.",
        ))
    }
}

fn sample_curve(fit: &FittedModel, l_min: f64, l_max: f64) -> Vec<(f64, f64)> {
    let n = CURVE_SAMPLES.max(2);
    let mut out = Vec::with_capacity(n);
    for i in 0..n {
        let u = i as f64 / (n as f64 - 1.0);
        let l = l_min + u * (l_max - l_min);
        out.push((l, fit.predict(l)));
    }
    out
}

fn bounds(obs: &[Observation], curves: &[CurveSeries]) -> (f64, f64, f64, f64) {
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;

    for o in obs {
        x_min = x_min.min(o.svl_mm);
        x_max = x_max.max(o.svl_mm);
        y_min = y_min.min(o.weight_g);
        y_max = y_max.max(o.weight_g);
    }
    for series in curves {
        for &(x, y) in &series.points {
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
    }

    // 5% padding keeps points off the plot border.
    let x_pad = ((x_max - x_min) * 0.05).max(1e-9);
    let y_pad = ((y_max - y_min) * 0.05).max(1e-9);
    (x_min - x_pad, x_max + x_pad, (y_min - y_pad).max(0.0), y_max + y_pad)
}
