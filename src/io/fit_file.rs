//! Write the fit JSON file.
//!
//! Fit JSON is the "portable" representation of a completed run:
//! - both fitted models (parameters + diagnostics)
//! - the RMSE comparison on the subset
//! - precomputed curve grids for quick plotting downstream
//!
//! The schema is defined by `domain::FitFile`.

use std::fs::File;
use std::path::Path;

use crate::domain::{CurveGrid, FitFile, FittedModel, ModelComparison};
use crate::error::AppError;

/// Points per exported curve grid.
const GRID_POINTS: usize = 101;

/// Write a fit JSON file covering both models and their comparison.
pub fn write_fit_json(
    path: &Path,
    general: &FittedModel,
    subset: &FittedModel,
    comparison: &ModelComparison,
    svl_min: f64,
    svl_max: f64,
) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::input(format!(
            "Failed to create fit JSON '{}': {e}",
            path.display()
        ))
    })?;

    let fit_file = FitFile {
        tool: "svl".to_string(),
        general: general.clone(),
        subset: subset.clone(),
        comparison: comparison.clone(),
        general_grid: build_grid(general, svl_min, svl_max),
        subset_grid: build_grid(subset, svl_min, svl_max),
    };

    serde_json::to_writer_pretty(file, &fit_file)
        .map_err(|e| AppError::input(format!("Failed to write fit JSON: {e}")))?;

    Ok(())
}

fn build_grid(fit: &FittedModel, svl_min: f64, svl_max: f64) -> CurveGrid {
    let mut l0 = svl_min;
    let mut l1 = svl_max;
    if !(l0.is_finite() && l1.is_finite()) || l1 <= l0 {
        l0 = 20.0;
        l1 = 100.0;
    }

    let mut svl_mm = Vec::with_capacity(GRID_POINTS);
    let mut weight_g = Vec::with_capacity(GRID_POINTS);
    for i in 0..GRID_POINTS {
        let u = i as f64 / (GRID_POINTS as f64 - 1.0);
        let l = l0 + u * (l1 - l0);
        svl_mm.push(l);
        weight_g.push(fit.predict(l));
    }

    CurveGrid { svl_mm, weight_g }
}
