//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during fitting
//! - exported to JSON/CSV
//! - reloaded later for plotting or comparisons

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Sex of a captured specimen.
///
/// The CSV encodes sex as a single letter (`f`/`m`, case-insensitive); we map
/// it to a full label at ingest so the rest of the pipeline never sees raw codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    #[value(alias = "f")]
    Female,
    #[value(alias = "m")]
    Male,
}

impl Sex {
    /// Parse the single-letter CSV code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "f" => Some(Sex::Female),
            "m" => Some(Sex::Male),
            _ => None,
        }
    }

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            Sex::Female => "female",
            Sex::Male => "male",
        }
    }
}

/// One row per captured specimen.
///
/// Immutable once loaded; subset selection produces derived read-only vectors.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Species code (short field code, e.g. `SCUN`).
    pub species: String,
    pub sex: Sex,
    /// Snout-to-vent length in millimeters (validated positive at ingest).
    pub svl_mm: f64,
    /// Body weight in grams (validated positive at ingest).
    pub weight_g: f64,
}

/// Summary stats about the observations actually used for fitting.
#[derive(Debug, Clone)]
pub struct DatasetStats {
    pub n: usize,
    pub svl_min: f64,
    pub svl_max: f64,
    pub weight_min: f64,
    pub weight_max: f64,
}

/// One estimated parameter with its significance diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamEstimate {
    pub name: String,
    pub estimate: f64,
    pub std_err: f64,
    pub t_value: f64,
    /// Two-sided p-value from Student's t with `n - 2` degrees of freedom.
    pub p_value: f64,
}

/// Fit quality diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitQuality {
    pub sse: f64,
    pub rmse: f64,
    pub n: usize,
    /// Gauss-Newton iterations used before convergence.
    pub iterations: usize,
}

/// A power-law model `weight = a * svl^b` bound to estimated parameters.
///
/// Created once per fitting stage; never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedModel {
    /// Which data this model was fit against (e.g. `population`, `SCUN female`).
    pub label: String,
    pub a: f64,
    pub b: f64,
    pub params: Vec<ParamEstimate>,
    pub quality: FitQuality,
    /// Residual degrees of freedom (`n - 2`).
    pub dof: usize,
}

impl FittedModel {
    /// Predicted weight (g) at the given SVL (mm).
    pub fn predict(&self, svl_mm: f64) -> f64 {
        crate::models::predict(self.a, self.b, svl_mm)
    }
}

/// RMSE of the general and subset models evaluated on the same subset rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelComparison {
    pub rmse_general: f64,
    pub rmse_subset: f64,
    /// Number of subset observations both models were evaluated on.
    pub n: usize,
}

impl ModelComparison {
    /// True when the subset-specific model has strictly lower RMSE on its own rows.
    pub fn subset_wins(&self) -> bool {
        self.rmse_subset < self.rmse_general
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub csv_path: PathBuf,

    /// Species code selecting the subset fit.
    pub species: String,
    /// Sex selecting the subset fit.
    pub sex: Sex,

    /// Relative SSE-improvement tolerance for Gauss-Newton convergence.
    pub tol: f64,
    /// Iteration cap for the non-linear fit.
    pub max_iters: usize,

    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,

    pub export_predictions: Option<PathBuf>,
    pub export_fit: Option<PathBuf>,
    /// Directory receiving the two SVG report figures.
    pub svg_dir: Option<PathBuf>,
}

/// A saved fit file (JSON): both fitted models, their comparison, and
/// precomputed curve grids for quick plotting downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitFile {
    pub tool: String,
    pub general: FittedModel,
    pub subset: FittedModel,
    pub comparison: ModelComparison,
    pub general_grid: CurveGrid,
    pub subset_grid: CurveGrid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveGrid {
    pub svl_mm: Vec<f64>,
    pub weight_g: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sex_codes_parse_case_insensitively() {
        assert_eq!(Sex::from_code("f"), Some(Sex::Female));
        assert_eq!(Sex::from_code("M"), Some(Sex::Male));
        assert_eq!(Sex::from_code(" m "), Some(Sex::Male));
        assert_eq!(Sex::from_code("x"), None);
        assert_eq!(Sex::from_code(""), None);
    }

    #[test]
    fn comparison_prefers_lower_rmse() {
        let cmp = ModelComparison {
            rmse_general: 1.5,
            rmse_subset: 0.9,
            n: 10,
        };
        assert!(cmp.subset_wins());

        let cmp = ModelComparison {
            rmse_general: 0.5,
            rmse_subset: 0.9,
            n: 10,
        };
        assert!(!cmp.subset_wins());
    }
}
