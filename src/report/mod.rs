//! Evaluation utilities: predictions, RMSE, and model comparison.

pub mod format;

use crate::domain::{FittedModel, ModelComparison, Observation};
use crate::error::AppError;
use crate::models;

/// Evaluate a fitted model over an ordered sequence of SVL values.
///
/// Pure and deterministic: output order matches input order.
pub fn predict_many(fit: &FittedModel, svl_mm: &[f64]) -> Vec<f64> {
    models::predict_many(fit.a, fit.b, svl_mm)
}

/// Root-mean-square error between actual and predicted weights.
///
/// Non-negative for all inputs; zero iff the sequences are identical.
pub fn rmse(actual: &[f64], predicted: &[f64]) -> Result<f64, AppError> {
    if actual.len() != predicted.len() {
        return Err(AppError::input(format!(
            "RMSE requires equally long sequences: {} actual vs {} predicted.",
            actual.len(),
            predicted.len()
        )));
    }
    if actual.is_empty() {
        return Err(AppError::data("RMSE of an empty sequence is undefined."));
    }

    let mut sum = 0.0;
    for (&a, &p) in actual.iter().zip(predicted.iter()) {
        let d = p - a;
        sum += d * d;
    }
    let value = (sum / actual.len() as f64).sqrt();
    if !value.is_finite() {
        return Err(AppError::numeric("Non-finite RMSE."));
    }
    Ok(value)
}

/// Evaluate both models on the same subset rows and compare their RMSE.
///
/// This is the analytical conclusion of the report: the subset-specific model
/// is expected to outperform the general model on its own regime.
pub fn compare_on_subset(
    general: &FittedModel,
    subset: &FittedModel,
    subset_obs: &[Observation],
) -> Result<ModelComparison, AppError> {
    if subset_obs.is_empty() {
        return Err(AppError::data(
            "Cannot compare models on an empty subset.",
        ));
    }

    let svl: Vec<f64> = subset_obs.iter().map(|o| o.svl_mm).collect();
    let actual: Vec<f64> = subset_obs.iter().map(|o| o.weight_g).collect();

    let rmse_general = rmse(&actual, &predict_many(general, &svl))?;
    let rmse_subset = rmse(&actual, &predict_many(subset, &svl))?;

    Ok(ModelComparison {
        rmse_general,
        rmse_subset,
        n: subset_obs.len(),
    })
}
