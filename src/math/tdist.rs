//! Significance tests for fitted parameters.

use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::error::AppError;

/// Two-sided p-value for a t-statistic with the given degrees of freedom.
///
/// An infinite t-statistic (an exact fit drives the standard error to zero)
/// maps to a p-value of 0 rather than being pushed through the CDF.
pub fn two_sided_p_value(t: f64, dof: usize) -> Result<f64, AppError> {
    if dof == 0 {
        return Err(AppError::numeric(
            "Cannot compute p-values with zero residual degrees of freedom.",
        ));
    }
    if t.is_nan() {
        return Err(AppError::numeric("Non-finite t-statistic."));
    }
    if t.is_infinite() {
        return Ok(0.0);
    }

    let dist = StudentsT::new(0.0, 1.0, dof as f64)
        .map_err(|e| AppError::numeric(format!("Invalid t-distribution (dof={dof}): {e}")))?;

    Ok(2.0 * (1.0 - dist.cdf(t.abs())))
}
