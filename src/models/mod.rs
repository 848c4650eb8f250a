//! The allometric model `weight = a * svl^b`.
//!
//! The fitter relies on two primitive operations:
//! - predict weight given (a, b) and an SVL (for residuals/plots)
//! - build a Jacobian row for the current (a, b) (for Gauss-Newton steps)
//!
//! Both are pure functions of their arguments; the model carries no state and
//! is passed explicitly into each fitting call.

/// Predicted weight (g) for the given parameters and SVL (mm).
pub fn predict(a: f64, b: f64, svl_mm: f64) -> f64 {
    a * svl_mm.powf(b)
}

/// Evaluate the model elementwise over an ordered sequence of SVL values.
pub fn predict_many(a: f64, b: f64, svl_mm: &[f64]) -> Vec<f64> {
    svl_mm.iter().map(|&l| predict(a, b, l)).collect()
}

/// Fill a Jacobian row with the partial derivatives of the prediction at `svl_mm`:
///
/// ```text
/// d/da [a * L^b] = L^b
/// d/db [a * L^b] = a * L^b * ln(L)
/// ```
///
/// # Panics
/// Panics if `out` has fewer than 2 elements. Callers size the array correctly.
pub fn fill_jacobian_row(a: f64, b: f64, svl_mm: f64, out: &mut [f64]) {
    let lb = svl_mm.powf(b);
    out[0] = lb;
    out[1] = a * lb * svl_mm.ln();
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn predict_cubic_points() {
        assert_relative_eq!(predict(0.001, 3.0, 10.0), 1.0, max_relative = 1e-12);
        assert_relative_eq!(predict(0.001, 3.0, 20.0), 8.0, max_relative = 1e-12);
        assert_relative_eq!(predict(0.001, 3.0, 40.0), 64.0, max_relative = 1e-12);
    }

    #[test]
    fn predict_many_is_elementwise_and_ordered() {
        let out = predict_many(0.001, 3.0, &[10.0, 20.0, 40.0]);
        assert_eq!(out.len(), 3);
        assert_relative_eq!(out[0], 1.0, max_relative = 1e-12);
        assert_relative_eq!(out[1], 8.0, max_relative = 1e-12);
        assert_relative_eq!(out[2], 64.0, max_relative = 1e-12);
    }

    #[test]
    fn jacobian_matches_finite_differences() {
        let (a, b, l) = (2.0e-5, 2.9, 55.0);
        let mut row = [0.0; 2];
        fill_jacobian_row(a, b, l, &mut row);

        let h = 1e-7;
        let da = (predict(a + h, b, l) - predict(a - h, b, l)) / (2.0 * h);
        let db = (predict(a, b + h, l) - predict(a, b - h, l)) / (2.0 * h);
        assert_relative_eq!(row[0], da, max_relative = 1e-5);
        assert_relative_eq!(row[1], db, max_relative = 1e-5);
    }
}
