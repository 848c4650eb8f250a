//! Non-linear least squares fitting of the allometric model.

mod gauss_newton;

pub use gauss_newton::{fit_power_law, FitOptions};
