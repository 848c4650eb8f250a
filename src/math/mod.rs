//! Numerical primitives shared by the fitting code.

mod ols;
mod tdist;

pub use ols::{log_linear_init, solve_least_squares};
pub use tdist::two_sided_p_value;
