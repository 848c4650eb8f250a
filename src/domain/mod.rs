//! Shared domain types for the allometry report.

mod types;

pub use types::*;
