//! Synthetic survey data generation.

mod sample;

pub use sample::{generate_observations, write_sample_csv, SampleConfig};
