//! Command-line parsing for the allometry report tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the modeling/math code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::Sex;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "svl", version, about = "Allometric weight-length model fitting for lizard surveys")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit the population and subset models, print tables/plots, optionally export.
    Report(ReportArgs),
    /// Write a synthetic survey CSV (for demos and pipeline testing).
    Sample(SampleArgs),
}

/// Options for the full report run.
#[derive(Debug, Parser, Clone)]
pub struct ReportArgs {
    /// Survey CSV (columns: species, sex, svl_mm, weight_g).
    #[arg(short = 'i', long, value_name = "CSV")]
    pub input: PathBuf,

    /// Species code for the subset fit.
    #[arg(long, default_value = "SCUN")]
    pub species: String,

    /// Sex for the subset fit.
    #[arg(long, value_enum, default_value_t = Sex::Female)]
    pub sex: Sex,

    /// Relative SSE-improvement tolerance for convergence.
    #[arg(long, default_value_t = 1e-8)]
    pub tol: f64,

    /// Iteration cap for the non-linear fit.
    #[arg(long, default_value_t = 50)]
    pub max_iters: usize,

    /// Disable the terminal plots (rendered by default).
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export per-observation predictions to CSV.
    #[arg(long = "export-predictions")]
    pub export_predictions: Option<PathBuf>,

    /// Export the fitted models + comparison to JSON.
    #[arg(long = "export-fit")]
    pub export_fit: Option<PathBuf>,

    /// Directory receiving the two SVG report figures.
    #[arg(long = "svg-dir")]
    pub svg_dir: Option<PathBuf>,
}

/// Options for synthetic survey generation.
#[derive(Debug, Parser)]
pub struct SampleArgs {
    /// Output CSV path.
    #[arg(short = 'o', long, value_name = "CSV")]
    pub out: PathBuf,

    /// Number of specimens to generate.
    #[arg(short = 'n', long, default_value_t = 200)]
    pub count: usize,

    /// Random seed for reproducibility.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Lognormal noise standard deviation on weight.
    #[arg(long, default_value_t = 0.08)]
    pub noise: f64,
}
