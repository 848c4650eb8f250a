//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - runs the computation pipeline
//! - prints tables/plots
//! - writes optional exports

use clap::Parser;

use crate::cli::{Command, ReportArgs, SampleArgs};
use crate::domain::FitConfig;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `svl` binary.
pub fn run() -> Result<(), AppError> {
    // We want `svl -i data.csv` to behave like `svl report -i data.csv`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing. This preserves a clean clap structure while
    // retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Report(args) => handle_report(args),
        Command::Sample(args) => handle_sample(args),
    }
}

fn handle_report(args: ReportArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args);
    let run = pipeline::run_report(&config)?;

    println!(
        "{}",
        crate::report::format::format_run_summary(&run.ingest, &config)
    );
    println!(
        "{}",
        crate::report::format::format_parameter_table(&run.general)
    );
    println!(
        "{}",
        crate::report::format::format_parameter_table(&run.subset)
    );
    println!(
        "{}",
        crate::report::format::format_comparison(&run.comparison, &run.general, &run.subset)
    );

    if config.plot {
        let fit_plot = crate::plot::render_fit_plot(
            &run.ingest.observations,
            &run.general,
            config.plot_width,
            config.plot_height,
        );
        println!("{fit_plot}");

        let cmp_plot = crate::plot::render_comparison_plot(
            &run.subset_obs,
            &run.general,
            &run.subset,
            config.plot_width,
            config.plot_height,
        );
        println!("{cmp_plot}");
    }

    // Optional exports.
    if let Some(path) = &config.export_predictions {
        crate::io::export::write_predictions_csv(
            path,
            &run.ingest.observations,
            &run.general,
            &run.subset,
            &config.species,
            config.sex,
        )?;
    }
    if let Some(path) = &config.export_fit {
        crate::io::fit_file::write_fit_json(
            path,
            &run.general,
            &run.subset,
            &run.comparison,
            run.ingest.stats.svl_min,
            run.ingest.stats.svl_max,
        )?;
    }
    if let Some(dir) = &config.svg_dir {
        std::fs::create_dir_all(dir).map_err(|e| {
            AppError::input(format!(
                "Failed to create SVG directory '{}': {e}",
                dir.display()
            ))
        })?;
        crate::plot::write_fit_svg(
            &dir.join("fit_population.svg"),
            &run.ingest.observations,
            &run.general,
        )?;
        crate::plot::write_comparison_svg(
            &dir.join("fit_comparison.svg"),
            &run.subset_obs,
            &run.general,
            &run.subset,
        )?;
    }

    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = crate::data::SampleConfig {
        count: args.count,
        seed: args.seed,
        noise_sd: args.noise,
    };
    crate::data::write_sample_csv(&args.out, &config)?;
    println!(
        "Wrote {} synthetic observations to {} (seed {}).",
        args.count,
        args.out.display(),
        args.seed
    );
    Ok(())
}

pub fn fit_config_from_args(args: &ReportArgs) -> FitConfig {
    FitConfig {
        csv_path: args.input.clone(),
        species: args.species.clone(),
        sex: args.sex,
        tol: args.tol,
        max_iters: args.max_iters,
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_predictions: args.export_predictions.clone(),
        export_fit: args.export_fit.clone(),
        svg_dir: args.svg_dir.clone(),
    }
}

/// Rewrite argv so `svl` defaults to `svl report`.
///
/// Rules:
/// - `svl -i data.csv ...`     -> `svl report -i data.csv ...`
/// - `svl --help/--version/-h` -> unchanged (show top-level help/version)
/// - `svl report/sample ...`   -> unchanged
fn rewrite_args(argv: Vec<String>) -> Vec<String> {
    let mut argv = argv;
    let Some(arg1) = argv.get(1).cloned() else {
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "report" | "sample");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "report flags".
    if arg1.starts_with('-') {
        argv.insert(1, "report".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
