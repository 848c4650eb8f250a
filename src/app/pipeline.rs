//! The computation pipeline for a single report run.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! ingest -> population fit -> subset selection -> subset fit -> comparison
//!
//! Each stage takes the prior stage's output as an explicit argument and
//! returns plain data; presentation (printing, plotting, exports) lives in
//! `app` and only reads the computed values.

use crate::domain::{FitConfig, FittedModel, ModelComparison, Observation, Sex};
use crate::error::AppError;
use crate::fit::{fit_power_law, FitOptions};
use crate::io::ingest::{load_observations, IngestedData};
use crate::report::compare_on_subset;

/// All computed outputs of a single `svl report` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ingest: IngestedData,
    pub general: FittedModel,
    pub subset: FittedModel,
    /// The subset rows both models are evaluated on.
    pub subset_obs: Vec<Observation>,
    pub comparison: ModelComparison,
}

/// Execute the full report pipeline and return the computed outputs.
pub fn run_report(config: &FitConfig) -> Result<RunOutput, AppError> {
    let ingest = load_observations(&config.csv_path)?;
    run_report_with_data(config, ingest)
}

/// Execute the pipeline with pre-loaded data (used by tests).
pub fn run_report_with_data(
    config: &FitConfig,
    ingest: IngestedData,
) -> Result<RunOutput, AppError> {
    let opts = FitOptions {
        tol: config.tol,
        max_iters: config.max_iters,
    };

    // Population-wide fit over everything the ingest accepted.
    let (svl, weight) = measurement_columns(&ingest.observations);
    let general = fit_power_law("population", &svl, &weight, &opts)?;

    // Subset fit: one species, one sex. The two fits share only the model
    // form and algorithm; there is no warm-starting between them.
    let subset_obs = filter_observations(&ingest.observations, &config.species, config.sex);
    if subset_obs.is_empty() {
        return Err(AppError::data(format!(
            "Subset species={} sex={} matched no rows.",
            config.species,
            config.sex.display_name()
        )));
    }

    let label = format!("{} {}", config.species, config.sex.display_name());
    let (sub_svl, sub_weight) = measurement_columns(&subset_obs);
    let subset = fit_power_law(&label, &sub_svl, &sub_weight, &opts)?;

    let comparison = compare_on_subset(&general, &subset, &subset_obs)?;

    Ok(RunOutput {
        ingest,
        general,
        subset,
        subset_obs,
        comparison,
    })
}

/// Select the rows matching one species/sex combination.
///
/// Species codes compare case-insensitively so `scun` on the command line
/// matches `SCUN` in the file.
pub fn filter_observations(
    observations: &[Observation],
    species: &str,
    sex: Sex,
) -> Vec<Observation> {
    observations
        .iter()
        .filter(|o| o.species.eq_ignore_ascii_case(species) && o.sex == sex)
        .cloned()
        .collect()
}

fn measurement_columns(observations: &[Observation]) -> (Vec<f64>, Vec<f64>) {
    let svl = observations.iter().map(|o| o.svl_mm).collect();
    let weight = observations.iter().map(|o| o.weight_g).collect();
    (svl, weight)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::domain::DatasetStats;
    use crate::io::ingest::IngestedData;
    use crate::models::predict;

    fn obs(species: &str, sex: Sex, svl: f64, weight: f64) -> Observation {
        Observation {
            species: species.to_string(),
            sex,
            svl_mm: svl,
            weight_g: weight,
        }
    }

    fn ingested(observations: Vec<Observation>) -> IngestedData {
        let n = observations.len();
        IngestedData {
            observations,
            stats: DatasetStats {
                n,
                svl_min: 10.0,
                svl_max: 40.0,
                weight_min: 0.1,
                weight_max: 100.0,
            },
            row_errors: Vec::new(),
            rows_read: n,
        }
    }

    fn config(species: &str, sex: Sex) -> FitConfig {
        FitConfig {
            csv_path: "unused.csv".into(),
            species: species.to_string(),
            sex,
            tol: 1e-8,
            max_iters: 50,
            plot: false,
            plot_width: 80,
            plot_height: 20,
            export_predictions: None,
            export_fit: None,
            svg_dir: None,
        }
    }

    #[test]
    fn filter_selects_exactly_one_species_sex_combination() {
        let rows = vec![
            obs("SCUN", Sex::Female, 10.0, 1.0),
            obs("SCUN", Sex::Male, 11.0, 1.2),
            obs("UROR", Sex::Female, 12.0, 1.4),
            obs("scun", Sex::Female, 13.0, 1.6),
        ];

        let subset = filter_observations(&rows, "SCUN", Sex::Female);
        assert_eq!(subset.len(), 2);
        assert!(subset.iter().all(|o| o.sex == Sex::Female));
        assert!(subset.iter().all(|o| o.species.eq_ignore_ascii_case("SCUN")));
    }

    #[test]
    fn subset_fit_uses_only_matching_rows() {
        // Subset rows follow 0.001 * svl^3 exactly; the other species follows
        // different parameters. An exact subset recovery is only possible if
        // the non-matching rows never reach the subset fit.
        let (a, b) = (0.001, 3.0);
        let mut rows: Vec<Observation> = [10.0, 20.0, 40.0]
            .iter()
            .map(|&l| obs("SCUN", Sex::Female, l, predict(a, b, l)))
            .collect();
        rows.extend(
            [12.0, 25.0, 38.0]
                .iter()
                .map(|&l| obs("UROR", Sex::Male, l, predict(0.002, 2.8, l))),
        );

        let run = run_report_with_data(&config("SCUN", Sex::Female), ingested(rows)).unwrap();

        assert_eq!(run.subset_obs.len(), 3);
        assert_relative_eq!(run.subset.a, a, max_relative = 1e-4);
        assert_relative_eq!(run.subset.b, b, max_relative = 1e-4);
        assert!(run.comparison.rmse_subset < 1e-6);
        // The pooled model interpolates two regimes, so it cannot match the
        // subset model on the subset's own rows.
        assert!(run.comparison.rmse_general > run.comparison.rmse_subset);
        assert!(run.comparison.subset_wins());
    }

    #[test]
    fn empty_subset_is_a_descriptive_error() {
        let rows = vec![
            obs("SCUN", Sex::Female, 10.0, 1.0),
            obs("SCUN", Sex::Female, 20.0, 8.0),
            obs("SCUN", Sex::Female, 40.0, 64.0),
        ];

        let err =
            run_report_with_data(&config("PHCO", Sex::Male), ingested(rows)).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("PHCO"));
        assert!(err.to_string().contains("matched no rows"));
    }
}
