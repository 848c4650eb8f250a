//! Export per-observation predictions to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{FittedModel, Observation, Sex};
use crate::error::AppError;

/// Write per-observation predictions to a CSV file.
///
/// Every row gets the general-model prediction; rows matching the subset's
/// species/sex additionally get the subset-model prediction (blank otherwise,
/// since the subset model was not fit to those rows).
pub fn write_predictions_csv(
    path: &Path,
    observations: &[Observation],
    general: &FittedModel,
    subset: &FittedModel,
    species: &str,
    sex: Sex,
) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::input(format!(
            "Failed to create export CSV '{}': {e}",
            path.display()
        ))
    })?;

    writeln!(
        file,
        "species,sex,svl_mm,weight_g,fit_general,resid_general,fit_subset,resid_subset"
    )
    .map_err(|e| AppError::input(format!("Failed to write export CSV header: {e}")))?;

    for obs in observations {
        let fit_general = general.predict(obs.svl_mm);
        let resid_general = obs.weight_g - fit_general;

        let (fit_subset, resid_subset) = if obs.species.eq_ignore_ascii_case(species) && obs.sex == sex
        {
            let f = subset.predict(obs.svl_mm);
            (format!("{f:.4}"), format!("{:.4}", obs.weight_g - f))
        } else {
            (String::new(), String::new())
        };

        writeln!(
            file,
            "{},{},{:.2},{:.4},{fit_general:.4},{resid_general:.4},{fit_subset},{resid_subset}",
            obs.species,
            obs.sex.display_name(),
            obs.svl_mm,
            obs.weight_g,
        )
        .map_err(|e| AppError::input(format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}
