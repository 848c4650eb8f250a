//! CSV ingest and normalization.
//!
//! This module is responsible for turning a survey CSV into a clean set of
//! `Observation`s that are safe to fit.
//!
//! Design goals:
//! - **Strict schema** for required fields (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (no hidden randomness)
//! - **Separation of concerns**: no fitting logic here
//!
//! The fitting invariant lives here: a non-positive or non-finite length or
//! weight never reaches the estimation stage. Such rows become `RowError`s.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::domain::{DatasetStats, Observation, Sex};
use crate::error::AppError;

/// Accepted header spellings per logical column, lowercased.
const SPECIES_ALIASES: &[&str] = &["species", "spp", "species_code"];
const SEX_ALIASES: &[&str] = &["sex"];
const SVL_ALIASES: &[&str] = &["svl_mm", "svl", "length_mm"];
const WEIGHT_ALIASES: &[&str] = &["weight_g", "weight", "mass_g"];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: normalized observations + stats + row errors.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub observations: Vec<Observation>,
    pub stats: DatasetStats,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
}

/// Load and normalize a survey CSV to `Observation`s.
pub fn load_observations(path: &Path) -> Result<IngestedData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read CSV headers: {e}")))?
        .clone();

    let cols = resolve_columns(&headers)?;

    let mut observations = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        // +2 because:
        // - records() starts at line 1 after headers
        // - CSV is 1-based line numbers
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, &cols) {
            Ok(obs) => observations.push(obs),
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    let stats = compute_stats(&observations).ok_or_else(|| {
        AppError::data(format!(
            "No valid observations in '{}' ({} rows read, {} rejected).",
            path.display(),
            rows_read,
            row_errors.len()
        ))
    })?;

    Ok(IngestedData {
        observations,
        stats,
        row_errors,
        rows_read,
    })
}

/// Resolved column indices for the required schema.
#[derive(Debug, Clone, Copy)]
struct Columns {
    species: usize,
    sex: usize,
    svl: usize,
    weight: usize,
}

fn resolve_columns(headers: &StringRecord) -> Result<Columns, AppError> {
    let map: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_ascii_lowercase(), i))
        .collect();

    let find = |aliases: &[&str], what: &str| -> Result<usize, AppError> {
        aliases
            .iter()
            .find_map(|a| map.get(*a).copied())
            .ok_or_else(|| {
                AppError::input(format!(
                    "Missing required column '{what}' (accepted headers: {}).",
                    aliases.join(", ")
                ))
            })
    };

    Ok(Columns {
        species: find(SPECIES_ALIASES, "species")?,
        sex: find(SEX_ALIASES, "sex")?,
        svl: find(SVL_ALIASES, "svl_mm")?,
        weight: find(WEIGHT_ALIASES, "weight_g")?,
    })
}

fn parse_row(record: &StringRecord, cols: &Columns) -> Result<Observation, String> {
    let species = get_field(record, cols.species, "species")?.to_string();

    let sex_code = get_field(record, cols.sex, "sex")?;
    let sex = Sex::from_code(sex_code)
        .ok_or_else(|| format!("Unknown sex code '{sex_code}' (expected f or m)."))?;

    let svl_mm = parse_positive(get_field(record, cols.svl, "svl_mm")?, "svl_mm")?;
    let weight_g = parse_positive(get_field(record, cols.weight, "weight_g")?, "weight_g")?;

    Ok(Observation {
        species,
        sex,
        svl_mm,
        weight_g,
    })
}

fn get_field<'r>(record: &'r StringRecord, idx: usize, name: &str) -> Result<&'r str, String> {
    match record.get(idx) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(format!("Missing value for '{name}'.")),
    }
}

fn parse_positive(raw: &str, name: &str) -> Result<f64, String> {
    let value: f64 = raw
        .parse()
        .map_err(|_| format!("Invalid number '{raw}' for '{name}'."))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(format!(
            "Non-positive value {value} for '{name}' (measurements must be > 0)."
        ));
    }
    Ok(value)
}

fn compute_stats(observations: &[Observation]) -> Option<DatasetStats> {
    if observations.is_empty() {
        return None;
    }

    let mut svl_min = f64::INFINITY;
    let mut svl_max = f64::NEG_INFINITY;
    let mut weight_min = f64::INFINITY;
    let mut weight_max = f64::NEG_INFINITY;

    for obs in observations {
        svl_min = svl_min.min(obs.svl_mm);
        svl_max = svl_max.max(obs.svl_mm);
        weight_min = weight_min.min(obs.weight_g);
        weight_max = weight_max.max(obs.weight_g);
    }

    Some(DatasetStats {
        n: observations.len(),
        svl_min,
        svl_max,
        weight_min,
        weight_max,
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_temp_csv(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_valid_rows_and_stats() {
        let path = write_temp_csv(
            "svl_ingest_valid.csv",
            "species,sex,svl_mm,weight_g\n\
             SCUN,f,52.0,3.1\n\
             SCUN,m,61.5,5.4\n\
             UROR,F,44.0,1.9\n",
        );

        let ingest = load_observations(&path).unwrap();
        assert_eq!(ingest.observations.len(), 3);
        assert!(ingest.row_errors.is_empty());
        assert_eq!(ingest.stats.n, 3);
        assert_eq!(ingest.stats.svl_min, 44.0);
        assert_eq!(ingest.stats.svl_max, 61.5);
        assert_eq!(ingest.observations[2].sex, Sex::Female);
    }

    #[test]
    fn header_aliases_are_accepted() {
        let path = write_temp_csv(
            "svl_ingest_alias.csv",
            "spp,sex,svl,weight\nSCUN,f,52.0,3.1\nSCUN,m,60.0,5.0\n",
        );

        let ingest = load_observations(&path).unwrap();
        assert_eq!(ingest.observations.len(), 2);
    }

    #[test]
    fn non_positive_measurements_become_row_errors() {
        let path = write_temp_csv(
            "svl_ingest_nonpos.csv",
            "species,sex,svl_mm,weight_g\n\
             SCUN,f,52.0,3.1\n\
             SCUN,f,-10.0,3.1\n\
             SCUN,m,61.5,0.0\n",
        );

        let ingest = load_observations(&path).unwrap();
        assert_eq!(ingest.observations.len(), 1);
        assert_eq!(ingest.row_errors.len(), 2);
        assert_eq!(ingest.row_errors[0].line, 3);
        assert!(ingest.row_errors[0].message.contains("svl_mm"));
        assert!(ingest.row_errors[1].message.contains("weight_g"));
    }

    #[test]
    fn unknown_sex_code_is_a_row_error() {
        let path = write_temp_csv(
            "svl_ingest_sex.csv",
            "species,sex,svl_mm,weight_g\nSCUN,x,52.0,3.1\nSCUN,m,60.0,5.0\n",
        );

        let ingest = load_observations(&path).unwrap();
        assert_eq!(ingest.observations.len(), 1);
        assert_eq!(ingest.row_errors.len(), 1);
        assert!(ingest.row_errors[0].message.contains("sex"));
    }

    #[test]
    fn missing_column_is_a_schema_error() {
        let path = write_temp_csv(
            "svl_ingest_schema.csv",
            "species,sex,svl_mm\nSCUN,f,52.0\n",
        );

        let err = load_observations(&path).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("weight_g"));
    }

    #[test]
    fn all_rows_invalid_is_a_data_error() {
        let path = write_temp_csv(
            "svl_ingest_empty.csv",
            "species,sex,svl_mm,weight_g\nSCUN,f,-1.0,3.1\n",
        );

        let err = load_observations(&path).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
