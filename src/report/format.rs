//! Formatted terminal output for the allometry report.
//!
//! We keep formatting code in one place so:
//! - the math/fitting code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::domain::{FitConfig, FittedModel, ModelComparison};
use crate::io::ingest::IngestedData;

/// Format the run header (dataset stats + ingest warnings + subset choice).
pub fn format_run_summary(ingest: &IngestedData, config: &FitConfig) -> String {
    let mut out = String::new();

    out.push_str("=== svl - Allometric Weight-Length Report ===\n");
    out.push_str(&format!("Input: {}\n", config.csv_path.display()));
    out.push_str(&format!(
        "Subset: species={} sex={}\n",
        config.species,
        config.sex.display_name()
    ));
    out.push_str(&format!(
        "Observations: n={} | svl=[{:.1}, {:.1}]mm | weight=[{:.2}, {:.2}]g\n",
        ingest.stats.n,
        ingest.stats.svl_min,
        ingest.stats.svl_max,
        ingest.stats.weight_min,
        ingest.stats.weight_max
    ));

    if !ingest.row_errors.is_empty() {
        out.push_str(&format!(
            "Rejected rows: {} of {} (first: line {}: {})\n",
            ingest.row_errors.len(),
            ingest.rows_read,
            ingest.row_errors[0].line,
            ingest.row_errors[0].message
        ));
    }

    out
}

/// Format one fitted model as a parameter table.
pub fn format_parameter_table(fit: &FittedModel) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Model '{}': weight = a * svl^b | n={} | SSE={:.4} | RMSE={:.4}g | {} iteration(s)\n",
        fit.label, fit.quality.n, fit.quality.sse, fit.quality.rmse, fit.quality.iterations
    ));
    out.push_str(&format!(
        "{:<10} {:>14} {:>12} {:>10} {:>10}\n",
        "parameter", "estimate", "std error", "t value", "Pr(>|t|)"
    ));
    out.push_str(&format!(
        "{:-<10} {:-<14} {:-<12} {:-<10} {:-<10}\n",
        "", "", "", "", ""
    ));

    for p in &fit.params {
        out.push_str(&format!(
            "{:<10} {:>14.6e} {:>12.4e} {:>10} {:>10}\n",
            p.name,
            p.estimate,
            p.std_err,
            fmt_t(p.t_value),
            fmt_p(p.p_value)
        ));
    }

    out
}

/// Format the RMSE comparison with a one-sentence conclusion.
pub fn format_comparison(
    cmp: &ModelComparison,
    general: &FittedModel,
    subset: &FittedModel,
) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "RMSE on the {} '{}' rows:\n",
        cmp.n, subset.label
    ));
    out.push_str(&format!(
        "  {:<24} {:.4}g\n",
        format!("general ('{}')", general.label),
        cmp.rmse_general
    ));
    out.push_str(&format!(
        "  {:<24} {:.4}g\n",
        format!("subset ('{}')", subset.label),
        cmp.rmse_subset
    ));

    if cmp.subset_wins() {
        out.push_str(&format!(
            "The subset-specific model fits its own regime better \
             ({:.4}g vs {:.4}g RMSE).\n",
            cmp.rmse_subset, cmp.rmse_general
        ));
    } else {
        out.push_str(&format!(
            "The population-wide model matched or beat the subset model here \
             ({:.4}g vs {:.4}g RMSE); the subset regime is well captured by the \
             pooled fit.\n",
            cmp.rmse_general, cmp.rmse_subset
        ));
    }

    out
}

fn fmt_t(t: f64) -> String {
    if t.is_infinite() {
        "inf".to_string()
    } else {
        format!("{t:.3}")
    }
}

fn fmt_p(p: f64) -> String {
    if p < 1e-4 {
        "<1e-4".to_string()
    } else {
        format!("{p:.4}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FitQuality, ParamEstimate};

    fn sample_fit() -> FittedModel {
        FittedModel {
            label: "population".to_string(),
            a: 2.3e-5,
            b: 3.01,
            params: vec![
                ParamEstimate {
                    name: "a".to_string(),
                    estimate: 2.3e-5,
                    std_err: 1.1e-6,
                    t_value: 20.9,
                    p_value: 3.0e-9,
                },
                ParamEstimate {
                    name: "b".to_string(),
                    estimate: 3.01,
                    std_err: 0.05,
                    t_value: 60.2,
                    p_value: 0.012,
                },
            ],
            quality: FitQuality {
                sse: 1.25,
                rmse: 0.11,
                n: 100,
                iterations: 4,
            },
            dof: 98,
        }
    }

    #[test]
    fn parameter_table_lists_both_parameters() {
        let table = format_parameter_table(&sample_fit());
        assert!(table.contains("parameter"));
        assert!(table.contains("Pr(>|t|)"));
        assert!(table.contains("\na "));
        assert!(table.contains("\nb "));
        assert!(table.contains("<1e-4"));
        assert!(table.contains("0.0120"));
    }

    #[test]
    fn comparison_names_the_winner() {
        let general = sample_fit();
        let mut subset = sample_fit();
        subset.label = "SCUN female".to_string();

        let cmp = ModelComparison {
            rmse_general: 0.8,
            rmse_subset: 0.3,
            n: 24,
        };
        let text = format_comparison(&cmp, &general, &subset);
        assert!(text.contains("24"));
        assert!(text.contains("subset-specific model fits its own regime better"));

        let cmp = ModelComparison {
            rmse_general: 0.3,
            rmse_subset: 0.8,
            n: 24,
        };
        let text = format_comparison(&cmp, &general, &subset);
        assert!(text.contains("population-wide model matched or beat"));
    }
}
