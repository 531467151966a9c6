//! Scenario Summary Module
//! Turns Monte Carlo percentile rows into the display strings of the summary table.

use crate::data::loader::{self, LoaderError};
use polars::prelude::*;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const SCENARIO_COLUMN: &str = "Scenario";
pub const PROBABILITY_COLUMN: &str = "P(C_m > C_a)";
pub const CA_COLUMNS: [&str; 3] = ["log10(C_a)_p05", "log10(C_a)_p50", "log10(C_a)_p95"];
pub const CM_COLUMNS: [&str; 3] = ["log10(C_m)_p05", "log10(C_m)_p50", "log10(C_m)_p95"];

/// Column headers of the rendered table; `\n` breaks a header over two lines.
pub const TABLE_HEADERS: [&str; 4] = [
    "Scenario",
    "log10(C_a)\n[p05, p50, p95]",
    "log10(C_m)\n[p05, p50, p95]",
    "P(C_m > C_a)",
];

/// Journal-friendly labels for the three tightened scenarios, in input order.
pub const DEFAULT_SCENARIO_LABELS: [&str; 3] = [
    "Base reality\n(conservative priors; tightened)",
    "Forensic simulation–weighted\npriors (tightened; C_m‑dominant)",
    "Alignment intervention\n(optimistic stress‑test; still C_m‑dominant)",
];

#[derive(Error, Debug)]
pub enum SummaryError {
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error("Failed to read label file {path}: {source}")]
    LabelFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Label file {path} is neither a JSON array nor a JSON object of strings: {source}")]
    LabelFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Replacement labels for the `Scenario` column.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ScenarioLabels {
    /// Applied by position, and only when the row count equals the list length.
    Positional(Vec<String>),
    /// Applied per row by original scenario name; unmatched rows keep their name.
    Keyed(BTreeMap<String, String>),
}

impl Default for ScenarioLabels {
    fn default() -> Self {
        ScenarioLabels::Positional(
            DEFAULT_SCENARIO_LABELS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
    }
}

impl ScenarioLabels {
    /// Read a mapping from JSON: an array is positional, an object is keyed.
    pub fn from_json_file(path: &Path) -> Result<Self, SummaryError> {
        let raw = std::fs::read_to_string(path).map_err(|source| SummaryError::LabelFile {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| SummaryError::LabelFormat {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply(&self, scenarios: Vec<String>) -> Vec<String> {
        match self {
            ScenarioLabels::Positional(labels) => {
                if labels.len() == scenarios.len() {
                    labels.clone()
                } else {
                    tracing::debug!(
                        rows = scenarios.len(),
                        labels = labels.len(),
                        "row count differs from label count, keeping original scenario names"
                    );
                    scenarios
                }
            }
            ScenarioLabels::Keyed(map) => scenarios
                .into_iter()
                .map(|name| map.get(&name).cloned().unwrap_or(name))
                .collect(),
        }
    }
}

/// One formatted table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub scenario: String,
    pub ca_interval: String,
    pub cm_interval: String,
    pub probability: String,
}

impl SummaryRow {
    pub fn cells(&self) -> [&str; 4] {
        [
            self.scenario.as_str(),
            self.ca_interval.as_str(),
            self.cm_interval.as_str(),
            self.probability.as_str(),
        ]
    }
}

/// Formats scenario summaries for the appendix table.
pub struct SummaryFormatter;

impl SummaryFormatter {
    /// `[p05, p50, p95]` with two decimals each.
    pub fn format_percentiles(p05: f64, p50: f64, p95: f64) -> String {
        format!("[{:.2}, {:.2}, {:.2}]", p05, p50, p95)
    }

    /// Three decimals with trailing zeros and a dangling point removed.
    pub fn format_probability(p: f64) -> String {
        format!("{:.3}", p)
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }

    fn intervals(df: &DataFrame, columns: &[&str; 3]) -> Result<Vec<String>, LoaderError> {
        let p05 = loader::f64_column(df, columns[0])?;
        let p50 = loader::f64_column(df, columns[1])?;
        let p95 = loader::f64_column(df, columns[2])?;

        Ok(p05
            .iter()
            .zip(&p50)
            .zip(&p95)
            .map(|((&lo, &mid), &hi)| Self::format_percentiles(lo, mid, hi))
            .collect())
    }

    /// Scenario names from the input, or `Scenario N` when the column is absent.
    fn scenario_names(df: &DataFrame) -> Result<Vec<String>, LoaderError> {
        if loader::has_column(df, SCENARIO_COLUMN) {
            loader::string_column(df, SCENARIO_COLUMN)
        } else {
            tracing::warn!("no '{}' column, numbering rows instead", SCENARIO_COLUMN);
            Ok((1..=df.height()).map(|i| format!("Scenario {i}")).collect())
        }
    }

    /// Build display rows, substituting scenario labels when `labels` applies.
    pub fn build_rows(
        df: &DataFrame,
        labels: Option<&ScenarioLabels>,
    ) -> Result<Vec<SummaryRow>, SummaryError> {
        let mut required: Vec<&str> = Vec::with_capacity(7);
        required.extend(CA_COLUMNS);
        required.extend(CM_COLUMNS);
        required.push(PROBABILITY_COLUMN);
        loader::require_columns(df, &required)?;

        let mut scenarios = Self::scenario_names(df)?;
        if let Some(labels) = labels {
            scenarios = labels.apply(scenarios);
        }

        let ca = Self::intervals(df, &CA_COLUMNS)?;
        let cm = Self::intervals(df, &CM_COLUMNS)?;
        let probabilities = loader::f64_column(df, PROBABILITY_COLUMN)?;

        let rows = scenarios
            .into_iter()
            .zip(ca)
            .zip(cm)
            .zip(probabilities)
            .map(|(((scenario, ca_interval), cm_interval), p)| SummaryRow {
                scenario,
                ca_interval,
                cm_interval,
                probability: Self::format_probability(p),
            })
            .collect();

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    fn summary_frame(scenarios: &[&str]) -> DataFrame {
        let n = scenarios.len();
        let probs: Vec<f64> = [0.9, 1.0, 0.333, 0.5].iter().cycle().take(n).copied().collect();
        df!(
            "Scenario" => scenarios.to_vec(),
            "log10(C_a)_p05" => vec![1.234; n],
            "log10(C_a)_p50" => vec![5.678; n],
            "log10(C_a)_p95" => vec![9.012; n],
            "log10(C_m)_p05" => vec![2.0; n],
            "log10(C_m)_p50" => vec![3.5; n],
            "log10(C_m)_p95" => vec![4.999; n],
            "P(C_m > C_a)" => probs,
        )
        .unwrap()
    }

    #[test]
    fn percentile_triple_uses_two_decimals() {
        assert_eq!(
            SummaryFormatter::format_percentiles(1.234, 5.678, 9.012),
            "[1.23, 5.68, 9.01]"
        );
        assert_eq!(
            SummaryFormatter::format_percentiles(-0.5, 0.0, 12.0),
            "[-0.50, 0.00, 12.00]"
        );
    }

    #[test]
    fn probability_trims_trailing_zeros() {
        assert_eq!(SummaryFormatter::format_probability(0.900), "0.9");
        assert_eq!(SummaryFormatter::format_probability(1.000), "1");
        assert_eq!(SummaryFormatter::format_probability(0.333), "0.333");
        assert_eq!(SummaryFormatter::format_probability(0.0), "0");
        assert_eq!(SummaryFormatter::format_probability(0.12345), "0.123");
    }

    #[test]
    fn three_rows_take_default_labels() {
        let df = summary_frame(&["a", "b", "c"]);
        let rows = SummaryFormatter::build_rows(&df, Some(&ScenarioLabels::default())).unwrap();

        let names: Vec<&str> = rows.iter().map(|r| r.scenario.as_str()).collect();
        assert_eq!(names, DEFAULT_SCENARIO_LABELS.to_vec());
        assert_eq!(rows[0].ca_interval, "[1.23, 5.68, 9.01]");
        assert_eq!(rows[0].cm_interval, "[2.00, 3.50, 5.00]");
        assert_eq!(rows[0].probability, "0.9");
        assert_eq!(rows[1].probability, "1");
        assert_eq!(rows[2].probability, "0.333");
    }

    #[test]
    fn other_row_counts_keep_original_names() {
        let labels = ScenarioLabels::default();
        for names in [vec!["x", "y"], vec!["w", "x", "y", "z"]] {
            let df = summary_frame(&names);
            let rows = SummaryFormatter::build_rows(&df, Some(&labels)).unwrap();
            let got: Vec<&str> = rows.iter().map(|r| r.scenario.as_str()).collect();
            assert_eq!(got, names);
        }
    }

    #[test]
    fn disabled_labels_keep_names() {
        let df = summary_frame(&["a", "b", "c"]);
        let rows = SummaryFormatter::build_rows(&df, None).unwrap();
        assert_eq!(rows[2].scenario, "c");
    }

    #[test]
    fn keyed_labels_replace_matches_only() {
        let labels = ScenarioLabels::Keyed(BTreeMap::from([(
            "base".to_string(),
            "Base reality".to_string(),
        )]));
        let df = summary_frame(&["alt", "base"]);
        let rows = SummaryFormatter::build_rows(&df, Some(&labels)).unwrap();
        assert_eq!(rows[0].scenario, "alt");
        assert_eq!(rows[1].scenario, "Base reality");
    }

    #[test]
    fn label_json_shapes() {
        let positional: ScenarioLabels = serde_json::from_str(r#"["one", "two"]"#).unwrap();
        assert_eq!(
            positional,
            ScenarioLabels::Positional(vec!["one".into(), "two".into()])
        );

        let keyed: ScenarioLabels = serde_json::from_str(r#"{"a": "Alpha"}"#).unwrap();
        assert!(matches!(keyed, ScenarioLabels::Keyed(ref m) if m["a"] == "Alpha"));

        assert!(serde_json::from_str::<ScenarioLabels>("42").is_err());
    }

    #[test]
    fn missing_percentile_column_fails() {
        let df = summary_frame(&["a"]).drop("log10(C_m)_p95").unwrap();
        let err = SummaryFormatter::build_rows(&df, None).unwrap_err();
        match err {
            SummaryError::Loader(LoaderError::MissingColumns(names)) => {
                assert_eq!(names, vec!["log10(C_m)_p95"])
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn absent_scenario_column_numbers_rows() {
        let df = summary_frame(&["a", "b"]).drop("Scenario").unwrap();
        let rows = SummaryFormatter::build_rows(&df, None).unwrap();
        assert_eq!(rows[0].scenario, "Scenario 1");
        assert_eq!(rows[1].scenario, "Scenario 2");
    }
}
