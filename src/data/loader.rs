//! CSV Data Loader Module
//! Handles CSV file loading, schema checks and typed column extraction using Polars.

use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("No data loaded")]
    NoData,
    #[error("Missing required columns: {0:?}")]
    MissingColumns(Vec<String>),
    #[error("Invalid value in column '{column}' at row {row}")]
    InvalidValue { column: String, row: usize },
}

/// Handles CSV file loading with Polars.
pub struct DataLoader {
    df: Option<DataFrame>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self { df: None }
    }

    /// Load a CSV file (header row required) using Polars.
    pub fn load_csv(&mut self, file_path: &Path) -> Result<&DataFrame, LoaderError> {
        std::fs::metadata(file_path).map_err(|source| LoaderError::Io {
            path: file_path.to_path_buf(),
            source,
        })?;

        // Malformed cells become nulls and are reported per cell on extraction
        let df = LazyCsvReader::new(file_path)
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;

        tracing::debug!(
            path = %file_path.display(),
            rows = df.height(),
            columns = df.width(),
            "loaded csv"
        );

        self.df = Some(df);
        self.df.as_ref().ok_or(LoaderError::NoData)
    }

    /// Take ownership of the loaded DataFrame.
    pub fn into_dataframe(self) -> Result<DataFrame, LoaderError> {
        self.df.ok_or(LoaderError::NoData)
    }
}

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}

/// Names from `required` that `df` lacks, sorted.
pub fn missing_columns(df: &DataFrame, required: &[&str]) -> Vec<String> {
    let mut missing: Vec<String> = required
        .iter()
        .filter(|name| !has_column(df, name))
        .map(|name| name.to_string())
        .collect();
    missing.sort();
    missing.dedup();
    missing
}

/// Fail with [`LoaderError::MissingColumns`] unless every required column exists.
pub fn require_columns(df: &DataFrame, required: &[&str]) -> Result<(), LoaderError> {
    let missing = missing_columns(df, required);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(LoaderError::MissingColumns(missing))
    }
}

/// Extract a column as `f64` values; a null or unparsable cell is an error.
pub fn f64_column(df: &DataFrame, name: &str) -> Result<Vec<f64>, LoaderError> {
    require_columns(df, &[name])?;
    let values = df.column(name)?.cast(&DataType::Float64)?;
    let ca = values.f64()?;

    ca.into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.ok_or_else(|| LoaderError::InvalidValue {
                column: name.to_string(),
                row,
            })
        })
        .collect()
}

/// Extract a column as strings, whatever its inferred dtype.
pub fn string_column(df: &DataFrame, name: &str) -> Result<Vec<String>, LoaderError> {
    require_columns(df, &[name])?;
    let values = df.column(name)?.cast(&DataType::String)?;
    let ca = values.as_materialized_series().str()?;

    ca.into_iter()
        .enumerate()
        .map(|(row, v)| {
            v.map(|s| s.to_string())
                .ok_or_else(|| LoaderError::InvalidValue {
                    column: name.to_string(),
                    row,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;
    use std::io::Write;

    fn write_csv(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "grid.csv", "A,log10E,S\n0.1,0,0.2\n0.5,0,0.7\n");

        let mut loader = DataLoader::new();
        loader.load_csv(&path).unwrap();
        let df = loader.into_dataframe().unwrap();

        let names: Vec<&str> = df.get_column_names().iter().map(|c| c.as_str()).collect();
        assert_eq!(names, vec!["A", "log10E", "S"]);
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn missing_input_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = DataLoader::new();
        let err = loader.load_csv(&dir.path().join("absent.csv")).unwrap_err();
        assert!(matches!(err, LoaderError::Io { .. }));
    }

    #[test]
    fn reports_sorted_missing_columns() {
        let df = df!("A" => [0.1], "log10E" => [0.0]).unwrap();
        let err = require_columns(&df, &["S", "A", "dominant"]).unwrap_err();
        match err {
            LoaderError::MissingColumns(names) => assert_eq!(names, vec!["S", "dominant"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn integer_columns_cast_to_f64() {
        let df = df!("log10E" => [0i64, 1, 2]).unwrap();
        assert_eq!(f64_column(&df, "log10E").unwrap(), vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn malformed_numeric_cell_names_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "bad.csv", "S\n0.25\n0.5\noops\n");

        let mut loader = DataLoader::new();
        let df = loader.load_csv(&path).unwrap().clone();
        let err = f64_column(&df, "S").unwrap_err();
        match err {
            LoaderError::InvalidValue { column, row } => {
                assert_eq!(column, "S");
                assert_eq!(row, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn string_column_renders_numbers() {
        let df = df!("Scenario" => [1i64, 2]).unwrap();
        assert_eq!(string_column(&df, "Scenario").unwrap(), vec!["1", "2"]);
    }
}
