//! Grid Pivot Module
//! Reshapes the long-form `(A, log10E) -> S` table into row/column matrices.

use crate::data::loader::{self, LoaderError};
use polars::prelude::*;
use thiserror::Error;

pub const A_COLUMN: &str = "A";
pub const LOG10E_COLUMN: &str = "log10E";
pub const SHARE_COLUMN: &str = "S";
pub const DOMINANT_COLUMN: &str = "dominant";

pub const REQUIRED_COLUMNS: [&str; 3] = [A_COLUMN, LOG10E_COLUMN, SHARE_COLUMN];

/// Aligned share at or above this value is aligned-dominant.
pub const DOMINANCE_THRESHOLD: f64 = 0.5;

#[derive(Error, Debug)]
pub enum GridError {
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Grid dataset has no rows")]
    Empty,
    #[error("Non-finite value in column '{column}' at row {row}")]
    NonFinite { column: String, row: usize },
    #[error("Duplicate grid cell at A={a}, log10E={log10e}")]
    DuplicateCell { a: f64, log10e: f64 },
    #[error("Incomplete grid: {missing} of {rows}x{cols} cells have no value")]
    IncompleteGrid {
        missing: usize,
        rows: usize,
        cols: usize,
    },
}

/// Pivoted grid: matrices are indexed `[log10E row][A column]`, both axes ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct GridMatrices {
    pub a_values: Vec<f64>,
    pub log10e_values: Vec<f64>,
    pub share: Vec<Vec<f64>>,
    pub dominant: Vec<Vec<f64>>,
}

impl GridMatrices {
    /// `(rows, cols)` = (distinct log10E, distinct A).
    pub fn shape(&self) -> (usize, usize) {
        (self.log10e_values.len(), self.a_values.len())
    }

    /// Min and max of `S` over the grid.
    pub fn share_range(&self) -> (f64, f64) {
        self.share
            .iter()
            .flatten()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }
}

/// Regime for a single share value.
pub fn dominant_for(share: f64) -> i32 {
    if share >= DOMINANCE_THRESHOLD {
        1
    } else {
        0
    }
}

/// Handles validation and pivoting of the heatmap dataset.
pub struct GridPivot;

impl GridPivot {
    /// Schema check; runs before anything is rendered.
    pub fn validate(df: &DataFrame) -> Result<(), GridError> {
        loader::require_columns(df, &REQUIRED_COLUMNS)?;
        Ok(())
    }

    /// Return `df` with a `dominant` column, deriving it from `S` when absent.
    pub fn with_dominant(df: &DataFrame) -> Result<DataFrame, GridError> {
        if loader::has_column(df, DOMINANT_COLUMN) {
            return Ok(df.clone());
        }

        let share = loader::f64_column(df, SHARE_COLUMN)?;
        let dominant: Vec<i32> = share.iter().map(|&s| dominant_for(s)).collect();

        let mut out = df.clone();
        out.with_column(Column::new(DOMINANT_COLUMN.into(), dominant))?;
        tracing::debug!("derived '{}' column from S >= {}", DOMINANT_COLUMN, DOMINANCE_THRESHOLD);
        Ok(out)
    }

    /// Validate, derive `dominant` if needed, and pivot.
    pub fn prepare(df: &DataFrame) -> Result<GridMatrices, GridError> {
        Self::validate(df)?;
        let df = Self::with_dominant(df)?;
        Self::pivot(&df)
    }

    /// Pivot `S` and `dominant` into matrices over the sorted distinct axis values.
    ///
    /// Every `(A, log10E)` pair must occur exactly once across the full product
    /// of distinct values.
    pub fn pivot(df: &DataFrame) -> Result<GridMatrices, GridError> {
        loader::require_columns(df, &[A_COLUMN, LOG10E_COLUMN, SHARE_COLUMN, DOMINANT_COLUMN])?;
        if df.height() == 0 {
            return Err(GridError::Empty);
        }

        let a = finite_column(df, A_COLUMN)?;
        let log10e = finite_column(df, LOG10E_COLUMN)?;
        let share = finite_column(df, SHARE_COLUMN)?;
        let dominant = finite_column(df, DOMINANT_COLUMN)?;

        let a_values = sorted_axis(&a);
        let log10e_values = sorted_axis(&log10e);
        let (rows, cols) = (log10e_values.len(), a_values.len());

        let mut cells: Vec<Vec<Option<(f64, f64)>>> = vec![vec![None; cols]; rows];
        for i in 0..df.height() {
            let r = axis_index(&log10e_values, log10e[i]);
            let c = axis_index(&a_values, a[i]);
            let cell = &mut cells[r][c];
            if cell.is_some() {
                return Err(GridError::DuplicateCell {
                    a: a[i],
                    log10e: log10e[i],
                });
            }
            *cell = Some((share[i], dominant[i]));
        }

        let missing = cells.iter().flatten().filter(|c| c.is_none()).count();
        if missing > 0 {
            return Err(GridError::IncompleteGrid {
                missing,
                rows,
                cols,
            });
        }

        let share_matrix: Vec<Vec<f64>> = cells
            .iter()
            .map(|row| row.iter().flatten().map(|&(s, _)| s).collect::<Vec<f64>>())
            .collect();
        let dominant_matrix: Vec<Vec<f64>> = cells
            .iter()
            .map(|row| row.iter().flatten().map(|&(_, d)| d).collect::<Vec<f64>>())
            .collect();

        tracing::debug!(rows, cols, "pivoted grid");

        Ok(GridMatrices {
            a_values,
            log10e_values,
            share: share_matrix,
            dominant: dominant_matrix,
        })
    }
}

fn finite_column(df: &DataFrame, name: &str) -> Result<Vec<f64>, GridError> {
    let values = loader::f64_column(df, name)?;
    if let Some(row) = values.iter().position(|v| !v.is_finite()) {
        return Err(GridError::NonFinite {
            column: name.to_string(),
            row,
        });
    }
    Ok(values)
}

/// Distinct values, strictly ascending.
fn sorted_axis(values: &[f64]) -> Vec<f64> {
    let mut axis = values.to_vec();
    axis.sort_by(f64::total_cmp);
    axis.dedup();
    axis
}

/// Position of `value` in a sorted axis built from the same column.
fn axis_index(axis: &[f64], value: f64) -> usize {
    axis.partition_point(|&v| v < value)
}
