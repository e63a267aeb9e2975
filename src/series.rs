//! Land segment series of a yearly table.
//!
//! Shared by the balance and mapping reports: restricts the loaded table to
//! one year when asked, keeps the PERLND/IMPLND columns and reports
//! negative values, which usually indicate an upstream model problem.

use crate::constants::YEAR_COLUMN;
use crate::error::{HspfError, Result};
use crate::models::ColumnKey;
use polars::prelude::*;
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, warn};

/// One `{OPERATION}_{UNIT}_{VARIABLE}` column of the yearly table
#[derive(Debug, Clone, PartialEq)]
pub struct LandSeries {
    pub key: ColumnKey,
    pub values: Vec<Option<f64>>,
}

impl LandSeries {
    /// Non-null values with their row index
    pub fn present(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(row, value)| value.map(|v| (row, v)))
    }
}

/// Yearly land segment columns, sorted by operation, unit and variable
#[derive(Debug, Clone, Default)]
pub struct YearlySeries {
    pub years: Vec<i32>,
    pub series: Vec<LandSeries>,
}

impl YearlySeries {
    /// Extract land segment columns, optionally for a single year
    pub fn from_frame(frame: &DataFrame, year: Option<i32>) -> Result<Self> {
        let frame = match year {
            Some(year) => {
                let selected = frame
                    .clone()
                    .lazy()
                    .filter(col(YEAR_COLUMN).eq(lit(year)))
                    .collect()?;
                if selected.height() == 0 {
                    return Err(HspfError::YearNotFound { year });
                }
                selected
            }
            None => frame.clone(),
        };

        let years: Vec<i32> = frame
            .column(YEAR_COLUMN)?
            .cast(&DataType::Int32)?
            .i32()?
            .into_iter()
            .map(|year| year.unwrap_or_default())
            .collect();

        let mut series = Vec::new();
        for column in frame.get_columns() {
            let Some(key) = ColumnKey::parse(column.name().as_str()) else {
                continue;
            };
            let values: Vec<Option<f64>> = column
                .cast(&DataType::Float64)?
                .f64()?
                .into_iter()
                .map(|value| value.filter(|v| !v.is_nan()))
                .collect();
            series.push(LandSeries { key, values });
        }
        series.sort_by(|a, b| a.key.cmp(&b.key));

        debug!(
            "Selected {} land segment series over {} years",
            series.len(),
            years.len()
        );

        Ok(Self { years, series })
    }

    /// Keep only the listed land units
    pub fn retain_units(&mut self, units: &[u32]) {
        let keep: HashSet<u32> = units.iter().copied().collect();
        self.series.retain(|series| keep.contains(&series.key.unit));
    }

    /// Cells holding negative values as (year, column name), limited to
    /// `variables` when given
    pub fn negative_cells(&self, variables: Option<&BTreeSet<String>>) -> Vec<(i32, String)> {
        let mut cells = Vec::new();
        let selected = self.series.iter().filter(|series| {
            variables.is_none_or(|variables| variables.contains(&series.key.variable))
        });
        for series in selected {
            for (row, value) in series.present() {
                if value < 0.0 {
                    let year = self.years.get(row).copied().unwrap_or_default();
                    cells.push((year, series.key.column_name()));
                }
            }
        }
        cells
    }

    /// Log negative values among the series a report reads
    pub fn warn_negative(&self, variables: Option<&BTreeSet<String>>) {
        let cells = self.negative_cells(variables);
        if cells.is_empty() {
            return;
        }
        let listing: Vec<String> = cells
            .iter()
            .map(|(year, column)| format!("{} {}", year, column))
            .collect();
        warn!(
            "This may be OK, but FYI there are negative values at: {}",
            listing.join(", ")
        );
    }
}
