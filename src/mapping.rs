//! GIS mapping table.
//!
//! One row per land unit with the mean yearly value of every PERLND and
//! IMPLND variable, ready to join to land unit polygons. Columns are named
//! `P_{VARIABLE}` or `I_{VARIABLE}`.

use crate::constants::UNIT_INDEX_COLUMN;
use crate::error::Result;
use crate::hbn::{HbnFile, TimeSeriesSource};
use crate::series::YearlySeries;
use polars::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::debug;

/// Mapping table of an HBN file
pub fn mapping(hbn: &Path, year: Option<i32>, index_prefix: &str) -> Result<DataFrame> {
    let source = HbnFile::open(hbn)?;
    mapping_table(&source, year, index_prefix)
}

/// Mapping table of any yearly source
pub fn mapping_table(
    source: &dyn TimeSeriesSource,
    year: Option<i32>,
    index_prefix: &str,
) -> Result<DataFrame> {
    let table = source.yearly_table()?;
    let yearly = YearlySeries::from_frame(&table, year)?;
    yearly.warn_negative(None);

    let mut cells: BTreeMap<(u32, String), f64> = BTreeMap::new();
    let mut names = BTreeSet::new();
    for series in &yearly.series {
        let name = format!(
            "{}_{}",
            series.key.operation.initial(),
            series.key.variable
        );
        names.insert(name.clone());

        let present: Vec<f64> = series.present().map(|(_, value)| value).collect();
        if present.is_empty() {
            continue;
        }
        let mean = present.iter().sum::<f64>() / present.len() as f64;
        cells.insert((series.key.unit, name), mean);
    }

    let units: BTreeSet<u32> = yearly.series.iter().map(|series| series.key.unit).collect();

    let index = if index_prefix.is_empty() {
        Column::new(
            UNIT_INDEX_COLUMN.into(),
            units.iter().map(|unit| i64::from(*unit)).collect::<Vec<_>>(),
        )
    } else {
        Column::new(
            UNIT_INDEX_COLUMN.into(),
            units
                .iter()
                .map(|unit| format!("{}{}", index_prefix, unit))
                .collect::<Vec<_>>(),
        )
    };

    let mut columns = vec![index];
    for name in &names {
        let values: Vec<Option<f64>> = units
            .iter()
            .map(|unit| cells.get(&(*unit, name.clone())).copied())
            .collect();
        columns.push(Column::new(name.as_str().into(), values));
    }

    debug!(
        "Mapping table: {} land units, {} variables",
        units.len(),
        names.len()
    );
    Ok(DataFrame::new(columns)?)
}
