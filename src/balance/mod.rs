//! Water and mass balance reports.
//!
//! [`detailed`] and [`summary`] read an HBN file, and optionally a UCI file
//! for areas and land-cover names, then reduce the yearly land segment
//! series to one value per land-cover class for every row of the report
//! template. [`process`] is the shared core and accepts any
//! [`TimeSeriesSource`].

pub mod aggregate;
pub mod assemble;

use crate::config::BalanceConfig;
use crate::error::{HspfError, Result};
use crate::hbn::{HbnFile, TimeSeriesSource};
use crate::models::ReportKind;
use crate::series::YearlySeries;
use crate::templates::balance_terms;
use crate::uci::UciModel;
use polars::prelude::DataFrame;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info};

pub use aggregate::{Aggregates, aggregate};
pub use assemble::{AreaSummary, assemble};

/// Detailed balance table, one row per HSPF variable
pub fn detailed(hbn: &Path, uci: Option<&Path>, config: &BalanceConfig) -> Result<DataFrame> {
    report(ReportKind::Detailed, hbn, uci, config)
}

/// Summary balance table with combined rainfall, runoff and evaporation rows
pub fn summary(hbn: &Path, uci: Option<&Path>, config: &BalanceConfig) -> Result<DataFrame> {
    report(ReportKind::Summary, hbn, uci, config)
}

fn report(
    kind: ReportKind,
    hbn: &Path,
    uci: Option<&Path>,
    config: &BalanceConfig,
) -> Result<DataFrame> {
    config.validate()?;

    let model = match uci {
        Some(uci) => {
            if !hbn.exists() {
                return Err(HspfError::MissingBinaryFile {
                    path: hbn.to_path_buf(),
                });
            }
            let model = UciModel::from_path(uci, config.modulus)?;
            debug!("Areas and land-cover names from {}", model.path().display());
            Some(model)
        }
        None => None,
    };

    let source = HbnFile::open(hbn)?;
    debug!(
        "Read {} yearly series from {}",
        source.column_names().count(),
        source.path().display()
    );
    process(&source, model.as_ref(), kind, config)
}

/// Build a balance table from a yearly source
pub fn process(
    source: &dyn TimeSeriesSource,
    uci: Option<&UciModel>,
    kind: ReportKind,
    config: &BalanceConfig,
) -> Result<DataFrame> {
    config.validate()?;
    if let Some(uci) = uci.filter(|uci| uci.modulus() != config.modulus) {
        return Err(HspfError::Configuration {
            message: format!(
                "UCI model was read with modulus {} but the report uses {}",
                uci.modulus(),
                config.modulus
            ),
        });
    }
    let area_weighted = uci.is_some();
    let terms = balance_terms(config.constituent, kind, area_weighted, &config.qual_names)?;

    let table = source.yearly_table()?;
    let mut yearly = YearlySeries::from_frame(&table, config.year)?;
    if let Some(units) = config.unit_ids()? {
        yearly.retain_units(&units);
        debug!("Unit filter kept {} land segment series", yearly.series.len());
    }

    let variables: BTreeSet<String> = terms
        .iter()
        .flat_map(|term| term.sources.iter().map(|(variable, _)| variable.clone()))
        .collect();
    yearly.warn_negative(Some(&variables));

    let aggregates = aggregate(&yearly, &variables, uci, config.modulus);
    let frame = assemble(&terms, &aggregates, area_weighted)?;

    info!(
        "Built {:?} {:?} balance with {} rows and {} class columns",
        kind,
        config.constituent,
        frame.height(),
        frame.width().saturating_sub(2)
    );
    Ok(frame)
}

#[cfg(test)]
mod tests;
