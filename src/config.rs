//! Configuration management and validation.
//!
//! Provides the settings of a balance report (modulus, year, constituent,
//! quality names, land unit filter) and of table output (layout and float
//! format), with defaults matching the command line.

use crate::constants::{DEFAULT_BALANCE_FLOAT_FORMAT, DEFAULT_MODULUS, DEFAULT_TABLE_FLOAT_FORMAT};
use crate::error::{HspfError, Result};
use crate::models::Constituent;
use crate::output::{FloatFormat, FloatStyle, TableFormat};
use crate::selection::parse_unit_filter;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Settings for the detailed and summary balance reports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceConfig {
    /// Divisor mapping land unit ids onto land-cover classes
    pub modulus: u32,

    /// Restrict the report to one year of the binary output
    pub year: Option<i32>,

    /// Water or quality constituent
    pub constituent: Constituent,

    /// Quality names for the `qual` constituent, in report order
    pub qual_names: Vec<String>,

    /// Land unit filter such as `101:119+221:239`
    pub unit_filter: Option<String>,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            modulus: DEFAULT_MODULUS,
            year: None,
            constituent: Constituent::Flow,
            qual_names: Vec::new(),
            unit_filter: None,
        }
    }
}

impl BalanceConfig {
    /// Set the land-cover modulus
    pub fn with_modulus(mut self, modulus: u32) -> Self {
        self.modulus = modulus;
        self
    }

    /// Report a single year
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_constituent(mut self, constituent: Constituent) -> Self {
        self.constituent = constituent;
        self
    }

    /// Quality names from a comma separated list
    pub fn with_qual_names(mut self, names: &str) -> Self {
        self.qual_names = names
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect();
        self
    }

    /// Keep only the land units matched by `expression`
    pub fn with_unit_filter(mut self, expression: &str) -> Self {
        self.unit_filter = Some(expression.to_string());
        self
    }

    /// Land unit ids selected by the filter, None when unfiltered
    pub fn unit_ids(&self) -> Result<Option<Vec<u32>>> {
        self.unit_filter
            .as_deref()
            .map(parse_unit_filter)
            .transpose()
    }

    /// Check settings that can be validated before reading any file
    pub fn validate(&self) -> Result<()> {
        if self.modulus == 0 {
            return Err(HspfError::Configuration {
                message: "modulus must be at least 1".to_string(),
            });
        }
        if self.constituent == Constituent::Qual && self.qual_names.is_empty() {
            return Err(HspfError::Configuration {
                message: "constituent 'qual' requires at least one name in 'qualnames', \
                          for example --qualnames 'TOTAL N,TOTAL P'"
                    .to_string(),
            });
        }
        self.unit_ids()?;

        debug!(
            "Balance configuration: modulus {}, year {:?}, {:?} {:?}, units {:?}",
            self.modulus, self.year, self.constituent, self.qual_names, self.unit_filter
        );
        Ok(())
    }
}

/// Settings for rendering a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub table_format: TableFormat,
    pub float_format: FloatFormat,
}

impl Default for OutputConfig {
    /// Balance report defaults: `csv_nos` with two decimals
    fn default() -> Self {
        Self {
            table_format: TableFormat::CsvNos,
            float_format: FloatFormat::new(Some(2), FloatStyle::Fixed),
        }
    }
}

impl OutputConfig {
    /// Mapping and parameter table defaults: `csv_nos` with general floats
    pub fn for_unit_tables() -> Self {
        Self {
            table_format: TableFormat::CsvNos,
            float_format: FloatFormat::new(None, FloatStyle::General),
        }
    }

    pub fn with_table_format(mut self, format: TableFormat) -> Self {
        self.table_format = format;
        self
    }

    pub fn with_float_format(mut self, format: FloatFormat) -> Self {
        self.float_format = format;
        self
    }
}
