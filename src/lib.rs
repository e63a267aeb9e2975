//! HSPF Utilities Library
//!
//! Post-processing for HSPF hydrological model runs.
//!
//! This library provides tools for:
//! - Decoding yearly PERLND/IMPLND output from HSPF binary (HBN) files
//! - Reading land unit areas, land-cover names and PWATER parameters from UCI files
//! - Building detailed and summary water or quality balance tables per land-cover class
//! - Building per land unit mapping tables for GIS joins
//! - Rendering tables as CSV, TSV or bordered text

pub mod balance;
pub mod config;
pub mod constants;
pub mod error;
pub mod hbn;
pub mod mapping;
pub mod models;
pub mod output;
pub mod selection;
pub mod series;
pub mod templates;
pub mod uci;

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use balance::{detailed, process, summary};
pub use config::{BalanceConfig, OutputConfig};
pub use error::{HspfError, Result};
pub use hbn::{HbnFile, TimeSeriesSource};
pub use mapping::mapping;
pub use models::{Constituent, OperationType, ReportKind};
pub use output::{FloatFormat, TableFormat};
pub use uci::{UciModel, parameters};
