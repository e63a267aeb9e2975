//! Error handling for HSPF post-processing operations.
//!
//! Every fatal condition is a typed variant with a readable message. The
//! negative-value check is not an error; it is reported through `tracing`.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HspfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error(
        "File {} does not exist. A UCI file was supplied, so the binary \
         output file it describes is required.",
        path.display()
    )]
    MissingBinaryFile { path: PathBuf },

    #[error(
        "The binary file \"{}\" does not have consistent ending months between \
         PERLND and IMPLND ({details}). This could be caused by the BYREND \
         (Binary YeaR END) being set differently in the PERLND:BINARY-INFO and \
         IMPLND:BINARY-INFO, or you could have the PRINT-INFO bug. To work \
         around the PRINT-INFO bug, add a PERLND PRINT-INFO block, setting the \
         PYREND there will actually work in the BINARY-INFO block.",
        path.display()
    )]
    InconsistentYearEnd { path: PathBuf, details: String },

    #[error("Invalid HSPF binary file {} - {reason}", path.display())]
    InvalidBinary { path: PathBuf, reason: String },

    #[error(
        "The land use element must be an integer from 1 to 999 inclusive, instead of {value}."
    )]
    InvalidUnitId { value: i64 },

    #[error("Could not parse land use element filter \"{expression}\": {reason}")]
    InvalidUnitFilter { expression: String, reason: String },

    #[error("Block \"{block}\" not found in UCI file: {}", path.display())]
    MissingBlock { path: PathBuf, block: String },

    #[error("Invalid UCI content in {} - {reason}", path.display())]
    InvalidUci { path: PathBuf, reason: String },

    #[error("Year {year} is not present in the binary output")]
    YearNotFound { year: i32 },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Invalid output format: {message}")]
    InvalidFormat { message: String },
}

pub type Result<T> = std::result::Result<T, HspfError>;
