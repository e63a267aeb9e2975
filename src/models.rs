//! Core data structures and types for HSPF post-processing.
//!
//! Defines operation types, report selectors, the land-cover class mapping
//! and the decoded binary column keys shared by the report builders.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::HspfError;

/// Land segment operation types that carry water and quality balances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OperationType {
    /// Pervious land segment
    Perlnd,
    /// Impervious land segment
    Implnd,
}

impl OperationType {
    /// Both operation types in report order
    pub const ALL: [OperationType; 2] = [OperationType::Perlnd, OperationType::Implnd];

    /// Name used in UCI and HBN files
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Perlnd => "PERLND",
            OperationType::Implnd => "IMPLND",
        }
    }

    /// Single-letter prefix used by the mapping report
    pub fn initial(&self) -> char {
        match self {
            OperationType::Perlnd => 'P',
            OperationType::Implnd => 'I',
        }
    }

    /// Parse an operation name, returning None for other HSPF operations
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "PERLND" => Some(OperationType::Perlnd),
            "IMPLND" => Some(OperationType::Implnd),
            _ => None,
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Constituent summarized by a balance report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum Constituent {
    /// PWATER/IWATER
    Flow,
    /// PQUAL/IQUAL, requires quality names
    Qual,
}

impl FromStr for Constituent {
    type Err = HspfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "flow" => Ok(Constituent::Flow),
            "qual" => Ok(Constituent::Qual),
            other => Err(HspfError::Configuration {
                message: format!("Unknown constituent '{}', expected 'flow' or 'qual'", other),
            }),
        }
    }
}

/// Balance report layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportKind {
    Detailed,
    Summary,
}

/// Land-cover class of a land unit.
///
/// Units 1, 21, 41, ... belong to class 1 with the default modulus of 20.
/// Ids that are an exact multiple of the modulus belong to class `modulus`,
/// so every class lies in `1..=modulus`.
pub fn class_of(unit: u32, modulus: u32) -> u32 {
    match unit % modulus {
        0 => modulus,
        remainder => remainder,
    }
}

/// Display name of a land-cover class column
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassLabel {
    /// No name known, the column shows the class number only
    Number,
    /// Named from PERLND GEN-INFO; may be empty for classes without data
    Named(String),
}

impl ClassLabel {
    /// Column header for `class`
    pub fn header(&self, class: u32) -> String {
        match self {
            ClassLabel::Number => class.to_string(),
            ClassLabel::Named(name) => format!("{}-{}", class, name),
        }
    }
}

/// Decoded binary column `{OPERATION}_{UNIT}_{VARIABLE}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnKey {
    pub operation: OperationType,
    pub unit: u32,
    pub variable: String,
}

impl ColumnKey {
    /// Parse a binary column name, None for non land-segment columns
    pub fn parse(name: &str) -> Option<Self> {
        let mut parts = name.splitn(3, '_');
        let operation = OperationType::parse(parts.next()?)?;
        let unit = parts.next()?.trim().parse::<u32>().ok()?;
        let variable = parts.next()?.to_string();
        Some(Self {
            operation,
            unit,
            variable,
        })
    }

    /// Column name in the loaded table
    pub fn column_name(&self) -> String {
        format!("{}_{}_{}", self.operation, self.unit, self.variable)
    }
}
