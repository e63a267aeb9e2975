//! PWATER parameter table extraction.
//!
//! Reads the PWAT-PARM2, PWAT-PARM3 and PWAT-PARM4 tables of the PERLND block
//! into one row per land unit. A record covers a unit range (`start`, optional
//! inclusive `end`) and holds one 10-column field per parameter. A `~n~`
//! marker in place of the values reads them from entry `n` of the
//! supplemental file named by the `PESTSU` line of the FILES block.

use crate::constants::uci as layout;
use crate::constants::{PARAMETER_BLOCKS, PARAMETER_DEFAULTS, UNIT_INDEX_COLUMN};
use crate::error::{HspfError, Result};
use crate::uci::blocks::{field, find_block, truncate};
use polars::prelude::*;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Parameter values of one land unit, keyed by parameter name
type UnitParameters = HashMap<&'static str, f64>;

/// Parameter values for every land unit found in the PWAT-PARM tables
#[derive(Debug, Clone, Default)]
pub struct ParameterTable {
    rows: BTreeMap<u32, UnitParameters>,
}

impl ParameterTable {
    /// Parameter names in output order
    pub fn parameter_names() -> impl Iterator<Item = &'static str> {
        PARAMETER_BLOCKS
            .iter()
            .flat_map(|(_, names)| names.iter().copied())
    }

    pub fn get(&self, unit: u32, parameter: &str) -> Option<f64> {
        self.rows.get(&unit)?.get(parameter).copied()
    }

    pub fn units(&self) -> impl Iterator<Item = u32> + '_ {
        self.rows.keys().copied()
    }

    /// Convert to a frame indexed by `prefix + delimiter + unit`, ordered by
    /// unit number. Without a prefix or delimiter the index is the integer id.
    pub fn to_frame(&self, index_prefix: &str, index_delimiter: &str) -> Result<DataFrame> {
        let index = if index_prefix.is_empty() && index_delimiter.is_empty() {
            Column::new(
                UNIT_INDEX_COLUMN.into(),
                self.units().map(i64::from).collect::<Vec<_>>(),
            )
        } else {
            Column::new(
                UNIT_INDEX_COLUMN.into(),
                self.units()
                    .map(|unit| format!("{}{}{}", index_prefix, index_delimiter, unit))
                    .collect::<Vec<_>>(),
            )
        };

        let mut columns = vec![index];
        for name in Self::parameter_names() {
            let values: Vec<Option<f64>> = self
                .rows
                .values()
                .map(|row| row.get(name).copied())
                .collect();
            columns.push(Column::new(name.into(), values));
        }

        Ok(DataFrame::new(columns)?)
    }

    /// Read the PWAT-PARM tables of a UCI file
    pub fn from_path(uci: &Path) -> Result<Self> {
        let raw = fs::read(uci)?;
        let content = String::from_utf8_lossy(&raw);
        let lines: Vec<String> = content
            .lines()
            .filter(|line| !line.contains(layout::COMMENT_MARKER))
            .map(|line| truncate(line, layout::PARAMETER_LINE_WIDTH).trim_end().to_string())
            .filter(|line| !line.is_empty())
            .collect();

        let supplemental = match supplemental_file(uci, &lines) {
            Some(path) => read_supplemental(&path)?,
            None => HashMap::new(),
        };

        Self::from_lines(uci, &lines, &supplemental)
    }

    /// Parse the PWAT-PARM tables from comment-free UCI lines
    pub fn from_lines(
        uci: &Path,
        lines: &[String],
        supplemental: &HashMap<String, Vec<f64>>,
    ) -> Result<Self> {
        let marker = Regex::new(r"^~([0-9]+)~").map_err(|e| HspfError::Configuration {
            message: format!("invalid supplemental marker pattern: {}", e),
        })?;
        let invalid = |reason: String| HspfError::InvalidUci {
            path: uci.to_path_buf(),
            reason,
        };

        let mut table = Self::default();

        for (block, names) in PARAMETER_BLOCKS {
            let start = format!("  {}", block);
            let end = format!("  END {}", block);
            let records = find_block(uci, lines, &start, &end)?;
            let records = &records[1..records.len() - 1];

            for line in records {
                let (first, last) = layout::UNIT_ID_FIELD;
                let range_start = field(line, first, last).trim().parse::<u32>().map_err(|_| {
                    invalid(format!("{} record without a unit id: '{}'", block, line))
                })?;
                let (first, last) = layout::RANGE_END_FIELD;
                let range_end = field(line, first, last)
                    .trim()
                    .parse::<u32>()
                    .unwrap_or(range_start);

                let values_text = field(line, layout::VALUE_START_COLUMN, usize::MAX).trim_start();
                let values = match marker.captures(values_text) {
                    Some(captures) => {
                        let key = &captures[1];
                        let values = supplemental.get(key).ok_or_else(|| {
                            invalid(format!("supplemental entry ~{}~ not found", key))
                        })?;
                        names
                            .iter()
                            .enumerate()
                            .map(|(i, name)| {
                                values.get(i).copied().ok_or_else(|| {
                                    invalid(format!(
                                        "supplemental entry ~{}~ has no value for {}",
                                        key, name
                                    ))
                                })
                            })
                            .collect::<Result<Vec<f64>>>()?
                    }
                    None => names
                        .iter()
                        .enumerate()
                        .map(|(i, name)| fixed_width_value(line, i, name).map_err(&invalid))
                        .collect::<Result<Vec<f64>>>()?,
                };

                for unit in range_start..=range_end {
                    let row = table.rows.entry(unit).or_default();
                    for (name, value) in names.iter().zip(&values) {
                        if row.insert(*name, *value).is_some() {
                            return Err(invalid(format!(
                                "{} is given more than once for unit {}",
                                name, unit
                            )));
                        }
                    }
                }
            }
        }

        debug!(
            "Extracted PWATER parameters for {} land units from {}",
            table.rows.len(),
            uci.display()
        );
        Ok(table)
    }
}

/// Extract the parameter table of a UCI file
pub fn parameters(uci: &Path, index_prefix: &str, index_delimiter: &str) -> Result<DataFrame> {
    ParameterTable::from_path(uci)?.to_frame(index_prefix, index_delimiter)
}

/// Value of the `index`-th parameter field, falling back to the HSPF default
/// for blank fields.
fn fixed_width_value(line: &str, index: usize, name: &str) -> std::result::Result<f64, String> {
    let start = layout::VALUE_START_COLUMN + index * layout::VALUE_FIELD_WIDTH;
    let text = field(line, start, start + layout::VALUE_FIELD_WIDTH).trim();

    if text.is_empty() {
        return PARAMETER_DEFAULTS
            .iter()
            .find(|(parameter, _)| *parameter == name)
            .map(|(_, default)| *default)
            .ok_or_else(|| format!("{} is blank and has no default: '{}'", name, line));
    }

    text.parse::<f64>()
        .map_err(|_| format!("{} value '{}' is not a number", name, text))
}

/// Supplemental file named by the FILES block, relative to the UCI directory
fn supplemental_file(uci: &Path, lines: &[String]) -> Option<PathBuf> {
    let files = find_block(uci, lines, layout::FILES, "END FILES").ok()?;

    let name = files
        .iter()
        .filter_map(|line| {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            match tokens.as_slice() {
                [kind, _, name, ..] if *kind == layout::SUPPLEMENTAL_FILE_TYPE => {
                    Some(name.to_string())
                }
                _ => None,
            }
        })
        .last();

    name.map(|name| {
        uci.parent()
            .unwrap_or_else(|| Path::new("."))
            .join(name)
    })
}

/// Read a supplemental file of alternating key and value lines
fn read_supplemental(path: &Path) -> Result<HashMap<String, Vec<f64>>> {
    let content = fs::read_to_string(path)?;
    let lines: Vec<&str> = content
        .lines()
        .filter(|line| !line.contains(layout::COMMENT_MARKER))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let mut entries = HashMap::new();
    for pair in lines.chunks_exact(2) {
        let key = pair[0]
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .trim_matches('~')
            .to_string();
        let values = pair[1]
            .split_whitespace()
            .map(|value| {
                value.parse::<f64>().map_err(|_| HspfError::InvalidUci {
                    path: path.to_path_buf(),
                    reason: format!("supplemental value '{}' is not a number", value),
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        entries.insert(key, values);
    }

    debug!(
        "Read {} supplemental entries from {}",
        entries.len(),
        path.display()
    );
    Ok(entries)
}
