//! UCI model file parsing.
//!
//! The UCI is a fixed-width, block structured text file. This module reads
//! the SCHEMATIC, PERLND GEN-INFO and MASS-LINK blocks to find the
//! contributing area and land-cover name of every land unit. Parameter
//! tables are read by [`parameters`].

pub mod blocks;
pub mod parameters;

use crate::constants::uci as layout;
use crate::error::{HspfError, Result};
use crate::models::{OperationType, class_of};
use blocks::{field, find_block, is_data_line, read_uci_lines};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::debug;

pub use parameters::{ParameterTable, parameters};

/// Areas and names derived from a UCI file
#[derive(Debug, Clone)]
pub struct UciModel {
    path: PathBuf,
    modulus: u32,
    areas: HashMap<(OperationType, u32), f64>,
    names_by_class: BTreeMap<u32, String>,
    runoff_mass_links: HashSet<String>,
}

impl UciModel {
    /// Read and parse a UCI file
    pub fn from_path(path: &Path, modulus: u32) -> Result<Self> {
        let lines = read_uci_lines(path, layout::LINE_WIDTH)?;
        Self::from_lines(path, &lines, modulus)
    }

    /// Parse UCI lines already truncated and trimmed
    pub fn from_lines(path: &Path, lines: &[String], modulus: u32) -> Result<Self> {
        if modulus == 0 {
            return Err(HspfError::Configuration {
                message: "modulus must be at least 1".to_string(),
            });
        }

        let mut model = Self {
            path: path.to_path_buf(),
            modulus,
            areas: HashMap::new(),
            names_by_class: BTreeMap::new(),
            runoff_mass_links: HashSet::new(),
        };

        let perlnd = find_block(path, lines, layout::PERLND, "END PERLND")?;
        let gen_info = find_block(path, perlnd, layout::GEN_INFO, "  END GEN-INFO")?;
        model.parse_gen_info(gen_info)?;

        let mass_link = find_block(path, lines, layout::MASS_LINK, "END MASS-LINK")?;
        model.runoff_mass_links = runoff_mass_links(mass_link);

        let schematic = find_block(path, lines, layout::SCHEMATIC, "END SCHEMATIC")?;
        model.parse_schematic(schematic)?;

        debug!(
            "Parsed UCI {}: {} named classes, {} runoff mass-links, {} land segments with area",
            path.display(),
            model.names_by_class.len(),
            model.runoff_mass_links.len(),
            model.areas.len()
        );

        Ok(model)
    }

    fn parse_gen_info(&mut self, block: &[String]) -> Result<()> {
        for line in interior(block).iter().filter(|l| is_data_line(l)) {
            // A second id in columns 6-10 marks a range record; only single
            // unit records carry names used for the report headers.
            let (start, end) = layout::RANGE_END_FIELD;
            if field(line, start, end).trim().parse::<i64>().is_ok() {
                continue;
            }

            let (start, end) = layout::UNIT_ID_FIELD;
            let id_text = field(line, start, end);
            let unit = id_text
                .trim()
                .parse::<u32>()
                .map_err(|_| self.invalid(format!("GEN-INFO unit id '{}'", id_text.trim())))?;

            let (start, end) = layout::NAME_FIELD;
            let name = field(line, start, end).trim().to_string();

            self.names_by_class
                .insert(class_of(unit, self.modulus), name);
        }
        Ok(())
    }

    fn parse_schematic(&mut self, block: &[String]) -> Result<()> {
        let body = interior(block);
        let body = body.get(layout::SCHEMATIC_HEADER_LINES..).unwrap_or_default();

        for line in body.iter().filter(|l| is_data_line(l)) {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.len() <= layout::SCHEMATIC_MASS_LINK_TOKEN {
                continue;
            }
            let Some(operation) = OperationType::parse(tokens[layout::SCHEMATIC_OPERATION_TOKEN])
            else {
                continue;
            };
            if !self
                .runoff_mass_links
                .contains(tokens[layout::SCHEMATIC_MASS_LINK_TOKEN])
            {
                continue;
            }

            let unit_text = tokens[layout::SCHEMATIC_UNIT_TOKEN];
            let unit = unit_text
                .parse::<u32>()
                .map_err(|_| self.invalid(format!("SCHEMATIC unit id '{}'", unit_text)))?;
            let area_text = tokens[layout::SCHEMATIC_AREA_TOKEN];
            let area = area_text
                .parse::<f64>()
                .map_err(|_| self.invalid(format!("SCHEMATIC area '{}'", area_text)))?;

            *self.areas.entry((operation, unit)).or_insert(0.0) += area;
        }
        Ok(())
    }

    fn invalid(&self, reason: String) -> HspfError {
        HspfError::InvalidUci {
            path: self.path.clone(),
            reason: format!("could not parse {}", reason),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn modulus(&self) -> u32 {
        self.modulus
    }

    /// Summed SCHEMATIC area of a land unit, zero when it has none
    pub fn area(&self, operation: OperationType, unit: u32) -> f64 {
        self.areas.get(&(operation, unit)).copied().unwrap_or(0.0)
    }

    /// Land-cover name of a class, from the last GEN-INFO unit in that class
    pub fn class_name(&self, class: u32) -> Option<&str> {
        self.names_by_class.get(&class).map(String::as_str)
    }

    /// Mass-link group ids that route PWATER/IWATER runoff
    pub fn runoff_mass_links(&self) -> &HashSet<String> {
        &self.runoff_mass_links
    }
}

/// Block content without its start and end marker lines
fn interior(block: &[String]) -> &[String] {
    match block.len() {
        0..=2 => &[],
        n => &block[1..n - 1],
    }
}

/// Mass-link groups whose records move PWATER/IWATER surface or subsurface
/// runoff (`PERO`, `SURO`, ...) out of a land segment.
fn runoff_mass_links(block: &[String]) -> HashSet<String> {
    let mut groups = HashSet::new();
    let mut current: Option<(&str, bool)> = None;

    for line in interior(block).iter().filter(|l| is_data_line(l)) {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.as_slice() {
            ["END", "MASS-LINK", id, ..] => {
                if let Some((open, routes_runoff)) = current.take() {
                    if routes_runoff && open == *id {
                        groups.insert(open.to_string());
                    }
                }
            }
            ["MASS-LINK", id, ..] => current = Some((*id, false)),
            [volume, group, member, ..] => {
                if let Some((_, routes_runoff)) = current.as_mut() {
                    if is_runoff_record(volume, group, member) {
                        *routes_runoff = true;
                    }
                }
            }
            _ => {}
        }
    }
    groups
}

fn is_runoff_record(volume: &str, group: &str, member: &str) -> bool {
    let member = member.as_bytes();
    volume.ends_with("LND")
        && matches!(group, "PWATER" | "IWATER")
        && member.len() == 4
        && matches!(member[0], b'P' | b'S')
        && matches!(member[1], b'E' | b'U')
        && &member[2..] == b"RO"
}
