//! HSPF binary output (HBN) reading.
//!
//! The report builders only see a [`TimeSeriesSource`]: a yearly table with a
//! `year` column and one Float64 column per `{OPERATION}_{UNIT}_{VARIABLE}`.
//! [`HbnFile`] produces that table from an HBN file; tests and callers with
//! data from elsewhere can pass a `DataFrame` directly.
//!
//! HBN layout (little endian): a `0xFD` marker byte, then records. Each
//! record starts with a 4-byte packed length and a 24-byte header
//! (`u32` record type, 8-byte operation name, `u32` unit, 8-byte section).
//! Catalog records (type 0) list the variable names of a unit/section as
//! `u32` length + bytes. Data records (type 1) hold a time stamp of seven
//! `u32` (units flag, level, year, month, day, hour, minute) followed by one
//! `f32` per catalogued variable.

use crate::constants::YEAR_COLUMN;
use crate::constants::hbn as layout;
use crate::error::{HspfError, Result};
use crate::models::OperationType;
use polars::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Source of yearly land segment time series
pub trait TimeSeriesSource {
    /// Table with a `year` column and `{OPERATION}_{UNIT}_{VARIABLE}` columns
    fn yearly_table(&self) -> Result<DataFrame>;
}

impl TimeSeriesSource for DataFrame {
    fn yearly_table(&self) -> Result<DataFrame> {
        Ok(self.clone())
    }
}

/// Decoded yearly series of an HBN file
#[derive(Debug, Clone)]
pub struct HbnFile {
    path: PathBuf,
    series: BTreeMap<String, BTreeMap<i32, f64>>,
    year_end_months: HashMap<String, BTreeSet<u32>>,
}

impl HbnFile {
    /// Read and decode an HBN file
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        let hbn = Self::decode(path, &bytes)?;
        debug!(
            "Decoded {} yearly series from {}",
            hbn.series.len(),
            path.display()
        );
        Ok(hbn)
    }

    /// Decode HBN bytes; `path` is used for error messages
    pub fn decode(path: &Path, bytes: &[u8]) -> Result<Self> {
        let mut reader = RecordReader {
            path,
            bytes,
            position: 0,
        };

        if reader.take(1)?[0] != layout::MAGIC {
            return Err(reader.invalid("missing 0xFD file marker"));
        }

        let mut catalog: HashMap<(String, u32, String), Vec<String>> = HashMap::new();
        let mut series: BTreeMap<String, BTreeMap<i32, f64>> = BTreeMap::new();
        let mut year_end_months: HashMap<String, BTreeSet<u32>> = HashMap::new();

        while reader.remaining() >= 4 {
            let record_len = decode_record_length(reader.take(4)?);
            let record_type = reader.u32()?;
            let operation = reader.text(8)?;
            let unit = reader.u32()?;
            let section = reader.text(8)?;
            let key = (operation, unit, section);

            match record_type {
                layout::CATALOG_RECORD => {
                    let body_len = record_len.checked_sub(layout::RECORD_HEADER_LEN).ok_or_else(
                        || reader.invalid(format!("catalog record length {} too short", record_len)),
                    )?;
                    let names = catalog.entry(key).or_default();
                    let mut consumed = 0;
                    while consumed < body_len {
                        let name_len = reader.u32()? as usize;
                        names.push(reader.text(name_len)?);
                        consumed += name_len + 4;
                    }
                }
                layout::DATA_RECORD => {
                    let names = catalog.get(&key).ok_or_else(|| {
                        reader.invalid(format!(
                            "data record for {} {} {} has no variable catalog",
                            key.0, key.1, key.2
                        ))
                    })?;
                    let _units = reader.u32()?;
                    let level = reader.u32()?;
                    let year = reader.u32()?;
                    let month = reader.u32()?;
                    let _day = reader.u32()?;
                    let _hour = reader.u32()?;
                    let _minute = reader.u32()?;

                    let mut values = Vec::with_capacity(names.len());
                    for _ in 0..names.len() {
                        values.push(reader.f32()?);
                    }

                    if level != layout::YEARLY_LEVEL {
                        continue;
                    }
                    year_end_months
                        .entry(key.0.clone())
                        .or_default()
                        .insert(month);
                    for (name, value) in names.iter().zip(values) {
                        series
                            .entry(format!("{}_{}_{}", key.0, key.1, name))
                            .or_default()
                            .insert(year as i32, f64::from(value));
                    }
                }
                other => {
                    return Err(reader.invalid(format!("unknown record type {}", other)));
                }
            }
        }

        if reader.remaining() > 0 {
            warn!(
                "Ignoring {} trailing bytes in {}",
                reader.remaining(),
                path.display()
            );
        }

        Ok(Self {
            path: path.to_path_buf(),
            series,
            year_end_months,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Column names of all decoded yearly series
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    /// PERLND and IMPLND yearly records must end in the same month.
    fn check_year_end(&self) -> Result<()> {
        let perlnd = self.year_end_months.get(OperationType::Perlnd.as_str());
        let implnd = self.year_end_months.get(OperationType::Implnd.as_str());
        if let (Some(perlnd), Some(implnd)) = (perlnd, implnd) {
            if perlnd != implnd {
                return Err(HspfError::InconsistentYearEnd {
                    path: self.path.clone(),
                    details: format!(
                        "PERLND years end in month {:?}, IMPLND years end in month {:?}",
                        perlnd, implnd
                    ),
                });
            }
        }
        Ok(())
    }
}

impl TimeSeriesSource for HbnFile {
    fn yearly_table(&self) -> Result<DataFrame> {
        self.check_year_end()?;

        let years: BTreeSet<i32> = self
            .series
            .values()
            .flat_map(|values| values.keys().copied())
            .collect();
        if years.is_empty() {
            warn!("No yearly records found in {}", self.path.display());
        }

        let mut columns = Vec::with_capacity(self.series.len() + 1);
        columns.push(Column::new(
            YEAR_COLUMN.into(),
            years.iter().copied().collect::<Vec<i32>>(),
        ));
        for (name, values) in &self.series {
            let column: Vec<Option<f64>> = years.iter().map(|year| values.get(year).copied()).collect();
            columns.push(Column::new(name.as_str().into(), column));
        }

        Ok(DataFrame::new(columns)?)
    }
}

/// Record length packed six bits per byte above the two low flag bits
pub fn decode_record_length(bytes: &[u8]) -> usize {
    let [b0, b1, b2, b3] = [bytes[0], bytes[1], bytes[2], bytes[3]].map(usize::from);
    (b0 >> 2) + b1 * 64 + b2 * 16_384 + b3 * 4_194_304
}

struct RecordReader<'a> {
    path: &'a Path,
    bytes: &'a [u8],
    position: usize,
}

impl<'a> RecordReader<'a> {
    fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(self.invalid(format!(
                "truncated record at byte {}: needed {} bytes, {} left",
                self.position,
                len,
                self.remaining()
            )));
        }
        let slice = &self.bytes[self.position..self.position + len];
        self.position += len;
        Ok(slice)
    }

    fn u32(&mut self) -> Result<u32> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn f32(&mut self) -> Result<f32> {
        let bytes = self.take(4)?;
        Ok(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn text(&mut self, len: usize) -> Result<String> {
        let bytes = self.take(len)?;
        Ok(String::from_utf8_lossy(bytes).trim().to_string())
    }

    fn invalid(&self, reason: impl Into<String>) -> HspfError {
        HspfError::InvalidBinary {
            path: self.path.to_path_buf(),
            reason: reason.into(),
        }
    }
}
