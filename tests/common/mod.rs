//! Shared helpers for integration tests: a writer for synthetic HBN files.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

const YEARLY: u32 = 5;
const MONTHLY: u32 = 4;

/// Builds HBN bytes record by record
pub struct HbnBuilder {
    bytes: Vec<u8>,
}

impl HbnBuilder {
    pub fn new() -> Self {
        Self { bytes: vec![0xFD] }
    }

    /// Variable catalog of one operation/unit/section
    pub fn catalog(mut self, operation: &str, unit: u32, section: &str, names: &[&str]) -> Self {
        let body: usize = names.iter().map(|name| 4 + name.len()).sum();
        self.bytes.extend(length_prefix(24 + body));
        self.bytes.extend(header(0, operation, unit, section));
        for name in names {
            self.bytes.extend((name.len() as u32).to_le_bytes());
            self.bytes.extend(name.as_bytes());
        }
        self
    }

    /// Yearly record ending December 31
    pub fn yearly(self, operation: &str, unit: u32, section: &str, year: u32, values: &[f32]) -> Self {
        self.data(operation, unit, section, YEARLY, year, 12, values)
    }

    /// Yearly record ending in `month`
    pub fn yearly_ending(
        self,
        operation: &str,
        unit: u32,
        section: &str,
        year: u32,
        month: u32,
        values: &[f32],
    ) -> Self {
        self.data(operation, unit, section, YEARLY, year, month, values)
    }

    /// Monthly record, ignored by the yearly table
    pub fn monthly(self, operation: &str, unit: u32, section: &str, year: u32, month: u32, values: &[f32]) -> Self {
        self.data(operation, unit, section, MONTHLY, year, month, values)
    }

    #[allow(clippy::too_many_arguments)]
    fn data(
        mut self,
        operation: &str,
        unit: u32,
        section: &str,
        level: u32,
        year: u32,
        month: u32,
        values: &[f32],
    ) -> Self {
        self.bytes.extend(length_prefix(24 + 28 + 4 * values.len()));
        self.bytes.extend(header(1, operation, unit, section));
        for field in [1, level, year, month, 31, 24, 0] {
            self.bytes.extend(field.to_le_bytes());
        }
        for value in values {
            self.bytes.extend(value.to_le_bytes());
        }
        self
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn write(&self, path: &Path) {
        fs::write(path, &self.bytes).unwrap();
    }
}

fn header(record_type: u32, operation: &str, unit: u32, section: &str) -> Vec<u8> {
    let mut bytes = record_type.to_le_bytes().to_vec();
    bytes.extend(format!("{:<8}", operation).as_bytes());
    bytes.extend(unit.to_le_bytes());
    bytes.extend(format!("{:<8}", section).as_bytes());
    bytes
}

/// Inverse of the six-bits-per-byte length packing
fn length_prefix(len: usize) -> [u8; 4] {
    let b3 = len / 4_194_304;
    let rest = len % 4_194_304;
    let b2 = rest / 16_384;
    let rest = rest % 16_384;
    let b1 = rest / 64;
    let b0 = rest % 64;
    [(b0 * 4) as u8, b1 as u8, b2 as u8, b3 as u8]
}

/// Two years of flow output for PERLND 1, 2, 21, 22 and IMPLND 2, 22
pub fn flow_hbn() -> HbnBuilder {
    let perlnd = ["SUPY", "PERO", "IGWI", "TAET"];
    let implnd = ["SUPY", "SURO", "IMPEV"];

    let mut builder = HbnBuilder::new();
    for unit in [1, 21, 2, 22] {
        builder = builder.catalog("PERLND", unit, "PWATER", &perlnd);
    }
    for unit in [2, 22] {
        builder = builder.catalog("IMPLND", unit, "IWATER", &implnd);
    }

    for (year, forest_supy) in [(1995, 40.0), (1996, 44.0)] {
        builder = builder
            .yearly("PERLND", 1, "PWATER", year, &[forest_supy, 10.0, 1.0, 25.0])
            .yearly("PERLND", 21, "PWATER", year, &[forest_supy, 16.0, 1.0, 25.0])
            .yearly("PERLND", 2, "PWATER", year, &[30.0, 20.0, 0.5, 8.0])
            .yearly("PERLND", 22, "PWATER", year, &[30.0, 20.0, 0.5, 8.0])
            .yearly("IMPLND", 2, "IWATER", year, &[30.0, 25.0, 5.0])
            .yearly("IMPLND", 22, "IWATER", year, &[30.0, 25.0, 5.0])
            .monthly("PERLND", 1, "PWATER", year, 6, &[-99.0, -99.0, -99.0, -99.0]);
    }
    builder
}

/// Path of a checked-in test fixture
pub fn fixture(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data").join(name)
}
