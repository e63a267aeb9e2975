//! Integration tests for the HBN reader with synthetic binary files
//!
//! Files are written with the record layout HSPF uses, then read back
//! through `HbnFile`.

mod common;

use common::{HbnBuilder, flow_hbn};
use hspf_utils::{HbnFile, HspfError, TimeSeriesSource};
use tempfile::TempDir;

#[test]
fn test_yearly_table_layout() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("flow.hbn");
    flow_hbn().write(&path);

    let hbn = HbnFile::open(&path).unwrap();
    let table = hbn.yearly_table().unwrap();

    assert_eq!(table.height(), 2);
    // year plus 4 PERLND units x 4 variables and 2 IMPLND units x 3 variables
    assert_eq!(table.width(), 1 + 16 + 6);

    let years: Vec<Option<i32>> = table.column("year").unwrap().i32().unwrap().into_iter().collect();
    assert_eq!(years, vec![Some(1995), Some(1996)]);

    let supy: Vec<Option<f64>> = table
        .column("PERLND_1_SUPY")
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(supy, vec![Some(40.0), Some(44.0)]);

    let impev: Vec<Option<f64>> = table
        .column("IMPLND_22_IMPEV")
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(impev, vec![Some(5.0), Some(5.0)]);
}

#[test]
fn test_monthly_records_are_ignored() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("flow.hbn");
    flow_hbn().write(&path);

    let table = HbnFile::open(&path).unwrap().yearly_table().unwrap();
    let pero: Vec<Option<f64>> = table
        .column("PERLND_1_PERO")
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect();
    assert!(pero.iter().all(|value| *value == Some(10.0)));
}

#[test]
fn test_missing_years_are_null() {
    let hbn = HbnBuilder::new()
        .catalog("PERLND", 1, "PWATER", &["SUPY"])
        .catalog("PERLND", 2, "PWATER", &["SUPY"])
        .yearly("PERLND", 1, "PWATER", 1995, &[40.0])
        .yearly("PERLND", 1, "PWATER", 1996, &[41.0])
        .yearly("PERLND", 2, "PWATER", 1996, &[30.0]);

    let table = HbnFile::decode(std::path::Path::new("gap.hbn"), hbn.bytes())
        .unwrap()
        .yearly_table()
        .unwrap();
    let supy: Vec<Option<f64>> = table
        .column("PERLND_2_SUPY")
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(supy, vec![None, Some(30.0)]);
}

#[test]
fn test_inconsistent_year_end() {
    let hbn = HbnBuilder::new()
        .catalog("PERLND", 1, "PWATER", &["SUPY"])
        .catalog("IMPLND", 1, "IWATER", &["SUPY"])
        .yearly_ending("PERLND", 1, "PWATER", 1995, 9, &[40.0])
        .yearly_ending("IMPLND", 1, "IWATER", 1995, 12, &[40.0]);

    let file = HbnFile::decode(std::path::Path::new("byrend.hbn"), hbn.bytes()).unwrap();
    let error = file.yearly_table().unwrap_err();

    assert!(matches!(error, HspfError::InconsistentYearEnd { .. }));
    let message = error.to_string();
    assert!(message.contains("BYREND"));
    assert!(message.contains("PRINT-INFO"));
}

#[test]
fn test_other_operations_are_kept_in_the_table() {
    let hbn = HbnBuilder::new()
        .catalog("RCHRES", 1, "HYDR", &["ROVOL"])
        .yearly("RCHRES", 1, "HYDR", 1995, &[12.5]);

    let table = HbnFile::decode(std::path::Path::new("reach.hbn"), hbn.bytes())
        .unwrap()
        .yearly_table()
        .unwrap();
    assert!(table.column("RCHRES_1_ROVOL").is_ok());
}

#[test]
fn test_truncated_file() {
    let full = flow_hbn();
    let bytes = &full.bytes()[..full.bytes().len() - 3];

    let result = HbnFile::decode(std::path::Path::new("cut.hbn"), bytes);
    assert!(matches!(result, Err(HspfError::InvalidBinary { .. })));
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let result = HbnFile::open(&dir.path().join("absent.hbn"));
    assert!(matches!(result, Err(HspfError::Io(_))));
}
