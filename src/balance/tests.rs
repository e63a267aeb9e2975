use super::*;
use crate::models::Constituent;
use polars::prelude::*;
use std::path::PathBuf;

fn sample_uci_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data/sample.uci")
}

fn sample_uci() -> UciModel {
    UciModel::from_path(&sample_uci_path(), 20).unwrap()
}

/// Two years of flow output for PERLND 1, 2, 21, 22 and IMPLND 2, 22
fn flow_table() -> DataFrame {
    let both = |a: f64, b: f64| vec![Some(a), Some(b)];
    let columns = vec![
        Column::new("year".into(), vec![1995i32, 1996]),
        Column::new("PERLND_1_SUPY".into(), both(40.0, 44.0)),
        Column::new("PERLND_21_SUPY".into(), both(40.0, 44.0)),
        Column::new("PERLND_2_SUPY".into(), both(30.0, 30.0)),
        Column::new("PERLND_22_SUPY".into(), both(30.0, 30.0)),
        Column::new("IMPLND_2_SUPY".into(), both(30.0, 30.0)),
        Column::new("IMPLND_22_SUPY".into(), both(30.0, 30.0)),
        Column::new("PERLND_1_PERO".into(), both(10.0, 10.0)),
        Column::new("PERLND_21_PERO".into(), both(16.0, 16.0)),
        Column::new("PERLND_2_PERO".into(), both(20.0, 20.0)),
        Column::new("PERLND_22_PERO".into(), both(20.0, 20.0)),
        Column::new("IMPLND_2_SURO".into(), both(25.0, 25.0)),
        Column::new("IMPLND_22_SURO".into(), both(25.0, 25.0)),
        Column::new("PERLND_1_IGWI".into(), both(1.0, 1.0)),
        Column::new("PERLND_21_IGWI".into(), both(1.0, 1.0)),
        Column::new("PERLND_2_IGWI".into(), both(0.5, 0.5)),
        Column::new("PERLND_22_IGWI".into(), both(0.5, 0.5)),
        Column::new("PERLND_1_TAET".into(), both(25.0, 25.0)),
        Column::new("PERLND_21_TAET".into(), both(25.0, 25.0)),
        Column::new("PERLND_2_TAET".into(), both(8.0, 8.0)),
        Column::new("PERLND_22_TAET".into(), both(8.0, 8.0)),
        Column::new("IMPLND_2_IMPEV".into(), both(5.0, 5.0)),
        Column::new("IMPLND_22_IMPEV".into(), both(5.0, 5.0)),
        Column::new("RCHRES_1_ROVOL".into(), both(-1.0, 1.0)),
    ];
    DataFrame::new(columns).unwrap()
}

fn labels(frame: &DataFrame) -> Vec<Option<String>> {
    frame
        .column("BALANCE TERM")
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|label| label.map(str::to_string))
        .collect()
}

fn column(frame: &DataFrame, name: &str) -> Vec<Option<f64>> {
    frame
        .column(name)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect()
}

fn row_of(frame: &DataFrame, label: &str) -> usize {
    labels(frame)
        .iter()
        .position(|l| l.as_deref() == Some(label))
        .unwrap()
}

fn assert_close(actual: Option<f64>, expected: f64) {
    let actual = actual.expect("value present");
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}

#[test]
fn test_summary_without_uci_uses_mean_of_means() {
    let frame = process(
        &flow_table(),
        None,
        ReportKind::Summary,
        &BalanceConfig::default(),
    )
    .unwrap();

    let names: Vec<&str> = frame
        .get_column_names()
        .iter()
        .map(|name| name.as_str())
        .collect();
    assert_eq!(names, vec!["BALANCE TERM", "1", "2", "ALL"]);
    assert_eq!(frame.height(), 9);

    let rain = row_of(&frame, "Rainfall and irrigation");
    // PERLND and IMPLND SUPY are added without area weights
    assert_close(column(&frame, "1")[rain], 42.0);
    assert_close(column(&frame, "2")[rain], 60.0);
    assert_close(column(&frame, "ALL")[rain], 51.0);

    let pero = row_of(&frame, "Runoff:Pervious");
    assert_close(column(&frame, "1")[pero], 13.0);
    assert_close(column(&frame, "ALL")[pero], 16.5);

    let suro = row_of(&frame, "Runoff:Impervious");
    assert_eq!(column(&frame, "1")[suro], None);
    assert_close(column(&frame, "2")[suro], 25.0);
    assert_close(column(&frame, "ALL")[suro], 25.0);

    assert_eq!(labels(&frame)[1], None);
    assert_eq!(column(&frame, "ALL")[1], None);
}

#[test]
fn test_summary_with_uci_is_area_weighted() {
    let uci = sample_uci();
    let frame = process(
        &flow_table(),
        Some(&uci),
        ReportKind::Summary,
        &BalanceConfig::default(),
    )
    .unwrap();

    let names: Vec<&str> = frame
        .get_column_names()
        .iter()
        .map(|name| name.as_str())
        .collect();
    assert_eq!(names, vec!["BALANCE TERM", "1-FOREST", "2-URBAN", "ALL"]);
    assert_eq!(frame.height(), 17);

    let forest = column(&frame, "1-FOREST");
    let urban = column(&frame, "2-URBAN");
    let all = column(&frame, "ALL");

    let acres = row_of(&frame, "PERVIOUS AREA(acres)");
    assert_close(forest[acres], 150.0);
    assert_close(urban[acres], 60.0);
    assert_close(all[acres], 210.0);

    let impervious = row_of(&frame, "IMPERVIOUS AREA(acres)");
    assert_eq!(forest[impervious], None);
    assert_close(urban[impervious], 30.0);

    let rain = row_of(&frame, "Rainfall and irrigation");
    assert_close(forest[rain], 42.0);
    assert_close(urban[rain], 30.0);
    assert_close(all[rain], 37.5);

    let combined = row_of(&frame, "Runoff:Combined");
    assert_close(forest[combined], 12.0);
    assert_close(urban[combined], 20.0 * 2.0 / 3.0 + 25.0 / 3.0);
    assert_close(all[combined], 15.625);

    // Pervious and impervious shares add up to the combined total
    let pervious = row_of(&frame, "Runoff:Pervious");
    let impervious = row_of(&frame, "Runoff:Impervious");
    assert_close(all[pervious], 12.5);
    assert_close(all[impervious], 3.125);

    let evaporation = row_of(&frame, "Evaporation:Combined");
    assert_close(urban[evaporation], 7.0);
    assert_close(all[evaporation], 18.25);

    assert_close(all[row_of(&frame, "Deep recharge")], 0.75);
}

#[test]
fn test_area_percentages_sum_to_100() {
    let uci = sample_uci();
    let frame = process(
        &flow_table(),
        Some(&uci),
        ReportKind::Detailed,
        &BalanceConfig::default(),
    )
    .unwrap();

    let all = column(&frame, "ALL");
    let pervious = all[row_of(&frame, "PERVIOUS AREA(%)")].unwrap();
    let impervious = all[row_of(&frame, "IMPERVIOUS AREA(%)")].unwrap();
    assert!((pervious + impervious - 100.0).abs() < 1e-9);
    assert_close(Some(pervious), 87.5);
}

#[test]
fn test_class_without_area_is_zero() {
    let uci = sample_uci();
    let mut table = flow_table();
    table
        .with_column(Column::new("PERLND_3_PERO".into(), vec![Some(7.0), Some(9.0)]))
        .unwrap();

    let frame = process(&table, Some(&uci), ReportKind::Summary, &BalanceConfig::default()).unwrap();
    let headers: Vec<String> = frame
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    assert_eq!(headers, vec!["BALANCE TERM", "1-FOREST", "2-URBAN", "3-", "ALL"]);

    let pero = row_of(&frame, "Runoff:Pervious");
    assert_close(column(&frame, "3-")[pero], 0.0);
}

#[test]
fn test_uci_modulus_must_match() {
    let result = process(
        &flow_table(),
        Some(&sample_uci()),
        ReportKind::Summary,
        &BalanceConfig::default().with_modulus(10),
    );
    assert!(matches!(result, Err(HspfError::Configuration { .. })));
}

#[test]
fn test_class_without_area_keeps_number_without_uci() {
    let mut table = flow_table();
    table
        .with_column(Column::new("PERLND_3_PERO".into(), vec![Some(7.0), Some(9.0)]))
        .unwrap();

    let frame = process(&table, None, ReportKind::Summary, &BalanceConfig::default()).unwrap();
    assert!(frame.column("3").is_ok());
}

#[test]
fn test_year_and_unit_filters() {
    let config = BalanceConfig::default()
        .with_year(1996)
        .with_unit_filter("1:2");
    let frame = process(&flow_table(), None, ReportKind::Summary, &config).unwrap();

    let rain = row_of(&frame, "Rainfall and irrigation");
    assert_close(column(&frame, "1")[rain], 44.0);
    assert_close(column(&frame, "2")[rain], 60.0);

    let missing = process(
        &flow_table(),
        None,
        ReportKind::Summary,
        &BalanceConfig::default().with_year(1990),
    );
    assert!(matches!(missing, Err(HspfError::YearNotFound { year: 1990 })));

    let invalid = process(
        &flow_table(),
        None,
        ReportKind::Summary,
        &BalanceConfig::default().with_unit_filter("1:1000"),
    );
    assert!(matches!(invalid, Err(HspfError::InvalidUnitId { value: 1000 })));
}

#[test]
fn test_qual_detailed_expands_names() {
    let table = DataFrame::new(vec![
        Column::new("year".into(), vec![1995i32]),
        Column::new("PERLND_1_SOQUAL-TOTAL N".into(), vec![Some(2.0)]),
        Column::new("PERLND_21_SOQUAL-TOTAL N".into(), vec![Some(4.0)]),
        Column::new("IMPLND_1_SOQUAL-TOTAL N".into(), vec![Some(8.0)]),
    ])
    .unwrap();
    let config = BalanceConfig::default()
        .with_constituent(Constituent::Qual)
        .with_qual_names("TOTAL N");

    let frame = process(&table, None, ReportKind::Detailed, &config).unwrap();
    let pervious = row_of(&frame, "SOQUAL-TOTAL N: PERVIOUS");
    let impervious = row_of(&frame, "SOQUAL-TOTAL N: IMPERVIOUS");
    assert_close(column(&frame, "1")[pervious], 3.0);
    assert_close(column(&frame, "1")[impervious], 8.0);
    assert_eq!(column(&frame, "1")[row_of(&frame, "IOQUAL-TOTAL N")], None);
}

#[test]
fn test_qual_without_names_is_rejected() {
    let config = BalanceConfig::default().with_constituent(Constituent::Qual);
    let result = process(&flow_table(), None, ReportKind::Detailed, &config);
    assert!(matches!(result, Err(HspfError::Configuration { .. })));
}

#[test]
fn test_missing_binary_with_uci() {
    let result = summary(
        Path::new("/nonexistent/model.hbn"),
        Some(&sample_uci_path()),
        &BalanceConfig::default(),
    );
    assert!(matches!(result, Err(HspfError::MissingBinaryFile { .. })));
}
