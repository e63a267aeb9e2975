//! Balance table assembly.
//!
//! Lays the class values of each report row out over the PERLND classes and
//! adds the `ALL` column. Rows that mix pervious and impervious sources are
//! area weighted by the impervious fraction of each class when areas are
//! known. With areas, `ALL` is the area-percentage weighted sum over classes,
//! otherwise it is the mean of the finite class values.

use crate::balance::aggregate::Aggregates;
use crate::constants::{
    ALL_COLUMN, BALANCE_TERM_COLUMN, IMPERVIOUS_AREA_ACRES, IMPERVIOUS_AREA_PERCENT,
    PERVIOUS_AREA_ACRES, PERVIOUS_AREA_PERCENT,
};
use crate::error::Result;
use crate::models::OperationType;
use crate::templates::BalanceTerm;
use polars::prelude::*;

/// Area of each PERLND class column, and the share of the whole model
#[derive(Debug, Clone, PartialEq)]
pub struct AreaSummary {
    pub pervious: Vec<f64>,
    pub impervious: Vec<f64>,
    pub pervious_percent: Vec<f64>,
    pub impervious_percent: Vec<f64>,
}

impl AreaSummary {
    pub fn new(classes: &[u32], aggregates: &Aggregates) -> Self {
        let pervious: Vec<f64> = classes
            .iter()
            .map(|class| aggregates.class_area(OperationType::Perlnd, *class))
            .collect();
        let impervious: Vec<f64> = classes
            .iter()
            .map(|class| aggregates.class_area(OperationType::Implnd, *class))
            .collect();

        let total: f64 = pervious.iter().sum::<f64>() + impervious.iter().sum::<f64>();
        let percent = |areas: &[f64]| -> Vec<f64> {
            areas
                .iter()
                .map(|area| if total > 0.0 { area / total * 100.0 } else { 0.0 })
                .collect()
        };

        Self {
            pervious_percent: percent(&pervious),
            impervious_percent: percent(&impervious),
            pervious,
            impervious,
        }
    }

    /// Impervious share of each class area, 0 for classes without area
    pub fn impervious_ratio(&self) -> Vec<f64> {
        self.pervious
            .iter()
            .zip(&self.impervious)
            .map(|(p, i)| {
                let ratio = i / (p + i);
                if ratio.is_finite() { ratio } else { 0.0 }
            })
            .collect()
    }

    fn combined_percent(&self) -> Vec<f64> {
        self.pervious_percent
            .iter()
            .zip(&self.impervious_percent)
            .map(|(p, i)| p + i)
            .collect()
    }

    fn percent(&self, weighting: Weighting) -> Vec<f64> {
        match weighting {
            Weighting::Only(OperationType::Perlnd) => self.pervious_percent.clone(),
            Weighting::Only(OperationType::Implnd) => self.impervious_percent.clone(),
            Weighting::Combined => self.combined_percent(),
        }
    }
}

/// Area share used for the `ALL` column of a row
#[derive(Debug, Clone, Copy, PartialEq)]
enum Weighting {
    Only(OperationType),
    Combined,
}

/// One output row before conversion to columns
#[derive(Debug, Clone, PartialEq)]
struct Row {
    label: Option<String>,
    values: Vec<f64>,
    all: f64,
}

impl Row {
    fn blank(width: usize) -> Self {
        Self {
            label: None,
            values: vec![f64::NAN; width],
            all: f64::NAN,
        }
    }
}

/// Build the balance table for `terms`
pub fn assemble(
    terms: &[BalanceTerm],
    aggregates: &Aggregates,
    area_weighted: bool,
) -> Result<DataFrame> {
    let classes = aggregates.classes(OperationType::Perlnd);
    let width = classes.len();
    let areas = area_weighted.then(|| AreaSummary::new(&classes, aggregates));

    let mut rows = Vec::with_capacity(terms.len() + 6);
    if let Some(areas) = &areas {
        rows.extend(area_rows(areas));
    }

    for term in terms {
        if term.is_blank() {
            rows.push(Row::blank(width));
            continue;
        }
        rows.push(term_row(term, &classes, aggregates, areas.as_ref()));
    }

    let mut columns = Vec::with_capacity(width + 2);
    columns.push(Column::new(
        BALANCE_TERM_COLUMN.into(),
        rows.iter().map(|row| row.label.clone()).collect::<Vec<_>>(),
    ));
    for (index, class) in classes.iter().enumerate() {
        let header = aggregates.label(*class).header(*class);
        let values: Vec<Option<f64>> = rows.iter().map(|row| finite(row.values[index])).collect();
        columns.push(Column::new(header.into(), values));
    }
    columns.push(Column::new(
        ALL_COLUMN.into(),
        rows.iter().map(|row| finite(row.all)).collect::<Vec<_>>(),
    ));

    Ok(DataFrame::new(columns)?)
}

/// Area header rows; per-class areas that are not positive are left empty
fn area_rows(areas: &AreaSummary) -> Vec<Row> {
    let positive = |values: &[f64]| -> Vec<f64> {
        values
            .iter()
            .map(|v| if *v > 0.0 { *v } else { f64::NAN })
            .collect()
    };
    let labelled = |label: &str, values: &[f64]| Row {
        label: Some(label.to_string()),
        values: positive(values),
        all: values.iter().sum(),
    };
    let width = areas.pervious.len();

    vec![
        labelled(PERVIOUS_AREA_ACRES, &areas.pervious),
        labelled(PERVIOUS_AREA_PERCENT, &areas.pervious_percent),
        Row::blank(width),
        labelled(IMPERVIOUS_AREA_ACRES, &areas.impervious),
        labelled(IMPERVIOUS_AREA_PERCENT, &areas.impervious_percent),
        Row::blank(width),
    ]
}

fn term_row(
    term: &BalanceTerm,
    classes: &[u32],
    aggregates: &Aggregates,
    areas: Option<&AreaSummary>,
) -> Row {
    let combined = term.is_combined();
    let weighting = match term.sources.first() {
        Some((_, operation)) if !combined => Weighting::Only(*operation),
        _ => Weighting::Combined,
    };
    let impervious_ratio = areas.map(AreaSummary::impervious_ratio);

    let mut values: Option<Vec<f64>> = None;
    for (variable, operation) in &term.sources {
        let Some(class_values) = aggregates.values(*operation, variable) else {
            continue;
        };

        let source: Vec<f64> = classes
            .iter()
            .enumerate()
            .map(|(index, class)| {
                let value = class_values.get(class).copied().unwrap_or(f64::NAN);
                let ratio = match (&impervious_ratio, combined) {
                    (Some(ratio), true) => match operation {
                        OperationType::Perlnd => 1.0 - ratio[index],
                        OperationType::Implnd => ratio[index],
                    },
                    _ => 1.0,
                };
                value * ratio
            })
            .collect();

        if !source.iter().any(|v| v.is_finite()) {
            continue;
        }
        values = Some(match values {
            None => source,
            Some(sum) => sum.iter().zip(&source).map(|(a, b)| nan_add(*a, *b)).collect(),
        });
    }

    let Some(values) = values else {
        let mut row = Row::blank(classes.len());
        row.label = Some(term.label.clone());
        return row;
    };

    let all = match areas {
        None => nan_mean(&values),
        Some(areas) => {
            let percent = areas.percent(weighting);
            values
                .iter()
                .zip(&percent)
                .filter(|(v, _)| v.is_finite())
                .map(|(v, p)| v * p)
                .sum::<f64>()
                / 100.0
        }
    };

    Row {
        label: Some(term.label.clone()),
        values,
        all,
    }
}

/// Sum treating a NaN operand as absent
fn nan_add(a: f64, b: f64) -> f64 {
    match (a.is_nan(), b.is_nan()) {
        (true, _) => b,
        (_, true) => a,
        _ => a + b,
    }
}

/// Mean of the finite values, NaN when there are none
fn nan_mean(values: &[f64]) -> f64 {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    match finite.len() {
        0 => f64::NAN,
        n => finite.iter().sum::<f64>() / n as f64,
    }
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}
