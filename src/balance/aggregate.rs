//! Per-class reduction of land segment series.
//!
//! Every (operation, variable) pair referenced by a report is reduced to one
//! value per land-cover class. Without areas the value is the mean over
//! years of the mean across the class's units. With areas from a UCI file
//! it is the mean over years of the area-weighted sum across units, each
//! unit weighted by its share of the class area.

use crate::models::{ClassLabel, OperationType, class_of};
use crate::series::{LandSeries, YearlySeries};
use crate::uci::UciModel;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Class values of every (operation, variable) pair in a report
#[derive(Debug, Clone, Default)]
pub struct Aggregates {
    values: HashMap<(OperationType, String), BTreeMap<u32, f64>>,
    labels: BTreeMap<u32, ClassLabel>,
    class_areas: HashMap<(OperationType, u32), f64>,
}

impl Aggregates {
    /// Class values of one variable, None when it has no columns
    pub fn values(&self, operation: OperationType, variable: &str) -> Option<&BTreeMap<u32, f64>> {
        self.values.get(&(operation, variable.to_string()))
    }

    /// Classes with a value for any variable of `operation`, ascending
    pub fn classes(&self, operation: OperationType) -> Vec<u32> {
        let classes: BTreeSet<u32> = self
            .values
            .iter()
            .filter(|((op, _), _)| *op == operation)
            .flat_map(|(_, values)| values.keys().copied())
            .collect();
        classes.into_iter().collect()
    }

    pub fn label(&self, class: u32) -> ClassLabel {
        self.labels.get(&class).cloned().unwrap_or(ClassLabel::Number)
    }

    /// Total area of the units of a class, zero without a UCI
    pub fn class_area(&self, operation: OperationType, class: u32) -> f64 {
        self.class_areas
            .get(&(operation, class))
            .copied()
            .unwrap_or(0.0)
    }
}

/// Reduce `series` for every variable, keeping classes with at least one
/// column of the variable.
pub fn aggregate(
    yearly: &YearlySeries,
    variables: &BTreeSet<String>,
    uci: Option<&UciModel>,
    modulus: u32,
) -> Aggregates {
    let mut aggregates = Aggregates::default();

    if let Some(uci) = uci {
        let mut seen = BTreeSet::new();
        for series in &yearly.series {
            let key = &series.key;
            if seen.insert((key.operation, key.unit)) {
                *aggregates
                    .class_areas
                    .entry((key.operation, class_of(key.unit, modulus)))
                    .or_insert(0.0) += uci.area(key.operation, key.unit);
            }
        }
    }

    for operation in OperationType::ALL {
        for variable in variables {
            let mut by_class: BTreeMap<u32, Vec<&LandSeries>> = BTreeMap::new();
            for series in yearly.series.iter().filter(|s| {
                s.key.operation == operation && s.key.variable == *variable
            }) {
                by_class
                    .entry(class_of(series.key.unit, modulus))
                    .or_default()
                    .push(series);
            }
            if by_class.is_empty() {
                continue;
            }

            let mut values = BTreeMap::new();
            for (class, members) in by_class {
                let Some(uci) = uci else {
                    values.insert(class, mean_of_means(&members, yearly.years.len()));
                    aggregates.labels.entry(class).or_insert(ClassLabel::Number);
                    continue;
                };

                let area = aggregates.class_area(operation, class);
                let value = weighted_mean(&members, yearly.years.len(), area, |unit| {
                    uci.area(operation, unit)
                });
                values.insert(class, value);

                // Classes without area or data show an empty name unless named elsewhere
                let has_data = members.iter().any(|series| series.present().next().is_some());
                if area == 0.0 || !has_data {
                    aggregates
                        .labels
                        .entry(class)
                        .or_insert_with(|| ClassLabel::Named(String::new()));
                    continue;
                }
                match uci.class_name(class) {
                    Some(name) => {
                        aggregates
                            .labels
                            .insert(class, ClassLabel::Named(name.to_string()));
                    }
                    None => {
                        aggregates.labels.entry(class).or_insert(ClassLabel::Number);
                    }
                }
            }
            aggregates
                .values
                .insert((operation, variable.clone()), values);
        }
    }

    aggregates
}

/// Mean over years of the per-year mean across units; 0.0 without data
fn mean_of_means(members: &[&LandSeries], rows: usize) -> f64 {
    let row_means: Vec<f64> = (0..rows)
        .filter_map(|row| {
            let present: Vec<f64> = members
                .iter()
                .filter_map(|series| series.values.get(row).copied().flatten())
                .collect();
            match present.len() {
                0 => None,
                n => Some(present.iter().sum::<f64>() / n as f64),
            }
        })
        .collect();

    match row_means.len() {
        0 => 0.0,
        n => row_means.iter().sum::<f64>() / n as f64,
    }
}

/// Mean over years of the per-year sum of `value * unit_area / class_area`;
/// 0.0 when the class has no area or no rows
fn weighted_mean(
    members: &[&LandSeries],
    rows: usize,
    class_area: f64,
    unit_area: impl Fn(u32) -> f64,
) -> f64 {
    if class_area == 0.0 || rows == 0 || members.is_empty() {
        return 0.0;
    }

    let total: f64 = (0..rows)
        .map(|row| {
            members
                .iter()
                .filter_map(|series| {
                    let value = series.values.get(row).copied().flatten()?;
                    Some(value * unit_area(series.key.unit) / class_area)
                })
                .sum::<f64>()
        })
        .sum();
    total / rows as f64
}
