//! Balance report templates.
//!
//! Each template is an ordered list of display rows. A row names one or more
//! (variable, operation) sources that are summed into it; a row with an empty
//! label is a blank separator. Templates are keyed by constituent, report
//! kind and whether areas from a UCI file are available.

use crate::error::{HspfError, Result};
use crate::models::OperationType::{self, Implnd, Perlnd};
use crate::models::{Constituent, ReportKind};

/// One row of a static template
#[derive(Debug, Clone, Copy)]
pub struct TemplateEntry {
    pub label: &'static str,
    pub sources: &'static [(&'static str, OperationType)],
}

/// One row of a resolved report, after quality name expansion
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceTerm {
    pub label: String,
    pub sources: Vec<(String, OperationType)>,
}

impl BalanceTerm {
    pub fn is_blank(&self) -> bool {
        self.label.is_empty()
    }

    /// True when the row mixes pervious and impervious sources
    pub fn is_combined(&self) -> bool {
        let has = |op| self.sources.iter().any(|(_, o)| *o == op);
        has(Perlnd) && has(Implnd)
    }
}

impl From<&TemplateEntry> for BalanceTerm {
    fn from(entry: &TemplateEntry) -> Self {
        Self {
            label: entry.label.to_string(),
            sources: entry
                .sources
                .iter()
                .map(|(variable, op)| (variable.to_string(), *op))
                .collect(),
        }
    }
}

const BLANK: TemplateEntry = TemplateEntry {
    label: "",
    sources: &[],
};

macro_rules! row {
    ($label:expr, [$(($var:expr, $op:expr)),+ $(,)?]) => {
        TemplateEntry {
            label: $label,
            sources: &[$(($var, $op)),+],
        }
    };
}

pub static FLOW_DETAILED_AREA: &[TemplateEntry] = &[
    row!("SUPY", [("SUPY", Perlnd), ("SUPY", Implnd), ("IRRAPP6", Perlnd)]),
    row!("SURLI", [("SURLI", Perlnd)]),
    row!("UZLI", [("UZLI", Perlnd)]),
    row!("LZLI", [("LZLI", Perlnd)]),
    BLANK,
    row!("SURO: PERVIOUS", [("SURO", Perlnd)]),
    row!("SURO: IMPERVIOUS", [("SURO", Implnd)]),
    row!("SURO: COMBINED", [("SURO", Perlnd), ("SURO", Implnd)]),
    row!("IFWO", [("IFWO", Perlnd)]),
    row!("AGWO", [("AGWO", Perlnd)]),
    BLANK,
    row!("AGWI", [("AGWI", Perlnd)]),
    row!("IGWI", [("IGWI", Perlnd)]),
    BLANK,
    row!("CEPE", [("CEPE", Perlnd)]),
    row!("UZET", [("UZET", Perlnd)]),
    row!("LZET", [("LZET", Perlnd)]),
    row!("AGWET", [("AGWET", Perlnd)]),
    row!("BASET", [("BASET", Perlnd)]),
    row!("SURET", [("SURET", Perlnd)]),
    BLANK,
    row!("PERO", [("PERO", Perlnd)]),
    row!("IGWI", [("IGWI", Perlnd)]),
    row!("TAET: PERVIOUS", [("TAET", Perlnd)]),
    row!("IMPEV: IMPERVIOUS", [("IMPEV", Implnd)]),
    row!("ET: COMBINED", [("TAET", Perlnd), ("IMPEV", Implnd)]),
    BLANK,
    row!("PET", [("PET", Perlnd), ("PET", Implnd)]),
    BLANK,
    row!("PERS", [("PERS", Perlnd)]),
];

pub static FLOW_DETAILED: &[TemplateEntry] = &[
    row!("SUPY", [("SUPY", Perlnd)]),
    row!("SURLI", [("SURLI", Perlnd)]),
    row!("UZLI", [("UZLI", Perlnd)]),
    row!("LZLI", [("LZLI", Perlnd)]),
    BLANK,
    row!("SURO: PERVIOUS", [("SURO", Perlnd)]),
    row!("SURO: IMPERVIOUS", [("SURO", Implnd)]),
    row!("IFWO", [("IFWO", Perlnd)]),
    row!("AGWO", [("AGWO", Perlnd)]),
    BLANK,
    row!("AGWI", [("AGWI", Perlnd)]),
    row!("IGWI", [("IGWI", Perlnd)]),
    BLANK,
    row!("CEPE", [("CEPE", Perlnd)]),
    row!("UZET", [("UZET", Perlnd)]),
    row!("LZET", [("LZET", Perlnd)]),
    row!("AGWET", [("AGWET", Perlnd)]),
    row!("BASET", [("BASET", Perlnd)]),
    row!("SURET", [("SURET", Perlnd)]),
    BLANK,
    row!("PERO", [("PERO", Perlnd)]),
    row!("IGWI", [("IGWI", Perlnd)]),
    row!("TAET: PERVIOUS", [("TAET", Perlnd)]),
    row!("IMPEV: IMPERVIOUS", [("IMPEV", Implnd)]),
    BLANK,
    row!("PET", [("PET", Perlnd)]),
    BLANK,
    row!("PERS", [("PERS", Perlnd)]),
];

pub static FLOW_SUMMARY_AREA: &[TemplateEntry] = &[
    row!(
        "Rainfall and irrigation",
        [
            ("SUPY", Perlnd),
            ("SUPY", Implnd),
            ("SURLI", Perlnd),
            ("UZLI", Perlnd),
            ("LZLI", Perlnd),
            ("IRRAPP6", Perlnd),
        ]
    ),
    BLANK,
    row!("Runoff:Pervious", [("PERO", Perlnd)]),
    row!("Runoff:Impervious", [("SURO", Implnd)]),
    row!("Runoff:Combined", [("PERO", Perlnd), ("SURO", Implnd)]),
    BLANK,
    row!("Deep recharge", [("IGWI", Perlnd)]),
    BLANK,
    row!("Evaporation:Pervious", [("TAET", Perlnd)]),
    row!("Evaporation:Impervious", [("IMPEV", Implnd)]),
    row!("Evaporation:Combined", [("TAET", Perlnd), ("IMPEV", Implnd)]),
];

pub static FLOW_SUMMARY: &[TemplateEntry] = &[
    row!(
        "Rainfall and irrigation",
        [
            ("SUPY", Perlnd),
            ("SUPY", Implnd),
            ("SURLI", Perlnd),
            ("UZLI", Perlnd),
            ("LZLI", Perlnd),
            ("IRRAPP6", Perlnd),
        ]
    ),
    BLANK,
    row!("Runoff:Pervious", [("PERO", Perlnd)]),
    row!("Runoff:Impervious", [("SURO", Implnd)]),
    BLANK,
    row!("Deep recharge", [("IGWI", Perlnd)]),
    BLANK,
    row!("Evaporation:Pervious", [("TAET", Perlnd)]),
    row!("Evaporation:Impervious", [("IMPEV", Implnd)]),
];

pub static QUAL_DETAILED: &[TemplateEntry] = &[
    row!("SOQUAL: PERVIOUS", [("SOQUAL", Perlnd)]),
    row!("SOQUAL: IMPERVIOUS", [("SOQUAL", Implnd)]),
    row!("IOQUAL", [("IOQUAL", Perlnd)]),
    row!("AOQUAL", [("AOQUAL", Perlnd)]),
    row!("POQUAL", [("POQUAL", Perlnd)]),
];

pub static QUAL_DETAILED_AREA: &[TemplateEntry] = &[
    row!("SOQUAL: PERVIOUS", [("SOQUAL", Perlnd)]),
    row!("SOQUAL: IMPERVIOUS", [("SOQUAL", Implnd)]),
    row!("SOQUAL: COMBINED", [("SOQUAL", Perlnd), ("SOQUAL", Implnd)]),
    row!("IOQUAL", [("IOQUAL", Perlnd)]),
    row!("AOQUAL", [("AOQUAL", Perlnd)]),
    row!("POQUAL", [("POQUAL", Perlnd)]),
];

/// Static template for a report
pub fn template(
    constituent: Constituent,
    kind: ReportKind,
    area_weighted: bool,
) -> &'static [TemplateEntry] {
    match (constituent, kind, area_weighted) {
        (Constituent::Flow, ReportKind::Detailed, true) => FLOW_DETAILED_AREA,
        (Constituent::Flow, ReportKind::Detailed, false) => FLOW_DETAILED,
        (Constituent::Flow, ReportKind::Summary, true) => FLOW_SUMMARY_AREA,
        (Constituent::Flow, ReportKind::Summary, false) => FLOW_SUMMARY,
        // The summary quality reports share the detailed layouts
        (Constituent::Qual, _, true) => QUAL_DETAILED_AREA,
        (Constituent::Qual, _, false) => QUAL_DETAILED,
    }
}

/// Resolve the rows of a report, expanding quality names for `qual`
pub fn balance_terms(
    constituent: Constituent,
    kind: ReportKind,
    area_weighted: bool,
    qual_names: &[String],
) -> Result<Vec<BalanceTerm>> {
    let entries = template(constituent, kind, area_weighted);
    match constituent {
        Constituent::Flow => Ok(entries.iter().map(BalanceTerm::from).collect()),
        Constituent::Qual => {
            if qual_names.is_empty() {
                return Err(HspfError::Configuration {
                    message: "constituent 'qual' requires at least one name in 'qualnames', \
                              for example --qualnames 'TOTAL N,TOTAL P'"
                        .to_string(),
                });
            }
            Ok(expand_qual_names(entries, qual_names))
        }
    }
}

/// Insert each quality name into labels and variable names.
///
/// `SOQUAL: PERVIOUS` with `TOTAL N` becomes `SOQUAL-TOTAL N: PERVIOUS` and
/// reads the `SOQUAL-TOTAL N` variable, matching the names HSPF writes when
/// the QUALID in QUAL-PROPS is `TOTAL N`.
pub fn expand_qual_names(entries: &[TemplateEntry], qual_names: &[String]) -> Vec<BalanceTerm> {
    let mut terms = Vec::with_capacity(entries.len() * qual_names.len());
    for qual in qual_names {
        for entry in entries {
            if entry.label.is_empty() {
                terms.push(BalanceTerm::from(entry));
                continue;
            }
            let first_space = entry.label.split(' ').next().unwrap_or_default().len();
            let first_colon = entry.label.split(':').next().unwrap_or_default().len();
            let split_at = first_space.min(first_colon);
            let label = format!(
                "{}-{}{}",
                &entry.label[..split_at],
                qual,
                &entry.label[split_at..]
            );
            let sources = entry
                .sources
                .iter()
                .map(|(variable, op)| (format!("{}-{}", variable, qual), *op))
                .collect();
            terms.push(BalanceTerm { label, sources });
        }
    }
    terms
}
