//! Table rendering.
//!
//! Reports are polars frames; this module turns them into text. Delimited
//! formats go through the `csv` crate, the bordered formats through
//! `comfy-table`. Float cells use a [`FloatFormat`] such as `.2f` or `g`,
//! and missing or NaN cells render as empty text.

use crate::error::{HspfError, Result};
use comfy_table::{CellAlignment, Table, presets};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::str::FromStr;

/// Supported output layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TableFormat {
    /// Comma separated, a space after each comma
    Csv,
    /// Comma separated, no spaces
    #[value(name = "csv_nos")]
    CsvNos,
    /// Tab separated, a space after each tab
    Tsv,
    /// Tab separated, no spaces
    #[value(name = "tsv_nos")]
    TsvNos,
    Plain,
    Simple,
    Github,
    Pipe,
    Grid,
    #[value(name = "fancy_grid")]
    FancyGrid,
    Psql,
    Rst,
}

impl TableFormat {
    /// Field delimiter and padding for the delimited formats
    fn delimiter(&self) -> Option<(u8, bool)> {
        match self {
            TableFormat::Csv => Some((b',', true)),
            TableFormat::CsvNos => Some((b',', false)),
            TableFormat::Tsv => Some((b'\t', true)),
            TableFormat::TsvNos => Some((b'\t', false)),
            _ => None,
        }
    }

    fn preset(&self) -> &'static str {
        match self {
            TableFormat::Plain => presets::NOTHING,
            TableFormat::Simple | TableFormat::Rst => presets::ASCII_HORIZONTAL_ONLY,
            TableFormat::Github | TableFormat::Pipe => presets::ASCII_MARKDOWN,
            TableFormat::Grid => presets::ASCII_FULL,
            TableFormat::FancyGrid => presets::UTF8_FULL,
            TableFormat::Psql => presets::ASCII_FULL_CONDENSED,
            TableFormat::Csv | TableFormat::CsvNos | TableFormat::Tsv | TableFormat::TsvNos => {
                presets::NOTHING
            }
        }
    }
}

impl FromStr for TableFormat {
    type Err = HspfError;

    fn from_str(s: &str) -> Result<Self> {
        <Self as clap::ValueEnum>::from_str(s, true).map_err(|_| HspfError::InvalidFormat {
            message: format!("unknown table format '{}'", s),
        })
    }
}

/// Presentation of a float, after the Python format mini-language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FloatStyle {
    /// `f`
    Fixed,
    /// `e`
    Exponent,
    /// `g`
    General,
    /// `%`
    Percent,
}

/// Float format such as `.2f`, `.3e`, `g` or `.1%`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloatFormat {
    pub precision: Option<usize>,
    pub style: FloatStyle,
}

impl FloatFormat {
    pub fn new(precision: Option<usize>, style: FloatStyle) -> Self {
        Self { precision, style }
    }

    /// Format one value; non-finite values use `nan`/`inf` spelling
    pub fn format(&self, value: f64) -> String {
        if value.is_nan() {
            return "nan".to_string();
        }
        if value.is_infinite() {
            return if value > 0.0 { "inf" } else { "-inf" }.to_string();
        }

        let precision = self.precision.unwrap_or(6);
        match self.style {
            FloatStyle::Fixed => format!("{:.*}", precision, value),
            FloatStyle::Exponent => exponent(value, precision),
            FloatStyle::Percent => format!("{:.*}%", precision, value * 100.0),
            FloatStyle::General => general(value, precision.max(1)),
        }
    }
}

impl FromStr for FloatFormat {
    type Err = HspfError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || HspfError::InvalidFormat {
            message: format!(
                "float format '{}' must look like '.2f', '.3e', 'g' or '.1%'",
                s
            ),
        };

        let text = s.trim();
        let (body, style) = match text.chars().last() {
            Some('f') | Some('F') => (&text[..text.len() - 1], FloatStyle::Fixed),
            Some('e') | Some('E') => (&text[..text.len() - 1], FloatStyle::Exponent),
            Some('g') | Some('G') => (&text[..text.len() - 1], FloatStyle::General),
            Some('%') => (&text[..text.len() - 1], FloatStyle::Percent),
            _ => return Err(invalid()),
        };

        let precision = match body {
            "" => None,
            _ => {
                let digits = body.strip_prefix('.').ok_or_else(invalid)?;
                Some(digits.parse::<usize>().map_err(|_| invalid())?)
            }
        };

        Ok(Self::new(precision, style))
    }
}

impl fmt::Display for FloatFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(precision) = self.precision {
            write!(f, ".{}", precision)?;
        }
        let style = match self.style {
            FloatStyle::Fixed => "f",
            FloatStyle::Exponent => "e",
            FloatStyle::General => "g",
            FloatStyle::Percent => "%",
        };
        f.write_str(style)
    }
}

/// `1.5e+03` style exponent with a sign and at least two digits
fn exponent(value: f64, precision: usize) -> String {
    let rendered = format!("{:.*e}", precision, value);
    match rendered.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exp),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => rendered,
    }
}

/// Shortest of fixed or exponent notation with `precision` significant
/// digits and trailing zeros removed
fn general(value: f64, precision: usize) -> String {
    if value == 0.0 {
        return "0".to_string();
    }

    let scientific = format!("{:.*e}", precision - 1, value);
    let exp = scientific
        .split_once('e')
        .and_then(|(_, exp)| exp.parse::<i32>().ok())
        .unwrap_or(0);

    if exp < -4 || exp >= precision as i32 {
        let rendered = exponent(value, precision - 1);
        match rendered.split_once('e') {
            Some((mantissa, exp)) => format!("{}e{}", strip_zeros(mantissa), exp),
            None => rendered,
        }
    } else {
        let decimals = (precision as i32 - 1 - exp).max(0) as usize;
        strip_zeros(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn strip_zeros(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

/// Header and cell text of a frame
fn cells(frame: &DataFrame, float_format: &FloatFormat) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let header: Vec<String> = frame
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();

    let mut columns: Vec<Vec<String>> = Vec::with_capacity(frame.width());
    for column in frame.get_columns() {
        let text: Vec<String> = match column.dtype() {
            DataType::Float64 | DataType::Float32 => column
                .cast(&DataType::Float64)?
                .f64()?
                .into_iter()
                .map(|value| match value {
                    Some(value) if !value.is_nan() => float_format.format(value),
                    _ => String::new(),
                })
                .collect(),
            DataType::String => column
                .str()?
                .into_iter()
                .map(|value| value.unwrap_or_default().to_string())
                .collect(),
            dtype if dtype.is_integer() => column
                .cast(&DataType::Int64)?
                .i64()?
                .into_iter()
                .map(|value| value.map(|v| v.to_string()).unwrap_or_default())
                .collect(),
            dtype => {
                return Err(HspfError::InvalidFormat {
                    message: format!("cannot render column '{}' of type {}", column.name(), dtype),
                });
            }
        };
        columns.push(text);
    }

    let rows = (0..frame.height())
        .map(|row| columns.iter().map(|column| column[row].clone()).collect())
        .collect();
    Ok((header, rows))
}

/// Render a frame to text
pub fn render(frame: &DataFrame, format: TableFormat, float_format: &FloatFormat) -> Result<String> {
    let (header, rows) = cells(frame, float_format)?;

    if let Some((delimiter, padded)) = format.delimiter() {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(Vec::new());
        let pad = |record: Vec<String>| -> Vec<String> {
            if !padded {
                return record;
            }
            record
                .into_iter()
                .enumerate()
                .map(|(i, field)| if i == 0 { field } else { format!(" {}", field) })
                .collect()
        };

        writer.write_record(pad(header))?;
        for row in rows {
            writer.write_record(pad(row))?;
        }
        let bytes = writer.into_inner().map_err(|e| HspfError::Io(e.into_error()))?;
        return Ok(String::from_utf8_lossy(&bytes).into_owned());
    }

    let numeric: Vec<bool> = frame
        .get_columns()
        .iter()
        .map(|column| column.dtype().is_float() || column.dtype().is_integer())
        .collect();

    let mut table = Table::new();
    table.load_preset(format.preset());
    table.set_header(header);
    for row in rows {
        table.add_row(row);
    }
    for (index, is_numeric) in numeric.into_iter().enumerate() {
        if let Some(column) = table.column_mut(index) {
            let alignment = if is_numeric {
                CellAlignment::Right
            } else {
                CellAlignment::Left
            };
            column.set_cell_alignment(alignment);
        }
    }

    Ok(format!("{}\n", table))
}

/// Render a frame and write it to `output`, or stdout when None
pub fn write_table(
    frame: &DataFrame,
    format: TableFormat,
    float_format: &FloatFormat,
    output: Option<&Path>,
) -> Result<()> {
    let text = render(frame, format, float_format)?;
    match output {
        Some(path) => {
            let mut file = File::create(path)?;
            file.write_all(text.as_bytes())?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(text.as_bytes())?;
            handle.flush()?;
        }
    }
    Ok(())
}
