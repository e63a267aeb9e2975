//! Command-line argument definitions for hspf_utils
//!
//! This module defines the CLI interface using the clap derive API. Every
//! report subcommand shares the output options in [`OutputArgs`].

use crate::config::{BalanceConfig, OutputConfig};
use crate::constants::{DEFAULT_BALANCE_FLOAT_FORMAT, DEFAULT_MODULUS, DEFAULT_TABLE_FLOAT_FORMAT};
use crate::error::Result;
use crate::models::Constituent;
use crate::output::{FloatFormat, TableFormat};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for the HSPF post-processor
///
/// Builds water and mass balance tables, GIS mapping tables and parameter
/// tables from HSPF binary output (HBN) and model (UCI) files.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "hspf_utils",
    version,
    about = "Water and mass balance tables from HSPF binary output and UCI files",
    long_about = "Post-processes HSPF model runs. Balance reports reduce the yearly PERLND and \
                  IMPLND output of an HBN file to one column per land-cover class, area weighted \
                  when the UCI file is supplied. Mapping and parameter reports give one row per \
                  land unit for joining to GIS layers."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Only show errors
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        help = "Suppress warnings, only show errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Detailed water or mass balance table, one row per HSPF variable
    Detailed(BalanceArgs),
    /// Summary water or mass balance table
    Summary(BalanceArgs),
    /// Mean yearly PERLND/IMPLND values per land unit, for GIS joins
    Mapping(MappingArgs),
    /// PWAT-PARM2/3/4 parameters per land unit from a UCI file
    Parameters(ParametersArgs),
    /// Display version and description
    About,
}

/// Arguments shared by the `detailed` and `summary` commands
#[derive(Debug, Clone, ClapArgs)]
pub struct BalanceArgs {
    /// HSPF binary output file
    #[arg(value_name = "HBN")]
    pub hbn: PathBuf,

    /// UCI file of the run; enables area weighting and land-cover names
    #[arg(long, value_name = "UCI")]
    pub uci: Option<PathBuf>,

    /// Report a single year instead of the mean over all years
    #[arg(long)]
    pub year: Option<i32>,

    /// Land unit ids are grouped into land-cover classes by `id % modulus`
    #[arg(long, default_value_t = DEFAULT_MODULUS)]
    pub modulus: u32,

    /// Water (flow) or quality (qual) balance
    #[arg(long, value_enum, default_value = "flow")]
    pub constituent: Constituent,

    /// Comma separated quality names, required for `--constituent qual`
    #[arg(long, value_name = "NAMES")]
    pub qualnames: Option<String>,

    /// Land unit filter: an id, a range `start:end`, or a union joined by `+`
    #[arg(long = "perlnd-num", value_name = "EXPR")]
    pub perlnd_num: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,

    /// Float format of the table cells
    #[arg(long, default_value = DEFAULT_BALANCE_FLOAT_FORMAT)]
    pub float_format: String,
}

/// Arguments for the `mapping` command
#[derive(Debug, Clone, ClapArgs)]
pub struct MappingArgs {
    /// HSPF binary output file
    #[arg(value_name = "HBN")]
    pub hbn: PathBuf,

    /// Report a single year instead of the mean over all years
    #[arg(long)]
    pub year: Option<i32>,

    /// Text prepended to each land unit id in the `lue` column
    #[arg(long, default_value = "")]
    pub index_prefix: String,

    #[command(flatten)]
    pub output: OutputArgs,

    /// Float format of the table cells
    #[arg(long, default_value = DEFAULT_TABLE_FLOAT_FORMAT)]
    pub float_format: String,
}

/// Arguments for the `parameters` command
#[derive(Debug, Clone, ClapArgs)]
pub struct ParametersArgs {
    /// UCI file
    #[arg(value_name = "UCI")]
    pub uci: PathBuf,

    /// Text prepended to each land unit id in the `lue` column
    #[arg(long, default_value = "")]
    pub index_prefix: String,

    /// Text between the prefix and the land unit id
    #[arg(long, default_value = "")]
    pub index_delimiter: String,

    #[command(flatten)]
    pub output: OutputArgs,

    /// Float format of the table cells
    #[arg(long, default_value = DEFAULT_TABLE_FLOAT_FORMAT)]
    pub float_format: String,
}

/// Table layout and destination
#[derive(Debug, Clone, ClapArgs)]
pub struct OutputArgs {
    /// Table layout
    #[arg(long, value_enum, default_value = "csv_nos")]
    pub tablefmt: TableFormat,

    /// Write the table to this file instead of stdout
    #[arg(short = 'o', long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

impl Args {
    /// Log level from the verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }
}

impl BalanceArgs {
    /// Report settings from the command line
    pub fn balance_config(&self) -> BalanceConfig {
        let mut config = BalanceConfig::default()
            .with_modulus(self.modulus)
            .with_constituent(self.constituent);
        if let Some(year) = self.year {
            config = config.with_year(year);
        }
        if let Some(names) = &self.qualnames {
            config = config.with_qual_names(names);
        }
        if let Some(expression) = &self.perlnd_num {
            config = config.with_unit_filter(expression);
        }
        config
    }

    pub fn output_config(&self) -> Result<OutputConfig> {
        self.output.config(&self.float_format)
    }
}

impl OutputArgs {
    /// Output settings with the given float format
    pub fn config(&self, float_format: &str) -> Result<OutputConfig> {
        let float_format: FloatFormat = float_format.parse()?;
        Ok(OutputConfig::default()
            .with_table_format(self.tablefmt)
            .with_float_format(float_format))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_defaults() {
        let args = Args::try_parse_from(["hspf_utils", "summary", "model.hbn"]).unwrap();
        let Commands::Summary(balance) = &args.command else {
            panic!("expected summary command");
        };

        assert_eq!(balance.hbn, PathBuf::from("model.hbn"));
        assert_eq!(balance.balance_config(), BalanceConfig::default());
        assert_eq!(balance.output_config().unwrap(), OutputConfig::default());
        assert_eq!(args.get_log_level(), "warn");
    }

    #[test]
    fn test_detailed_options() {
        let args = Args::try_parse_from([
            "hspf_utils",
            "detailed",
            "model.hbn",
            "--uci",
            "model.uci",
            "--year",
            "1996",
            "--constituent",
            "qual",
            "--qualnames",
            "TOTAL N,TOTAL P",
            "--perlnd-num",
            "1:20",
            "--tablefmt",
            "fancy_grid",
            "--float-format",
            ".3e",
            "-vv",
        ])
        .unwrap();
        assert_eq!(args.get_log_level(), "debug");

        let Commands::Detailed(balance) = args.command else {
            panic!("expected detailed command");
        };
        let config = balance.balance_config();
        assert_eq!(config.year, Some(1996));
        assert_eq!(config.constituent, Constituent::Qual);
        assert_eq!(config.qual_names, vec!["TOTAL N", "TOTAL P"]);
        assert_eq!(config.unit_ids().unwrap().map(|ids| ids.len()), Some(20));

        let output = balance.output_config().unwrap();
        assert_eq!(output.table_format, TableFormat::FancyGrid);
        assert_eq!(output.float_format.to_string(), ".3e");
    }

    #[test]
    fn test_parameters_and_mapping() {
        let args = Args::try_parse_from([
            "hspf_utils",
            "parameters",
            "model.uci",
            "--index-prefix",
            "lu",
            "--index-delimiter",
            "_",
            "-q",
        ])
        .unwrap();
        assert_eq!(args.get_log_level(), "error");
        let Commands::Parameters(parameters) = args.command else {
            panic!("expected parameters command");
        };
        assert_eq!(parameters.float_format, "g");
        assert_eq!(parameters.index_delimiter, "_");

        let args = Args::try_parse_from(["hspf_utils", "mapping", "model.hbn", "--year", "1995"])
            .unwrap();
        assert!(matches!(args.command, Commands::Mapping(MappingArgs { year: Some(1995), .. })));
    }

    #[test]
    fn test_invalid_float_format() {
        let args = Args::try_parse_from(["hspf_utils", "summary", "m.hbn", "--float-format", "2"])
            .unwrap();
        let Commands::Summary(balance) = args.command else {
            panic!("expected summary command");
        };
        assert!(balance.output_config().is_err());
    }
}
