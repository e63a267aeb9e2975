//! Command implementations for the hspf_utils CLI
//!
//! Sets up logging, builds the requested report and writes it out.

use crate::balance;
use crate::cli::args::{Args, BalanceArgs, Commands, MappingArgs, ParametersArgs};
use crate::config::BalanceConfig;
use crate::error::Result;
use crate::mapping::mapping;
use crate::output::write_table;
use crate::uci::parameters;
use colored::*;
use polars::prelude::DataFrame;
use std::path::Path;
use tracing::{debug, info};

/// Main command runner
pub fn run(args: Args) -> Result<()> {
    setup_logging(&args);
    debug!("Command line arguments: {:?}", args);

    match &args.command {
        Commands::Detailed(balance_args) => run_balance(balance_args, balance::detailed),
        Commands::Summary(balance_args) => run_balance(balance_args, balance::summary),
        Commands::Mapping(mapping_args) => run_mapping(mapping_args),
        Commands::Parameters(parameter_args) => run_parameters(parameter_args),
        Commands::About => {
            print_about();
            Ok(())
        }
    }
}

type BalanceReport = fn(&Path, Option<&Path>, &BalanceConfig) -> Result<DataFrame>;

fn run_balance(args: &BalanceArgs, report: BalanceReport) -> Result<()> {
    let config = args.balance_config();
    let output = args.output_config()?;

    info!("Reading {}", args.hbn.display());
    let frame = report(&args.hbn, args.uci.as_deref(), &config)?;

    write_table(
        &frame,
        output.table_format,
        &output.float_format,
        args.output.output.as_deref(),
    )
}

fn run_mapping(args: &MappingArgs) -> Result<()> {
    let output = args.output.config(&args.float_format)?;

    info!("Reading {}", args.hbn.display());
    let frame = mapping(&args.hbn, args.year, &args.index_prefix)?;

    write_table(
        &frame,
        output.table_format,
        &output.float_format,
        args.output.output.as_deref(),
    )
}

fn run_parameters(args: &ParametersArgs) -> Result<()> {
    let output = args.output.config(&args.float_format)?;

    info!("Reading {}", args.uci.display());
    let frame = parameters(&args.uci, &args.index_prefix, &args.index_delimiter)?;

    write_table(
        &frame,
        output.table_format,
        &output.float_format,
        args.output.output.as_deref(),
    )
}

/// Set up structured logging to stderr; `RUST_LOG` overrides the flags
fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("hspf_utils={}", log_level)));

    // A second initialization, as in tests, keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .try_init();

    debug!("Logging initialized at level: {}", log_level);
}

fn print_about() {
    println!(
        "{} {}",
        env!("CARGO_PKG_NAME").bright_green().bold(),
        env!("CARGO_PKG_VERSION").bright_yellow()
    );
    println!("{}", env!("CARGO_PKG_DESCRIPTION"));
    println!();
    println!("{}", "Commands:".bright_white().bold());
    for (name, description) in [
        ("detailed", "detailed water or mass balance table"),
        ("summary", "summary water or mass balance table"),
        ("mapping", "mean yearly values per land unit for GIS joins"),
        ("parameters", "PWAT-PARM2/3/4 parameters per land unit"),
    ] {
        println!("  {:<12}{}", name.bright_cyan(), description);
    }
}
