use clap::Parser;
use hspf_utils::cli::{args::Args, commands};
use std::process;

fn main() {
    let args = Args::parse();

    if let Err(error) = commands::run(args).map_err(anyhow::Error::from) {
        eprintln!("Error: {:#}", error);
        process::exit(1);
    }
}
