//! Intrinsic CLI - Command-line interface for equity intrinsic valuation.
//!
//! # Usage
//!
//! ```bash
//! # Full valuation of a company snapshot
//! intrinsic value --input acme.json
//!
//! # Revenue growth forecast over a 3-year horizon
//! intrinsic growth --input acme.json --horizon 3
//!
//! # Cost of capital with a conservative preset
//! intrinsic wacc --input acme.json --preset CONSERVATIVE
//!
//! # DCF with a manual WACC and exit multiple, as JSON
//! intrinsic dcf --input acme.json --wacc 9 --exit-multiple 12 --format json
//!
//! # Write the default assumptions to a file
//! intrinsic config init assumptions.toml
//! ```

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod commands;
mod error;
mod output;

use cli::{Cli, Commands};

fn init_logging(cli: &Cli) {
    let default = if cli.verbose {
        "info,intrinsic=debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn,intrinsic=info"
    };
    let filter = if cli.verbose {
        EnvFilter::new(default)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    };

    // stdout carries command output only
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    let format = cli.format;

    match cli.command {
        Commands::Value(args) => commands::value::execute(args, format)?,
        Commands::Growth(args) => commands::growth::execute(args, format)?,
        Commands::Wacc(args) => commands::wacc::execute(args, format)?,
        Commands::Dcf(args) => commands::dcf::execute(args, format)?,
        Commands::Sgr(args) => commands::sgr::execute(args, format)?,
        Commands::Sensitivity(args) => commands::sensitivity::execute(args, format)?,
        Commands::Config(args) => commands::config::execute(args, format)?,
    }

    Ok(())
}
