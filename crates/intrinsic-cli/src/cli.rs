//! CLI argument definitions.

use clap::{Parser, Subcommand, ValueEnum};

use crate::commands::{
    ConfigArgs, DcfArgs, GrowthArgs, SensitivityArgs, SgrArgs, ValueArgs, WaccArgs,
};

/// Intrinsic - Equity intrinsic valuation CLI
#[derive(Parser)]
#[command(name = "intrinsic")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log at debug level to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Full valuation: growth, WACC, DCF, and per-share value
    Value(ValueArgs),

    /// Forecast revenue growth (Holt smoothing and regression)
    Growth(GrowthArgs),

    /// Cost of capital breakdown (synthetic rating, CAPM, WACC)
    Wacc(WaccArgs),

    /// Discounted cash flow projection table
    Dcf(DcfArgs),

    /// Sustainable growth rate cross-checks
    Sgr(SgrArgs),

    /// Per-share value across WACC and exit multiple
    Sensitivity(SensitivityArgs),

    /// Manage assumption presets and files
    Config(ConfigArgs),
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
    /// Minimal output (just the value)
    Minimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_command_definition() {
        Cli::command().debug_assert();
        assert_eq!(Cli::command().get_author(), Some("Intrinsic Developers"));
    }
}
