//! Config command implementation.
//!
//! Lists and shows assumption presets, and validates or writes assumption files.

use anyhow::Result;
use clap::{Args, Subcommand};
use std::path::PathBuf;

use intrinsic_config::{
    load_assumptions, save_assumptions, ConfigManager, ValuationAssumptions, DEFAULT_PRESET,
};

use crate::cli::OutputFormat;
use crate::output::{print_key_values, print_success, KeyValue};

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// List available presets
    List,

    /// Show the assumptions of a preset
    Show(ShowArgs),

    /// Check an assumptions file
    Validate(ValidateArgs),

    /// Write a preset to a new assumptions file
    Init(InitArgs),
}

/// Arguments for show subcommand.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Preset name
    #[arg(default_value = DEFAULT_PRESET)]
    pub preset: String,
}

/// Arguments for validate subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Assumptions file (.json, .toml, .yaml)
    pub file: PathBuf,
}

/// Arguments for init subcommand.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Destination file; the extension picks the format
    pub file: PathBuf,

    /// Preset to start from
    #[arg(short, long, default_value = DEFAULT_PRESET)]
    pub preset: String,

    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
}

/// Execute the config command.
pub fn execute(args: ConfigArgs, format: OutputFormat) -> Result<()> {
    match args.command {
        ConfigCommand::List => list(format),
        ConfigCommand::Show(a) => show(&a, format),
        ConfigCommand::Validate(a) => validate(&a, format),
        ConfigCommand::Init(a) => init(&a, format),
    }
}

fn list(format: OutputFormat) -> Result<()> {
    let manager = ConfigManager::new();
    let presets = manager
        .list()?
        .into_iter()
        .map(|name| {
            let a = manager.get(&name)?;
            Ok(KeyValue::new(name, a.description.unwrap_or_default()))
        })
        .collect::<Result<Vec<_>>>()?;

    match format {
        OutputFormat::Minimal => {
            for p in &presets {
                println!("{}", p.key);
            }
            Ok(())
        }
        _ => print_key_values("Assumption Presets", &presets, DEFAULT_PRESET, format),
    }
}

fn describe(a: &ValuationAssumptions) -> Vec<KeyValue> {
    let optional_pct =
        |v: Option<f64>| v.map_or_else(|| "computed".to_string(), |p| format!("{:.2}%", p));

    vec![
        KeyValue::new("Name", a.name.clone()),
        KeyValue::new("Description", a.description.clone().unwrap_or_default()),
        KeyValue::new("Read Only", a.read_only.to_string()),
        KeyValue::separator(),
        KeyValue::new("Risk-free Rate", format!("{:.2}%", a.risk_free_rate_pct)),
        KeyValue::new("Equity Risk Premium", format!("{:.2}%", a.equity_risk_premium_pct)),
        KeyValue::new("Marginal Tax Rate", format!("{:.2}%", a.marginal_tax_rate_pct)),
        KeyValue::new("Beta Policy", a.beta_policy.to_string()),
        KeyValue::new("WACC Override", optional_pct(a.wacc_override_pct)),
        KeyValue::separator(),
        KeyValue::new("Horizon", format!("{} years", a.horizon_years)),
        KeyValue::new("History Window", a.history_window.to_string()),
        KeyValue::new("Default Growth", format!("{:.2}%", a.default_growth_pct)),
        KeyValue::new("Growth Override", optional_pct(a.growth_override_pct)),
        KeyValue::new("Terminal Method", a.terminal_method.to_string()),
        KeyValue::new(
            "Exit Multiple",
            a.exit_multiple
                .map_or_else(|| "trailing EV/EBITDA".to_string(), |m| format!("{:.2}x", m)),
        ),
        KeyValue::new("Fallback Exit Multiple", format!("{:.2}x", a.fallback_exit_multiple)),
    ]
}

fn show(args: &ShowArgs, format: OutputFormat) -> Result<()> {
    let assumptions = ConfigManager::new().get(&args.preset)?;
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&assumptions)?);
            Ok(())
        }
        _ => print_key_values(
            &format!("Preset {}", assumptions.name),
            &describe(&assumptions),
            "Name",
            format,
        ),
    }
}

fn validate(args: &ValidateArgs, format: OutputFormat) -> Result<()> {
    let assumptions = load_assumptions(&args.file)?;
    if format == OutputFormat::Table {
        print_success(&format!(
            "{} is valid ({})",
            args.file.display(),
            assumptions.name
        ));
        Ok(())
    } else {
        print_key_values("", &describe(&assumptions), "Name", format)
    }
}

fn init(args: &InitArgs, format: OutputFormat) -> Result<()> {
    if args.file.exists() && !args.force {
        anyhow::bail!(
            "{} already exists; pass --force to overwrite",
            args.file.display()
        );
    }

    let assumptions = ConfigManager::new().get(&args.preset)?;
    save_assumptions(&args.file, &assumptions)?;

    if format != OutputFormat::Minimal {
        print_success(&format!(
            "Wrote {} assumptions to {}",
            args.preset,
            args.file.display()
        ));
    }
    Ok(())
}
