//! Sustainable growth command implementation.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use intrinsic_engine::sustainable_stage;
use intrinsic_valuation::sustainable::{SgrMethod, SgrSelection, SustainableGrowth};

use crate::cli::OutputFormat;
use crate::commands::InputArgs;
use crate::error::{CliError, CliResult};
use crate::output::{format_optional_rate, print_header, print_output, print_table};

/// Arguments for the sgr command.
#[derive(Args, Debug)]
pub struct SgrArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Leave a method out of the average (repeatable), e.g. `revenue_cagr`
    #[arg(long = "exclude", value_name = "METHOD")]
    pub exclude: Vec<String>,
}

/// Command-line key of a method.
fn method_key(method: SgrMethod) -> &'static str {
    match method {
        SgrMethod::RoeAveraged => "roe_averaged",
        SgrMethod::RoePerPeriod => "roe_per_period",
        SgrMethod::RoicAveraged => "roic_averaged",
        SgrMethod::RoicPerPeriod => "roic_per_period",
        SgrMethod::RoeFullRetention => "roe_full_retention",
        SgrMethod::RoicFullRetention => "roic_full_retention",
        SgrMethod::DuPont => "du_pont",
        SgrMethod::RevenueCagr => "revenue_cagr",
    }
}

fn parse_method(name: &str) -> CliResult<SgrMethod> {
    let key = name.trim().to_lowercase().replace('-', "_");
    SgrMethod::ALL
        .into_iter()
        .find(|m| method_key(*m) == key)
        .ok_or_else(|| CliError::UnknownMethod(name.to_string()))
}

fn selection(exclude: &[String]) -> CliResult<SgrSelection> {
    exclude
        .iter()
        .try_fold(SgrSelection::all(), |sel, name| Ok(sel.without(parse_method(name)?)))
}

#[derive(Debug, Serialize, Tabled)]
struct SgrRow {
    #[tabled(rename = "Method")]
    method: String,
    #[tabled(rename = "Key")]
    key: &'static str,
    #[tabled(rename = "Estimate")]
    estimate: String,
    #[tabled(rename = "In Average")]
    included: bool,
}

fn rows(sgr: &SustainableGrowth, selection: &SgrSelection) -> Vec<SgrRow> {
    SgrMethod::ALL
        .into_iter()
        .map(|m| SgrRow {
            method: m.label().to_string(),
            key: method_key(m),
            estimate: format_optional_rate(sgr.get(m)),
            included: selection.contains(m),
        })
        .collect()
}

/// Execute the sgr command.
pub fn execute(args: SgrArgs, format: OutputFormat) -> Result<()> {
    let selection = selection(&args.exclude)?;
    let inputs = args.input.load()?;
    let sgr = sustainable_stage(&inputs).map_err(|e| CliError::Calculation(e.to_string()))?;
    let average = sgr.average(&selection);

    match format {
        OutputFormat::Table => {
            print_header(&format!("Sustainable Growth: {}", inputs.company.symbol));
            print_table(&rows(&sgr, &selection))?;
            println!("Average: {}", format_optional_rate(average));
            Ok(())
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "symbol": inputs.company.symbol,
                "estimates": sgr.estimates,
                "periods": sgr.periods,
                "excluded": SgrMethod::ALL
                    .into_iter()
                    .filter(|m| !selection.contains(*m))
                    .collect::<Vec<_>>(),
                "average": average,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        OutputFormat::Csv => print_output(&rows(&sgr, &selection), format),
        OutputFormat::Minimal => {
            println!("{}", format_optional_rate(average));
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_method_accepts_dashes_and_case() {
        assert_eq!(parse_method("revenue-cagr").unwrap(), SgrMethod::RevenueCagr);
        assert_eq!(parse_method("DU_PONT").unwrap(), SgrMethod::DuPont);
        assert!(matches!(
            parse_method("magic"),
            Err(CliError::UnknownMethod(name)) if name == "magic"
        ));
    }

    #[test]
    fn test_selection_excludes_named_methods() {
        let sel = selection(&["roe_averaged".to_string(), "revenue_cagr".to_string()]).unwrap();
        assert!(!sel.contains(SgrMethod::RoeAveraged));
        assert!(!sel.contains(SgrMethod::RevenueCagr));
        assert!(sel.contains(SgrMethod::DuPont));
    }
}
