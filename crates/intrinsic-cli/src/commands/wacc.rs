//! WACC command implementation.

use anyhow::Result;
use clap::Args;

use intrinsic_engine::capital_stage;
use intrinsic_valuation::capital::PreferredCostSource;

use crate::cli::OutputFormat;
use crate::commands::InputArgs;
use crate::error::CliError;
use crate::output::{format_amount, print_key_values, KeyValue};

/// Arguments for the wacc command.
#[derive(Args, Debug)]
pub struct WaccArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

fn preferred_label(source: PreferredCostSource) -> &'static str {
    match source {
        PreferredCostSource::NoPreferred => "none outstanding",
        PreferredCostSource::Dividends => "dividends / book",
        PreferredCostSource::Estimated => "estimated",
    }
}

/// Execute the wacc command.
pub fn execute(args: WaccArgs, format: OutputFormat) -> Result<()> {
    let inputs = args.input.load()?;
    let capital = capital_stage(&inputs).map_err(|e| CliError::Calculation(e.to_string()))?;
    let weights = &capital.structure;

    let icr = if capital.interest_coverage.is_finite() {
        format!("{:.2}x", capital.interest_coverage)
    } else {
        "n/a".to_string()
    };

    let results = vec![
        KeyValue::new("Symbol", inputs.company.symbol.clone()),
        KeyValue::separator(),
        KeyValue::new("Interest Coverage", icr),
        KeyValue::new("Synthetic Rating", capital.rating.to_string()),
        KeyValue::from_rate("Default Spread", capital.default_spread),
        KeyValue::from_rate("Pre-tax Cost of Debt", capital.pre_tax_cost_of_debt),
        KeyValue::from_rate("After-tax Cost of Debt", capital.after_tax_cost_of_debt),
        KeyValue::separator(),
        KeyValue::new(
            "Beta",
            format!("{:.3} ({})", capital.beta, capital.beta_policy),
        ),
        KeyValue::from_rate("Cost of Equity", capital.cost_of_equity),
        KeyValue::new(
            "Cost of Preferred",
            format!(
                "{:.2}% ({})",
                capital.cost_of_preferred.as_percent(),
                preferred_label(capital.preferred_source)
            ),
        ),
        KeyValue::separator(),
        KeyValue::new("Total Debt", format_amount(capital.total_debt)),
        KeyValue::new("Market Cap", format_amount(capital.market_cap)),
        KeyValue::new("Preferred Stock", format_amount(capital.preferred_stock)),
        KeyValue::from_number("Debt Weight", weights.debt_weight, 4),
        KeyValue::from_number("Equity Weight", weights.equity_weight, 4),
        KeyValue::from_number("Preferred Weight", weights.preferred_weight, 4),
        KeyValue::separator(),
        KeyValue::from_rate("WACC", capital.wacc),
    ];

    print_key_values("Cost of Capital", &results, "WACC", format)
}
