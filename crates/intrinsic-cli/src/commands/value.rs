//! Value command implementation.
//!
//! Runs the whole pipeline and reports the per-share intrinsic value.

use anyhow::Result;
use clap::Args;

use intrinsic_engine::compute;
use intrinsic_valuation::sustainable::SgrSelection;

use crate::cli::OutputFormat;
use crate::commands::growth::method_label;
use crate::commands::InputArgs;
use crate::output::{format_optional_rate, format_rate, print_key_values, print_warning, KeyValue};

/// Arguments for the value command.
#[derive(Args, Debug)]
pub struct ValueArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

/// Execute the value command.
pub fn execute(args: ValueArgs, format: OutputFormat) -> Result<()> {
    let inputs = args.input.load()?;
    let outputs = compute(&inputs)?;

    let dcf = outputs.require_dcf()?;
    let bridge = &dcf.bridge;

    if let Err(e) = &outputs.capital {
        if format == OutputFormat::Table {
            print_warning(&format!("cost of capital unavailable: {}", e));
        }
    }

    let mut results = vec![
        KeyValue::new("Symbol", inputs.company.symbol.clone()),
        KeyValue::new("Preset", inputs.assumptions.name.clone()),
        KeyValue::separator(),
        KeyValue::new(
            "Growth",
            format!(
                "{} ({})",
                format_rate(outputs.growth.rate),
                method_label(outputs.growth.method)
            ),
        ),
        KeyValue::new(
            "WACC",
            format!(
                "{}{}",
                format_rate(dcf.wacc),
                if inputs.assumptions.wacc_override_pct.is_some() {
                    " (override)"
                } else {
                    ""
                }
            ),
        ),
        KeyValue::new("Horizon", format!("{} years", inputs.assumptions.horizon_years)),
        KeyValue::new("Terminal Method", inputs.assumptions.terminal_method.to_string()),
        KeyValue::separator(),
        KeyValue::from_amount("PV of FCF", bridge.sum_discounted_fcf),
        KeyValue::from_amount("PV of Terminal Value", bridge.pv_terminal_value),
        KeyValue::from_amount("Enterprise Value", bridge.enterprise_value),
        KeyValue::from_amount("Net Debt", bridge.net_debt),
        KeyValue::from_amount("Equity Value", bridge.equity_value),
        KeyValue::new(
            "Shares Outstanding",
            format!("{:.0} ({})", bridge.shares_outstanding, bridge.shares_source),
        ),
        KeyValue::separator(),
        KeyValue::from_amount("Intrinsic Value", bridge.intrinsic_value_per_share),
        KeyValue::from_amount("Current Price", bridge.current_price),
    ];
    results.push(KeyValue::new(
        "Premium",
        dcf.premium_pct()
            .map_or_else(|| "n/a".to_string(), |p| format!("{:+.2}%", p)),
    ));
    if let Ok(sgr) = &outputs.sustainable {
        results.push(KeyValue::new(
            "Sustainable Growth (avg)",
            format_optional_rate(sgr.average(&SgrSelection::all())),
        ));
    }

    print_key_values("Intrinsic Valuation", &results, "Intrinsic Value", format)
}
