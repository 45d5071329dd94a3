//! Growth command implementation.

use anyhow::Result;
use clap::Args;

use intrinsic_engine::growth_stage;
use intrinsic_valuation::growth::{GrowthMethod, ModelScale};

use crate::cli::OutputFormat;
use crate::commands::InputArgs;
use crate::output::{format_optional_rate, print_key_values, KeyValue};

/// Arguments for the growth command.
#[derive(Args, Debug)]
pub struct GrowthArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

/// Lowercase name of a growth method.
pub fn method_label(method: GrowthMethod) -> &'static str {
    match method {
        GrowthMethod::Blended => "blended",
        GrowthMethod::Fallback => "fallback",
        GrowthMethod::Override => "override",
    }
}

fn scale_label(scale: Option<ModelScale>) -> &'static str {
    match scale {
        Some(ModelScale::Log) => "log",
        Some(ModelScale::Linear) => "linear",
        None => "n/a",
    }
}

/// Execute the growth command.
pub fn execute(args: GrowthArgs, format: OutputFormat) -> Result<()> {
    let inputs = args.input.load()?;
    let estimate = growth_stage(&inputs);

    let mut results = vec![
        KeyValue::new("Symbol", inputs.company.symbol.clone()),
        KeyValue::new("Method", method_label(estimate.method)),
        KeyValue::new("Scale", scale_label(estimate.scale)),
        KeyValue::new("Observations", estimate.observations.to_string()),
        KeyValue::new("Horizon", format!("{} years", estimate.horizon)),
    ];

    if let Some(holt) = &estimate.holt {
        results.push(KeyValue::separator());
        results.push(KeyValue::from_number("Holt Alpha", holt.alpha, 4));
        results.push(KeyValue::from_number("Holt Beta", holt.beta, 4));
        results.push(KeyValue::from_number("Holt MSE", holt.mse, 6));
        results.push(KeyValue::from_number("Holt MSE (grid)", holt.coarse_mse, 6));
        results.push(KeyValue::new("Holt Growth", format_optional_rate(holt.growth)));
    }

    if let Some(reg) = &estimate.regression {
        results.push(KeyValue::separator());
        results.push(KeyValue::from_number("Regression Slope", reg.slope, 6));
        results.push(KeyValue::from_number("Regression R²", reg.r_squared, 4));
        results.push(KeyValue::new("Regression Growth", format_optional_rate(reg.growth)));
    }

    results.push(KeyValue::separator());
    results.push(KeyValue::from_rate("Growth Rate", estimate.rate));

    print_key_values("Revenue Growth Forecast", &results, "Growth Rate", format)
}
