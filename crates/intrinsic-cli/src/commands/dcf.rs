//! DCF command implementation.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use intrinsic_engine::compute;
use intrinsic_valuation::dcf::{DcfValuation, MultipleSource, ProjectionRow, RowKind};

use crate::cli::OutputFormat;
use crate::commands::InputArgs;
use crate::output::{
    format_amount, format_optional_amount, format_optional_rate, print_header, print_output,
    print_table, KeyValue,
};

/// Arguments for the dcf command.
#[derive(Args, Debug)]
pub struct DcfArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

/// One projection table row, formatted for display.
#[derive(Debug, Serialize, Tabled)]
struct ProjectionDisplay {
    #[tabled(rename = "Year")]
    year: i32,
    #[tabled(rename = "")]
    kind: &'static str,
    #[tabled(rename = "Revenue")]
    revenue: String,
    #[tabled(rename = "Growth")]
    growth: String,
    #[tabled(rename = "EBITDA")]
    ebitda: String,
    #[tabled(rename = "Margin")]
    margin: String,
    #[tabled(rename = "D&A")]
    depreciation: String,
    #[tabled(rename = "NOPAT")]
    nopat: String,
    #[tabled(rename = "CapEx")]
    capex: String,
    #[tabled(rename = "ΔWC")]
    working_capital: String,
    #[tabled(rename = "UFCF")]
    fcf: String,
    #[tabled(rename = "t")]
    period: String,
    #[tabled(rename = "DF")]
    discount_factor: String,
    #[tabled(rename = "PV")]
    present_value: String,
}

impl From<&ProjectionRow> for ProjectionDisplay {
    fn from(row: &ProjectionRow) -> Self {
        Self {
            year: row.fiscal_year,
            kind: match row.kind {
                RowKind::Historical => "A",
                RowKind::Projected => "E",
            },
            revenue: format_amount(row.revenue),
            growth: format_optional_rate(row.revenue_growth),
            ebitda: format_optional_amount(row.ebitda),
            margin: row
                .ebitda_margin
                .map_or_else(|| "n/a".to_string(), |m| format!("{:.1}%", m * 100.0)),
            depreciation: format_amount(row.depreciation),
            nopat: format_optional_amount(row.nopat),
            capex: format_amount(row.capital_expenditure),
            working_capital: format_amount(row.change_in_working_capital),
            fcf: format_optional_amount(row.unlevered_fcf),
            period: format!("{:.1}", row.discount_period),
            discount_factor: format!("{:.4}", row.discount_factor),
            present_value: format_optional_amount(row.discounted_fcf),
        }
    }
}

fn multiple_label(source: Option<MultipleSource>) -> &'static str {
    match source {
        Some(MultipleSource::Override) => "override",
        Some(MultipleSource::TrailingEvEbitda) => "trailing EV/EBITDA",
        Some(MultipleSource::Fallback) => "fallback",
        None => "n/a",
    }
}

fn summary(dcf: &DcfValuation) -> Vec<KeyValue> {
    let terminal = &dcf.terminal;
    let bridge = &dcf.bridge;

    let mut results = vec![
        KeyValue::from_rate("Growth", dcf.growth),
        KeyValue::from_rate("WACC", dcf.wacc),
        KeyValue::new("Terminal Method", terminal.method.to_string()),
    ];
    if let Some(multiple) = terminal.exit_multiple {
        results.push(KeyValue::new(
            "Exit Multiple",
            format!("{:.2}x ({})", multiple, multiple_label(terminal.multiple_source)),
        ));
    }
    results.extend([
        KeyValue::from_amount("Terminal Value", terminal.value),
        KeyValue::from_number("Terminal Discount Factor", terminal.discount_factor, 4),
        KeyValue::separator(),
        KeyValue::from_amount("PV of FCF", bridge.sum_discounted_fcf),
        KeyValue::from_amount("PV of Terminal Value", bridge.pv_terminal_value),
        KeyValue::from_amount("Enterprise Value", bridge.enterprise_value),
        KeyValue::from_amount("Total Debt", bridge.total_debt),
        KeyValue::from_amount("Cash", bridge.cash),
        KeyValue::from_amount("Equity Value", bridge.equity_value),
        KeyValue::new(
            "Shares Outstanding",
            format!("{:.0} ({})", bridge.shares_outstanding, bridge.shares_source),
        ),
        KeyValue::from_amount("Intrinsic Value", bridge.intrinsic_value_per_share),
        KeyValue::from_amount("Current Price", bridge.current_price),
        KeyValue::new("Premium", format_optional_rate(bridge.premium)),
    ]);
    results
}

/// Execute the dcf command.
pub fn execute(args: DcfArgs, format: OutputFormat) -> Result<()> {
    let inputs = args.input.load()?;
    let outputs = compute(&inputs)?;
    let dcf = outputs.require_dcf()?;

    let rows: Vec<ProjectionDisplay> = dcf.projection.rows().iter().map(Into::into).collect();

    match format {
        OutputFormat::Table => {
            print_header(&format!("DCF Projection: {}", inputs.company.symbol));
            print_table(&rows)?;
            print_header("Terminal Value and Equity Bridge");
            print_table(&summary(dcf))
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(dcf)?);
            Ok(())
        }
        OutputFormat::Csv => print_output(&rows, format),
        OutputFormat::Minimal => {
            println!("{}", format_amount(dcf.intrinsic_value_per_share()));
            Ok(())
        }
    }
}
