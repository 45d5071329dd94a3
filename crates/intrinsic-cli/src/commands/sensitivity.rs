//! Sensitivity command implementation.

use anyhow::Result;
use clap::Args;
use tabled::builder::Builder;
use tabled::settings::Style;

use intrinsic_core::Rate;
use intrinsic_engine::compute;
use intrinsic_valuation::sensitivity::{sensitivity_grid, SensitivityConfig, SensitivityGrid};

use crate::cli::OutputFormat;
use crate::commands::{validate_percent, validate_positive, InputArgs};
use crate::error::CliError;
use crate::output::{format_amount, format_optional_amount, print_header};

/// Arguments for the sensitivity command.
#[derive(Args, Debug)]
pub struct SensitivityArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// WACC spacing (percent)
    #[arg(long, default_value = "1.0")]
    pub wacc_step: f64,

    /// WACC points on each side of the center
    #[arg(long, default_value = "2")]
    pub wacc_steps: usize,

    /// Exit multiple spacing
    #[arg(long, default_value = "1.0")]
    pub multiple_step: f64,

    /// Exit multiple points on each side of the center
    #[arg(long, default_value = "2")]
    pub multiple_steps: usize,
}

impl SensitivityArgs {
    fn config(&self) -> Result<SensitivityConfig> {
        Ok(SensitivityConfig {
            wacc_step: Rate::from_percent(validate_percent(
                "wacc step",
                self.wacc_step,
                0.01,
                10.0,
            )?),
            wacc_steps: self.wacc_steps,
            multiple_step: validate_positive("multiple step", self.multiple_step)?,
            multiple_steps: self.multiple_steps,
        })
    }
}

fn render(grid: &SensitivityGrid) -> String {
    let mut builder = Builder::default();

    let mut header = vec!["WACC \\ Multiple".to_string()];
    header.extend(grid.multiples.iter().map(|m| format!("{:.1}x", m)));
    builder.push_record(header);

    for (i, wacc) in grid.waccs.iter().enumerate() {
        let mut record = vec![format!("{:.2}%", wacc.as_percent())];
        record.extend((0..grid.multiples.len()).map(|j| format_optional_amount(grid.get(i, j))));
        builder.push_record(record);
    }

    builder.build().with(Style::rounded()).to_string()
}

/// Execute the sensitivity command.
pub fn execute(args: SensitivityArgs, format: OutputFormat) -> Result<()> {
    let config = args.config()?;
    let inputs = args.input.load()?;
    let outputs = compute(&inputs)?;
    let dcf = outputs.require_dcf()?;

    let grid = sensitivity_grid(dcf, &config, inputs.assumptions.fallback_exit_multiple)
        .map_err(|e| CliError::Calculation(e.to_string()))?;

    match format {
        OutputFormat::Table => {
            print_header(&format!("Value per Share: {}", inputs.company.symbol));
            println!("{}", render(&grid));
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&grid)?),
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            wtr.write_record(["wacc_pct", "exit_multiple", "value_per_share"])?;
            for (i, wacc) in grid.waccs.iter().enumerate() {
                for (j, multiple) in grid.multiples.iter().enumerate() {
                    wtr.write_record([
                        format!("{:.4}", wacc.as_percent()),
                        format!("{:.2}", multiple),
                        format_optional_amount(grid.get(i, j)),
                    ])?;
                }
            }
            wtr.flush()?;
        }
        OutputFormat::Minimal => println!("{}", format_amount(dcf.intrinsic_value_per_share())),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_marks_undefined_cells() {
        let grid = SensitivityGrid {
            waccs: vec![Rate::from_percent(8.0), Rate::from_percent(9.0)],
            multiples: vec![10.0, 11.0],
            values: vec![vec![Some(25.5), None], vec![Some(22.0), Some(23.25)]],
        };
        let out = render(&grid);
        assert!(out.contains("10.0x"));
        assert!(out.contains("8.00%"));
        assert!(out.contains("25.50"));
        assert!(out.contains("n/a"));
    }
}
