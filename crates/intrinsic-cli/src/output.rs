//! Output formatting utilities.

use colored::Colorize;
use serde::Serialize;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

use intrinsic_core::Rate;

use crate::cli::OutputFormat;

/// Formats and prints rows based on the specified format.
///
/// `Minimal` prints the first row as JSON.
pub fn print_output<T: Serialize + Tabled>(data: &[T], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => print_table(data),
        OutputFormat::Json => print_json(data),
        OutputFormat::Csv => print_csv(data),
        OutputFormat::Minimal => print_minimal(data),
    }
}

/// Prints key-value results: a table, a JSON object, CSV rows, or one value.
pub fn print_key_values(
    title: &str,
    results: &[KeyValue],
    minimal_key: &str,
    format: OutputFormat,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => {
            print_header(title);
            print_table(results)
        }
        OutputFormat::Json => {
            let object: serde_json::Map<String, serde_json::Value> = results
                .iter()
                .filter(|r| !r.key.is_empty())
                .map(|r| (r.key.clone(), serde_json::Value::String(r.value.clone())))
                .collect();
            println!("{}", serde_json::to_string_pretty(&object)?);
            Ok(())
        }
        OutputFormat::Csv => print_csv(results),
        OutputFormat::Minimal => {
            if let Some(r) = results.iter().find(|r| r.key == minimal_key) {
                println!("{}", r.value);
            }
            Ok(())
        }
    }
}

/// Prints data as a formatted table.
pub fn print_table<T: Tabled>(data: &[T]) -> anyhow::Result<()> {
    if data.is_empty() {
        println!("No results.");
        return Ok(());
    }

    let table = Table::new(data)
        .with(Style::rounded())
        .with(Modify::new(Columns::first()).with(Alignment::left()))
        .to_string();

    println!("{}", table);
    Ok(())
}

/// Prints data as JSON.
fn print_json<T: Serialize>(data: &[T]) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

/// Prints data as CSV.
fn print_csv<T: Serialize>(data: &[T]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    for item in data {
        wtr.serialize(item)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Prints minimal output (first value only).
fn print_minimal<T: Serialize>(data: &[T]) -> anyhow::Result<()> {
    if let Some(first) = data.first() {
        println!("{}", serde_json::to_string(first)?);
    }
    Ok(())
}

/// Formats a rate as percentage points.
pub fn format_rate(rate: Rate) -> String {
    format!("{:.2}%", rate.as_percent())
}

/// Formats an optional rate, `n/a` when undefined.
pub fn format_optional_rate(rate: Option<Rate>) -> String {
    rate.map_or_else(|| "n/a".to_string(), format_rate)
}

/// Formats a currency amount with two decimals.
pub fn format_amount(value: f64) -> String {
    format!("{:.2}", value)
}

/// Formats an optional amount, `n/a` when undefined.
pub fn format_optional_amount(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), format_amount)
}

/// Prints a success message.
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Prints a warning message.
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message);
}

/// A key-value pair for display.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct KeyValue {
    #[tabled(rename = "Metric")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

impl KeyValue {
    /// Creates a new key-value pair.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Creates a key-value pair formatted as percentage.
    pub fn from_rate(key: impl Into<String>, rate: Rate) -> Self {
        Self::new(key, format_rate(rate))
    }

    /// Creates a key-value pair from an amount.
    pub fn from_amount(key: impl Into<String>, value: f64) -> Self {
        Self::new(key, format_amount(value))
    }

    /// Creates a key-value pair from a plain number with the given precision.
    pub fn from_number(key: impl Into<String>, value: f64, precision: usize) -> Self {
        Self::new(key, format!("{:.prec$}", value, prec = precision))
    }

    /// An empty row separating sections of a table.
    pub fn separator() -> Self {
        Self::new("", "")
    }
}

/// Prints a header for a section.
pub fn print_header(title: &str) {
    println!("\n{}", title.bold().underline());
}
