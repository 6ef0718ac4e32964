//! Table and JSON rendering for console command output.
//!
//! List commands render their rows as a table; single records (the
//! invoice letterhead, a session) render as a two-column field/value
//! table derived from the record's serialized shape. `--format json`
//! bypasses both and prints the raw serialization.

use serde::Serialize;
use serde_json::Value;
use tabled::builder::Builder;
use tabled::{Table, Tabled};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Table
    }
}

/// Print a list of rows in the selected format.
pub fn print_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No results found.");
            } else {
                println!("{}", Table::new(items));
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(items).unwrap_or_else(|_| "[]".to_string());
            println!("{}", json);
        }
    }
}

/// Print a single record as a field/value table (or raw JSON).
pub fn print_item<T: Serialize>(item: &T, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            let value = serde_json::to_value(item).unwrap_or(Value::Null);
            let mut builder = Builder::default();
            builder.push_record(["field", "value"]);
            for (field, value) in item_rows(&value) {
                builder.push_record([field, value]);
            }
            println!("{}", builder.build());
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(item).unwrap_or_else(|_| "{}".to_string());
            println!("{}", json);
        }
    }
}

/// Flatten a serialized record into field/value rows. Non-object values
/// become a single `value` row so every shape still renders.
fn item_rows(value: &Value) -> Vec<(String, String)> {
    match value {
        Value::Object(fields) => fields
            .iter()
            .map(|(field, value)| (field.clone(), value_cell(value)))
            .collect(),
        other => vec![("value".to_string(), value_cell(other))],
    }
}

/// Render a leaf value for a table cell, without JSON string quoting.
fn value_cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {}", msg);
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("⚠ {}", msg);
}
