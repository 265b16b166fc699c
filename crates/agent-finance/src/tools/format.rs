//! Argument parsing and text rendering shared by the tool adapters

use agent_tools::ToolError;
use comfy_table::{Table, presets};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::LazyLock;

static SYMBOL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9.\-^=]{1,12}$").expect("static regex"));

/// Deserialize tool arguments, reporting failures as invalid arguments
pub fn parse_params<T: DeserializeOwned>(params: Value) -> Result<T, ToolError> {
    // Some backends send `null` for tools whose arguments are all optional
    let params = if params.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        params
    };
    serde_json::from_value(params).map_err(|e| ToolError::invalid_arguments(e.to_string()))
}

/// Upper-case and validate a ticker symbol (`aapl`, `$nvda`, `brk.b`, `^gspc`)
pub fn normalize_symbol(raw: &str) -> Result<String, ToolError> {
    let symbol = raw.trim().trim_start_matches('$').to_ascii_uppercase();
    if SYMBOL.is_match(&symbol) {
        Ok(symbol)
    } else {
        Err(ToolError::invalid_arguments(format!(
            "'{raw}' is not a valid ticker symbol"
        )))
    }
}

/// Markdown table with the given header
pub fn markdown_table<I, R>(header: &[&str], rows: I) -> String
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = String>,
{
    let mut table = Table::new();
    table.load_preset(presets::ASCII_MARKDOWN).set_header(header.to_vec());
    for row in rows {
        table.add_row(row.into_iter().collect::<Vec<_>>());
    }
    table.to_string()
}

/// Format market cap in human-readable form
pub fn format_market_cap(cap: f64) -> String {
    if cap >= 1_000_000_000_000.0 {
        format!("${:.2}T", cap / 1_000_000_000_000.0)
    } else if cap >= 1_000_000_000.0 {
        format!("${:.2}B", cap / 1_000_000_000.0)
    } else if cap >= 1_000_000.0 {
        format!("${:.2}M", cap / 1_000_000.0)
    } else {
        format!("${cap:.2}")
    }
}

/// Interpret P/E ratio
pub fn interpret_pe(pe: f64) -> &'static str {
    if pe < 0.0 {
        "negative, company is not profitable"
    } else if pe < 15.0 {
        "low"
    } else if pe < 25.0 {
        "moderate"
    } else if pe < 50.0 {
        "high"
    } else {
        "very high"
    }
}

/// Integer with thousands separators
pub fn format_count(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Two-decimal number or `N/A`
pub fn or_na(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v:.2}"))
}
