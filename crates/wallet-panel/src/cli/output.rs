//! Output formatting for human-readable and JSON modes.

use colored::Colorize;
use serde::Serialize;

/// Prefix every failed panel action writes into its field.
const ERROR_PREFIX: &str = "Error in ";

/// Prints one panel field. Failed actions go to stderr.
pub fn print_field(name: &str, value: &str, json_mode: bool) {
    let failed = value.starts_with(ERROR_PREFIX);
    if json_mode {
        let obj = serde_json::json!({ "field": name, "value": value, "ok": !failed });
        println!("{obj}");
    } else if failed {
        eprintln!("{} {}", "error:".red().bold(), value);
    } else if value.contains('\n') {
        println!("{}:", name.bold());
        for line in value.lines() {
            println!("  {line}");
        }
    } else {
        println!("{}: {}", name.bold(), value);
    }
}

/// Prints a serializable value as JSON or pretty JSON.
pub fn print_value<T: Serialize>(value: &T, json_mode: bool) {
    let text = if json_mode {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    };
    match text {
        Ok(s) => println!("{s}"),
        Err(e) => print_error(&format!("json serialization failed: {e}"), json_mode),
    }
}

/// Prints an error message.
pub fn print_error(msg: &str, json_mode: bool) {
    if json_mode {
        let obj = serde_json::json!({ "error": msg });
        eprintln!("{obj}");
    } else {
        eprintln!("{} {}", "error:".red().bold(), msg);
    }
}
