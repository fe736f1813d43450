//! Output formatting helpers shared by the subcommands.

use colored::Colorize;
use serde::Serialize;

use crate::OutputFormat;

/// Print a serializable result in the selected format.
///
/// Text-format callers render their own summaries, so this only emits
/// anything when JSON output was requested.
pub fn print<T: Serialize>(value: &T, format: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }

    if let OutputFormat::Json = format {
        match serde_json::to_string_pretty(value) {
            Ok(rendered) => println!("{rendered}"),
            Err(e) => eprintln!("{}: failed to serialize output: {e}", "Error".red().bold()),
        }
    }
}

/// Print a success headline in text mode.
pub fn success(message: &str, format: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }

    if let OutputFormat::Text = format {
        println!("{} {}", "✓".green().bold(), message);
    }
}

/// Print a progress line in text mode.
pub fn info(message: &str, format: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }

    if let OutputFormat::Text = format {
        println!("{} {}", "ℹ".blue(), message);
    }
}
