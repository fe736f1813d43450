//! caustic info command - display field statistics from a CSV export.

use std::path::Path;

use anyhow::{Context, Result};
use caustic_core::{parse_scalar_field, parse_vector_field};
use colored::Colorize;
use serde::Serialize;

use crate::{Cli, OutputFormat, output};

#[derive(Serialize)]
struct FieldInfo {
    path: String,
    kind: &'static str,
    width: usize,
    height: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    sum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_norm: Option<f64>,
}

pub fn run(input: &Path, cli: &Cli) -> Result<()> {
    let text =
        std::fs::read_to_string(input).with_context(|| format!("Failed to read {:?}", input))?;

    // Vector records are the stricter form (four values per line, the first
    // two being lattice coordinates), so try that reading first.
    let info = if let Ok(field) = parse_vector_field(&text) {
        let max_norm = field.iter().map(|v| v.norm()).fold(0.0, f64::max);
        FieldInfo {
            path: input.display().to_string(),
            kind: "vector",
            width: field.width(),
            height: field.height(),
            sum: None,
            max: None,
            max_norm: Some(max_norm),
        }
    } else {
        let field = parse_scalar_field(&text)
            .with_context(|| format!("{:?} is neither a scalar nor a vector field CSV", input))?;
        FieldInfo {
            path: input.display().to_string(),
            kind: "scalar",
            width: field.width(),
            height: field.height(),
            sum: Some(field.sum()),
            max: Some(field.max()?),
            max_norm: None,
        }
    };

    match cli.format {
        OutputFormat::Json => {
            output::print(&info, cli.format, cli.quiet);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                println!("{}", "Field Information".bold().underline());
                println!("  {}: {}", "File".cyan(), input.display());
                println!("  {}: {}", "Kind".cyan(), info.kind);
                println!("  {}: {}x{}", "Shape".cyan(), info.width, info.height);

                if let Some(sum) = info.sum {
                    println!("  {}: {:.6}", "Sum".cyan(), sum);
                }
                if let Some(max) = info.max {
                    println!("  {}: {:.6}", "Max".cyan(), max);
                }
                if let Some(max_norm) = info.max_norm {
                    println!("  {}: {:.6}", "Max norm".cyan(), max_norm);
                }
            }
        }
    }

    Ok(())
}
