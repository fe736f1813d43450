//! caustic-cli: Command-line interface for inverse caustic lens design.
//!
//! This tool drives caustic-core's refinement loop from the command line,
//! suitable for scripting and batch runs.
//!
//! # Logging
//!
//! Set the `RUST_LOG` environment variable to control log output:
//! - `RUST_LOG=caustic_core=info` - Basic operation logging
//! - `RUST_LOG=caustic_core=debug` - Per-sweep relaxation progress
//! - `RUST_LOG=debug` - All debug output
//!
//! # Example
//!
//! ```bash
//! # Optimize a lens with info logging
//! RUST_LOG=caustic_core=info caustic run target.png -o stages/
//!
//! # Debug output for troubleshooting
//! RUST_LOG=debug caustic info stages/loss0.csv
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use miette::Diagnostic;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod brightness;
mod commands;
mod output;

use brightness::CropRect;
use commands::{info, render, run};

/// caustic - A command-line tool for inverse caustic lens design.
///
/// Deform a lens mesh until its cell areas reproduce the brightness
/// distribution of a target image.
#[derive(Parser)]
#[command(name = "caustic")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format for results
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Suppress all non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Increase output verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for scripting
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Optimize a lens against a target brightness image
    Run {
        /// Target image file
        image: PathBuf,

        /// Directory for per-iteration CSV exports
        #[arg(short, long)]
        output: PathBuf,

        /// Number of refinement iterations
        #[arg(long, default_value = "5")]
        iterations: usize,

        /// Uniform scale factor applied to the image before cropping
        #[arg(long, default_value = "0.25")]
        scale: f64,

        /// Crop rectangle applied after scaling
        #[arg(long, value_name = "LEFT,TOP,WIDTH,HEIGHT", value_parser = brightness::parse_crop)]
        crop: Option<CropRect>,

        /// Fraction of the first cell-collapse time each march travels
        #[arg(long, default_value = "0.5")]
        extent: f64,

        /// Over-relaxation factor for the Poisson sweeps
        #[arg(long, default_value = "1.125")]
        omega: f64,

        /// Convergence threshold on the largest per-element update
        #[arg(long, default_value = "1e-10")]
        tolerance: f64,

        /// Hard cap on relaxation sweeps per iteration
        #[arg(long, default_value = "150000")]
        max_sweeps: usize,

        /// Relaxation sweep scheme
        #[arg(long, default_value = "gauss-seidel")]
        method: SolverMethod,

        /// Boundary condition for the Poisson solve
        #[arg(long, default_value = "neumann")]
        boundary: SolverBoundary,
    },

    /// Render a scalar field CSV as a grayscale image
    Render {
        /// Input field CSV
        input: PathBuf,

        /// Output image path (format determined by extension)
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Display field statistics from a CSV export
    Info {
        /// Input field CSV
        input: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SolverMethod {
    /// Sweep in place, reusing values updated earlier in the same pass
    GaussSeidel,
    /// Update every element from the previous pass only
    Jacobi,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SolverBoundary {
    /// Mirror edge neighbors so boundary flux vanishes
    Neumann,
    /// Pin the boundary at zero
    Dirichlet,
}

/// Initialize the tracing subscriber based on verbosity level.
fn init_tracing(verbose: u8, quiet: bool) {
    // If quiet, don't initialize any tracing
    if quiet {
        return;
    }

    // Determine log level based on verbosity flag
    // Check RUST_LOG first, then fall back to -v flags
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "warn",
            1 => "caustic_core=info,caustic_cli=info",
            2 => "caustic_core=debug,caustic_cli=debug",
            _ => "trace",
        };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // Initialize the subscriber
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    // Install miette's panic hook for better error display
    // This makes panics show nicer error reports in development
    #[cfg(debug_assertions)]
    miette::set_panic_hook();

    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Run {
            image,
            output,
            iterations,
            scale,
            crop,
            extent,
            omega,
            tolerance,
            max_sweeps,
            method,
            boundary,
        } => run::run(
            image,
            output,
            *iterations,
            *scale,
            *crop,
            *extent,
            *omega,
            *tolerance,
            *max_sweeps,
            *method,
            *boundary,
            &cli,
        ),
        Commands::Render { input, output } => render::run(input, output, &cli),
        Commands::Info { input } => info::run(input, &cli),
    };

    if let Err(e) = &result {
        if !cli.quiet {
            // Check if the error is a miette Diagnostic for enhanced display
            if let Some(caustic_err) = e.downcast_ref::<caustic_core::CausticError>() {
                // Display error with code and help text
                eprintln!("{}: {}", "Error".red().bold(), caustic_err);
                eprintln!("  {}: {}", "Code".cyan(), caustic_err.code());
                if let Some(help) = caustic_err.help() {
                    eprintln!("  {}: {}", "Suggestion".green(), help);
                }
            } else {
                // Fall back to standard error display
                eprintln!("{}: {}", "Error".red().bold(), e);
                for cause in e.chain().skip(1) {
                    eprintln!("  {}: {}", "Caused by".yellow(), cause);
                }
            }
        }
        std::process::exit(1);
    }

    Ok(())
}
