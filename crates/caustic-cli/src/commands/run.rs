//! caustic run command - optimize a lens against a target image.
//!
//! Each iteration walks the full refinement chain: compare cell areas
//! against the target brightness, relax the loss into a potential,
//! differentiate it into a velocity field and march the lens vertices.
//! Every stage is exported as a CSV file so a run can be inspected or
//! resumed offline.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use caustic_core::{
    BoundaryCondition, Lens, PoissonParams, RelaxationMethod, gradient, poisson, save_csv,
};
use colored::Colorize;
use serde::Serialize;

use crate::brightness::{self, CropRect};
use crate::{Cli, OutputFormat, SolverBoundary, SolverMethod, output};

#[derive(Serialize)]
struct RunSummary {
    image: String,
    output_dir: String,
    cells: [usize; 2],
    iterations: Vec<IterationReport>,
    total_seconds: f64,
}

#[derive(Serialize)]
struct IterationReport {
    iteration: usize,
    sweeps: usize,
    converged: bool,
    limit_time: f64,
    max_displacement: f64,
    seconds: f64,
}

#[allow(clippy::too_many_arguments)]
pub fn run(
    image: &Path,
    output_dir: &Path,
    iterations: usize,
    scale: f64,
    crop: Option<CropRect>,
    extent: f64,
    omega: f64,
    tolerance: f64,
    max_sweeps: usize,
    method: SolverMethod,
    boundary: SolverBoundary,
    cli: &Cli,
) -> Result<()> {
    if !(0.0..=1.0).contains(&extent) {
        return Err(anyhow::anyhow!(
            "--extent must lie within [0, 1], got {extent}"
        ));
    }

    let start = Instant::now();

    let target = brightness::load_brightness(image, scale, crop)?;
    let [cells_wide, cells_high] = target.shape();

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output directory {:?}", output_dir))?;

    let mut lens = Lens::new(cells_wide, cells_high);
    let params = solver_params(method, boundary, omega, tolerance, max_sweeps);

    output::info(
        &format!("Optimizing a {cells_wide}x{cells_high} cell lens over {iterations} iteration(s)"),
        cli.format,
        cli.quiet,
    );

    let mut reports = Vec::with_capacity(iterations);
    for iteration in 0..iterations {
        let iteration_start = Instant::now();

        let loss = lens.loss(&target)?;
        save_csv(&loss, &stage_path(output_dir, "loss", iteration))?;

        let solution = poisson::solve(&loss, &params);
        save_csv(&solution.phi, &stage_path(output_dir, "phi", iteration))?;

        let velocity = gradient(&solution.phi)?;
        save_csv(&velocity, &stage_path(output_dir, "velocity", iteration))?;

        let march = lens.march_with_extent(&velocity, extent)?;
        save_csv(&lens, &stage_path(output_dir, "lens", iteration))?;

        reports.push(IterationReport {
            iteration,
            sweeps: solution.sweeps,
            converged: solution.converged,
            limit_time: march.limit_time,
            max_displacement: march.max_displacement,
            seconds: iteration_start.elapsed().as_secs_f64(),
        });
    }

    let result = RunSummary {
        image: image.display().to_string(),
        output_dir: output_dir.display().to_string(),
        cells: [cells_wide, cells_high],
        iterations: reports,
        total_seconds: start.elapsed().as_secs_f64(),
    };

    match cli.format {
        OutputFormat::Json => {
            output::print(&result, cli.format, cli.quiet);
        }
        OutputFormat::Text => {
            if !cli.quiet {
                output::success(
                    &format!(
                        "Wrote {} refinement stage(s) to {}",
                        result.iterations.len(),
                        output_dir.display()
                    ),
                    cli.format,
                    cli.quiet,
                );
                for report in &result.iterations {
                    let convergence = if report.converged {
                        format!("{} sweeps", report.sweeps)
                    } else {
                        format!("{} sweeps (not converged)", report.sweeps)
                    };
                    println!(
                        "  {} {}: {}, moved up to {:.6} (collapse limit {:.6}) in {:.2}s",
                        "Iteration".cyan(),
                        report.iteration,
                        convergence,
                        report.max_displacement,
                        report.limit_time,
                        report.seconds
                    );
                }
                println!("  {}: {:.2}s", "Total".cyan(), result.total_seconds);
            }
        }
    }

    Ok(())
}

fn solver_params(
    method: SolverMethod,
    boundary: SolverBoundary,
    omega: f64,
    tolerance: f64,
    max_sweeps: usize,
) -> PoissonParams {
    let method = match method {
        SolverMethod::GaussSeidel => RelaxationMethod::GaussSeidel,
        SolverMethod::Jacobi => RelaxationMethod::Jacobi,
    };
    let boundary = match boundary {
        SolverBoundary::Neumann => BoundaryCondition::Neumann,
        SolverBoundary::Dirichlet => BoundaryCondition::Dirichlet,
    };

    PoissonParams::over_relaxed(omega)
        .with_method(method)
        .with_boundary(boundary)
        .with_tolerance(tolerance)
        .with_max_sweeps(max_sweeps)
}

fn stage_path(dir: &Path, stage: &str, iteration: usize) -> PathBuf {
    dir.join(format!("{stage}{iteration}.csv"))
}
