//! Inverse caustic design on deformable quad meshes.
//!
//! This crate computes lens meshes that focus light into a target image.
//! The mesh starts as a regular grid and is deformed step by step,
//! redistributing cell areas until the light the cells redirect matches
//! the brightness distribution of the target.
//!
//! # Pipeline
//!
//! One refinement iteration chains four stages:
//!
//! 1. [`Lens::loss`] compares the brightness share each cell should
//!    collect against the area share it currently covers.
//! 2. [`poisson::solve`] relaxes a potential whose Laplacian matches the
//!    loss field.
//! 3. [`gradient`] differentiates the potential into a per-cell velocity
//!    field.
//! 4. [`Lens::march`] moves the mesh vertices against the velocity,
//!    stopping well before the first mesh triangle would collapse.
//!
//! Repeating the chain a handful of times is usually enough; the driver
//! binary defaults to five iterations.
//!
//! # Quick Start
//!
//! ```
//! use caustic_core::{
//!     gradient, poisson, BoundaryCondition, CsvExport, Lens, PoissonParams, ScalarField,
//! };
//!
//! // A 4x4-cell lens and a uniform brightness target.
//! let mut lens = Lens::new(4, 4);
//! let target = ScalarField::filled(4, 4, 1.0);
//!
//! let loss = lens.loss(&target).unwrap();
//! let params = PoissonParams::over_relaxed(1.125).with_boundary(BoundaryCondition::Dirichlet);
//! let solution = poisson::solve(&loss, &params);
//! assert!(solution.converged);
//!
//! let velocity = gradient(&solution.phi).unwrap();
//! let step = lens.march(&velocity).unwrap();
//! assert!(step.limit_time > 0.0);
//!
//! // Fields and lenses serialize to CSV for inspection and rendering.
//! let snapshot = lens.to_csv();
//! assert!(!snapshot.is_empty());
//! ```
//!
//! # Conventions
//!
//! Fields are rectangular grids addressed by `(x, y)` with `x` running
//! rightward along a row and `y` downward across rows, stored row-major.
//! A lens with `W x H` vertices has `(W-1) x (H-1)` cells; brightness,
//! loss, potential and velocity fields are all cell-sized. Fresh lenses
//! sit on the integer lattice with unit cell areas.
//!
//! # Error Handling
//!
//! Fallible operations return [`CausticResult`]. Every [`CausticError`]
//! carries a stable [`CausticErrorCode`] plus a diagnostic code and help
//! text, so callers can match programmatically or render a report.
//! Out-of-bounds element access is a programming error and panics instead
//! of returning an error.

pub mod csv;
pub mod error;
pub mod field;
pub mod geometry;
pub mod gradient;
pub mod lens;
pub mod poisson;
pub mod scalar;
pub mod vector;

pub use csv::{
    CsvExport, MAX_FIELD_ELEMENTS, load_scalar_csv, load_vector_csv, parse_scalar_field,
    parse_vector_field, save_csv,
};
pub use error::{CausticError, CausticErrorCode, CausticResult};
pub use field::Field;
pub use geometry::EPSILON;
pub use gradient::gradient;
pub use lens::{DEFAULT_MARCH_EXTENT, Lens, MarchResult};
pub use poisson::{BoundaryCondition, PoissonParams, PoissonSolution, RelaxationMethod};
pub use scalar::ScalarField;
pub use vector::VectorField;
