//! Finite-difference gradient of a scalar field.

use nalgebra::Vector2;

use crate::error::{CausticError, CausticResult};
use crate::scalar::ScalarField;
use crate::vector::VectorField;

/// Minimum number of cells per axis for the three-point stencils.
const MIN_STENCIL_SIDE: usize = 3;

/// Differentiates `field`, producing one gradient vector per element.
///
/// Interior elements use central differences; boundary elements use the
/// matching one-sided three-point stencil. All stencils are second-order
/// accurate, so gradients of linear and quadratic fields are exact.
///
/// Fails when either side of the field is shorter than three elements,
/// because no three-point stencil fits.
pub fn gradient(field: &ScalarField) -> CausticResult<VectorField> {
    if field.width() < MIN_STENCIL_SIDE || field.height() < MIN_STENCIL_SIDE {
        return Err(CausticError::field_too_small(
            field.width(),
            field.height(),
            MIN_STENCIL_SIDE,
        ));
    }
    Ok(VectorField::from_fn(
        field.width(),
        field.height(),
        |x, y| Vector2::new(partial_x(field, x, y), partial_y(field, x, y)),
    ))
}

fn partial_x(field: &ScalarField, x: usize, y: usize) -> f64 {
    if x == 0 {
        (-3.0 * field.get(0, y) + 4.0 * field.get(1, y) - field.get(2, y)) / 2.0
    } else if x == field.width() - 1 {
        (3.0 * field.get(x, y) - 4.0 * field.get(x - 1, y) + field.get(x - 2, y)) / 2.0
    } else {
        (field.get(x + 1, y) - field.get(x - 1, y)) / 2.0
    }
}

fn partial_y(field: &ScalarField, x: usize, y: usize) -> f64 {
    if y == 0 {
        (-3.0 * field.get(x, 0) + 4.0 * field.get(x, 1) - field.get(x, 2)) / 2.0
    } else if y == field.height() - 1 {
        (3.0 * field.get(x, y) - 4.0 * field.get(x, y - 1) + field.get(x, y - 2)) / 2.0
    } else {
        (field.get(x, y + 1) - field.get(x, y - 1)) / 2.0
    }
}
