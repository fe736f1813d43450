//! Scalar field arithmetic.

use crate::error::{CausticError, CausticResult};
use crate::field::Field;

/// A rectangular grid of real values.
///
/// Used for brightness images, loss fields and solved potentials.
pub type ScalarField = Field<f64>;

impl Field<f64> {
    /// Builds a zero-filled scalar field.
    pub fn zeros(width: usize, height: usize) -> Self {
        Field::filled(width, height, 0.0)
    }

    /// Sum of all elements. Zero for an empty field.
    pub fn sum(&self) -> f64 {
        self.iter().sum()
    }

    /// Largest element of the field.
    ///
    /// Fails with an empty field error when the field has no elements. The
    /// construction paths in this crate never produce one, but fields
    /// deserialized or assembled elsewhere can be empty.
    pub fn max(&self) -> CausticResult<f64> {
        if self.is_empty() {
            return Err(CausticError::empty_field("maximum"));
        }
        Ok(self.iter().copied().fold(f64::NEG_INFINITY, f64::max))
    }

    /// Element-wise sum of two fields of identical shape.
    pub fn plus(&self, other: &ScalarField) -> CausticResult<ScalarField> {
        self.zipped_with(other, |a, b| a + b)
    }

    /// Element-wise difference `self - other` of two fields of identical
    /// shape.
    pub fn minus(&self, other: &ScalarField) -> CausticResult<ScalarField> {
        self.zipped_with(other, |a, b| a - b)
    }

    /// Scales every element by `factor`.
    pub fn times(&self, factor: f64) -> ScalarField {
        self.mapped(|v| v * factor)
    }

    /// Divides every element by `divisor`.
    ///
    /// Division is implemented as multiplication by the reciprocal, so a
    /// zero divisor produces infinities rather than failing.
    pub fn divided_by(&self, divisor: f64) -> ScalarField {
        self.times(1.0 / divisor)
    }
}
