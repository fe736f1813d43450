//! Vector field arithmetic.

use nalgebra::Vector2;

use crate::field::Field;
use crate::geometry::is_zero;

/// A rectangular grid of 2D vectors.
///
/// Used for gradient and velocity fields as well as lens vertex positions.
pub type VectorField = Field<Vector2<f64>>;

impl Field<Vector2<f64>> {
    /// Builds a field of zero vectors.
    pub fn zeros(width: usize, height: usize) -> Self {
        Field::filled(width, height, Vector2::zeros())
    }

    /// Negates every vector of the field.
    pub fn negated(&self) -> VectorField {
        self.mapped(|v| -v)
    }
}

/// Rescales `v` to the given length, keeping its direction.
///
/// The zero vector has no direction, so it yields `None`.
pub fn scaled_to_length(v: Vector2<f64>, length: f64) -> Option<Vector2<f64>> {
    let norm = v.norm();
    if is_zero(norm) {
        return None;
    }
    Some(v * (length / norm))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zeros() {
        let field = VectorField::zeros(3, 2);
        assert_eq!(field.shape(), [3, 2]);
        assert!(field.iter().all(|v| v.norm() == 0.0));
    }

    #[test]
    fn test_negated_flips_every_component() {
        let field = VectorField::from_fn(2, 2, |x, y| Vector2::new(x as f64, -(y as f64)));
        let negated = field.negated();
        assert_relative_eq!(negated.get(1, 0).x, -1.0, epsilon = 1e-10);
        assert_relative_eq!(negated.get(0, 1).y, 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_scaled_to_length_preserves_direction() {
        let scaled = scaled_to_length(Vector2::new(3.0, 4.0), 10.0).unwrap();
        assert_relative_eq!(scaled.x, 6.0, epsilon = 1e-10);
        assert_relative_eq!(scaled.y, 8.0, epsilon = 1e-10);
        assert_relative_eq!(scaled.norm(), 10.0, epsilon = 1e-10);
    }

    #[test]
    fn test_scaled_to_length_of_zero_vector_is_none() {
        assert!(scaled_to_length(Vector2::zeros(), 5.0).is_none());
    }
}
