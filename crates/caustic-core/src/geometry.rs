//! Planar geometry helpers: polygon areas, triangle collapse times and a
//! small linear system solver.

use nalgebra::Vector2;

/// Tolerance below which a real value counts as zero.
///
/// Shared by the degeneracy solver, the relaxation convergence check and
/// root validity tests so the whole pipeline agrees on what "zero" means.
pub const EPSILON: f64 = 1e-10;

/// Whether `value` is zero within [`EPSILON`].
#[inline]
pub fn is_zero(value: f64) -> bool {
    value.abs() < EPSILON
}

/// Area of a simple polygon given its vertices in order, via the shoelace
/// formula. Orientation does not matter; fewer than three vertices give
/// zero area.
pub fn polygon_area(vertices: &[Vector2<f64>]) -> f64 {
    if vertices.len() < 3 {
        return 0.0;
    }
    let mut area = 0.0;
    for i in 0..vertices.len() {
        let j = (i + 1) % vertices.len();
        area += vertices[i].x * vertices[j].y;
        area -= vertices[j].x * vertices[i].y;
    }
    (area / 2.0).abs()
}

/// The strictly positive times at which a linearly moving triangle becomes
/// degenerate.
///
/// Times within [`EPSILON`] of zero are excluded: a triangle that is already
/// degenerate does not constrain a forward march.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CollapseTimes {
    /// The triangle never collapses at a positive time.
    NoPositive,
    /// Exactly one positive collapse time.
    One(f64),
    /// Two positive collapse times, smaller first. A grazing collapse
    /// reports its double root here twice.
    Two { smaller: f64, larger: f64 },
}

impl CollapseTimes {
    /// The earliest strictly positive collapse time, if any.
    pub fn smallest_positive(self) -> Option<f64> {
        match self {
            CollapseTimes::NoPositive => None,
            CollapseTimes::One(t) => Some(t),
            CollapseTimes::Two { smaller, .. } => Some(smaller),
        }
    }
}

/// Computes when the triangle with corners `points[i]` moving at constant
/// `velocities[i]` collapses to zero area.
///
/// With corner 0 as the origin and `p1, p2, v1, v2` the relative positions
/// and velocities, the signed area at time `t` is proportional to the cross
/// product of the moving edges, a quadratic `a*t^2 + b*t + c` with
///
/// ```text
/// a = v1 x v2
/// b = p1 x v2 + v1 x p2
/// c = p1 x p2
/// ```
///
/// whose real roots are the collapse times.
pub fn triangle_collapse_times(
    points: [Vector2<f64>; 3],
    velocities: [Vector2<f64>; 3],
) -> CollapseTimes {
    let p1 = points[1] - points[0];
    let p2 = points[2] - points[0];
    let v1 = velocities[1] - velocities[0];
    let v2 = velocities[2] - velocities[0];

    let a = cross(v1, v2);
    let b = cross(p1, v2) + cross(v1, p2);
    let c = cross(p1, p2);

    if is_zero(a) {
        // Degenerate quadratic. Without a linear term the area never
        // changes and the triangle cannot newly collapse.
        if is_zero(b) {
            return CollapseTimes::NoPositive;
        }
        return one_or_none(-c / b);
    }

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return CollapseTimes::NoPositive;
    }
    let sqrt_discriminant = discriminant.sqrt();
    let first = (-b + sqrt_discriminant) / (2.0 * a);
    let second = (-b - sqrt_discriminant) / (2.0 * a);
    let (smaller, larger) = if first <= second {
        (first, second)
    } else {
        (second, first)
    };

    match (is_valid_time(smaller), is_valid_time(larger)) {
        (true, true) => CollapseTimes::Two { smaller, larger },
        (false, true) => CollapseTimes::One(larger),
        (true, false) => CollapseTimes::One(smaller),
        (false, false) => CollapseTimes::NoPositive,
    }
}

#[inline]
fn cross(a: Vector2<f64>, b: Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

#[inline]
fn is_valid_time(t: f64) -> bool {
    t >= EPSILON
}

fn one_or_none(t: f64) -> CollapseTimes {
    if is_valid_time(t) {
        CollapseTimes::One(t)
    } else {
        CollapseTimes::NoPositive
    }
}

/// Outcome of a 2x2 linear system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Linear2x2Solution {
    /// The system has exactly one solution.
    Unique(Vector2<f64>),
    /// The equations contradict each other.
    NoSolution,
    /// The equations are linearly dependent.
    InfinitelyMany,
}

/// Solves the system
///
/// ```text
/// x_coefficients.x * x + y_coefficients.x * y = constants.x
/// x_coefficients.y * x + y_coefficients.y * y = constants.y
/// ```
///
/// by Cramer's rule, classifying singular systems by their determinants.
pub fn solve_linear_2x2(
    x_coefficients: Vector2<f64>,
    y_coefficients: Vector2<f64>,
    constants: Vector2<f64>,
) -> Linear2x2Solution {
    let delta = cross(x_coefficients, y_coefficients);
    let delta_x = cross(constants, y_coefficients);
    let delta_y = cross(x_coefficients, constants);

    if is_zero(delta) {
        if is_zero(delta_x) && is_zero(delta_y) {
            return Linear2x2Solution::InfinitelyMany;
        }
        return Linear2x2Solution::NoSolution;
    }
    Linear2x2Solution::Unique(Vector2::new(delta_x / delta, delta_y / delta))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_polygon_area_unit_square() {
        let square = [
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(1.0, 1.0),
            Vector2::new(0.0, 1.0),
        ];
        assert_relative_eq!(polygon_area(&square), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_polygon_area_ignores_orientation() {
        let clockwise = [
            Vector2::new(2.0, 1.0),
            Vector2::new(2.0, 4.0),
            Vector2::new(5.0, 4.0),
            Vector2::new(5.0, 1.0),
        ];
        let counterclockwise: Vec<_> = clockwise.iter().rev().copied().collect();
        assert_relative_eq!(polygon_area(&clockwise), 9.0, epsilon = 1e-10);
        assert_relative_eq!(polygon_area(&counterclockwise), 9.0, epsilon = 1e-10);
    }

    #[test]
    fn test_polygon_area_triangle() {
        let triangle = [
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(0.0, 1.0),
        ];
        assert_relative_eq!(polygon_area(&triangle), 0.5, epsilon = 1e-10);
    }

    #[test]
    fn test_polygon_area_degenerate_cases() {
        let collinear = [
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 1.0),
            Vector2::new(2.0, 2.0),
        ];
        assert_relative_eq!(polygon_area(&collinear), 0.0, epsilon = 1e-10);

        let segment = [Vector2::new(0.0, 0.0), Vector2::new(3.0, 0.0)];
        assert_eq!(polygon_area(&segment), 0.0);
        assert_eq!(polygon_area(&[]), 0.0);
    }

    #[test]
    fn test_collapse_at_known_double_root() {
        // Two corners shrink linearly onto the third; the area scales with
        // (1 - t)^2 and vanishes exactly at t = 1.
        let points = [
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(0.0, 1.0),
        ];
        let velocities = [
            Vector2::zeros(),
            Vector2::new(-1.0, 0.0),
            Vector2::new(0.0, -1.0),
        ];
        let times = triangle_collapse_times(points, velocities);
        match times {
            CollapseTimes::Two { smaller, larger } => {
                assert_relative_eq!(smaller, 1.0, epsilon = 1e-10);
                assert_relative_eq!(larger, 1.0, epsilon = 1e-10);
            }
            other => panic!("expected a double root, got {other:?}"),
        }
        assert_relative_eq!(times.smallest_positive().unwrap(), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_collapse_with_two_distinct_roots() {
        // Constructed so the area quadratic is t^2 - 4t + 3 = (t-1)(t-3).
        let points = [
            Vector2::new(0.0, 0.0),
            Vector2::new(3.0, 0.0),
            Vector2::new(0.0, 1.0),
        ];
        let velocities = [
            Vector2::zeros(),
            Vector2::new(-1.0, 0.0),
            Vector2::new(0.0, -1.0),
        ];
        match triangle_collapse_times(points, velocities) {
            CollapseTimes::Two { smaller, larger } => {
                assert_relative_eq!(smaller, 1.0, epsilon = 1e-10);
                assert_relative_eq!(larger, 3.0, epsilon = 1e-10);
            }
            other => panic!("expected two roots, got {other:?}"),
        }
    }

    #[test]
    fn test_collapse_linear_branch() {
        // Parallel velocities make the quadratic term vanish.
        let points = [
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(0.0, 1.0),
        ];
        let velocities = [
            Vector2::zeros(),
            Vector2::zeros(),
            Vector2::new(0.0, -1.0),
        ];
        assert_eq!(
            triangle_collapse_times(points, velocities),
            CollapseTimes::One(1.0)
        );
    }

    #[test]
    fn test_stationary_triangle_never_collapses() {
        let points = [
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(0.0, 1.0),
        ];
        let velocities = [Vector2::zeros(), Vector2::zeros(), Vector2::zeros()];
        assert_eq!(
            triangle_collapse_times(points, velocities),
            CollapseTimes::NoPositive
        );
    }

    #[test]
    fn test_expanding_triangle_has_only_past_collapses() {
        // Both roots are negative; the triangle only grew out of a past
        // degeneracy.
        let points = [
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(0.0, 1.0),
        ];
        let velocities = [
            Vector2::zeros(),
            Vector2::new(1.0, 0.0),
            Vector2::new(0.0, 1.0),
        ];
        assert_eq!(
            triangle_collapse_times(points, velocities),
            CollapseTimes::NoPositive
        );
    }

    #[test]
    fn test_rotating_triangle_never_collapses() {
        // A rigid rotation velocity field only grows the area; the
        // discriminant is negative.
        let points = [
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(0.0, 1.0),
        ];
        let velocities = [
            Vector2::zeros(),
            Vector2::new(0.0, 1.0),
            Vector2::new(-1.0, 0.0),
        ];
        assert_eq!(
            triangle_collapse_times(points, velocities),
            CollapseTimes::NoPositive
        );
    }

    #[test]
    fn test_already_degenerate_triangle_is_unconstrained() {
        // Collinear corners give c = 0; the root at t = 0 must be rejected.
        let points = [
            Vector2::new(0.0, 0.0),
            Vector2::new(1.0, 0.0),
            Vector2::new(2.0, 0.0),
        ];
        let velocities = [
            Vector2::zeros(),
            Vector2::new(0.0, 1.0),
            Vector2::zeros(),
        ];
        assert_eq!(
            triangle_collapse_times(points, velocities),
            CollapseTimes::NoPositive
        );
    }

    #[test]
    fn test_linear_system_unique_solution() {
        // x + y = 3, x - y = 1.
        let solution = solve_linear_2x2(
            Vector2::new(1.0, 1.0),
            Vector2::new(1.0, -1.0),
            Vector2::new(3.0, 1.0),
        );
        match solution {
            Linear2x2Solution::Unique(v) => {
                assert_relative_eq!(v.x, 2.0, epsilon = 1e-10);
                assert_relative_eq!(v.y, 1.0, epsilon = 1e-10);
            }
            other => panic!("expected a unique solution, got {other:?}"),
        }
    }

    #[test]
    fn test_linear_system_inconsistent() {
        // x + y = 1 and x + y = 2 contradict each other.
        let solution = solve_linear_2x2(
            Vector2::new(1.0, 1.0),
            Vector2::new(1.0, 1.0),
            Vector2::new(1.0, 2.0),
        );
        assert_eq!(solution, Linear2x2Solution::NoSolution);
    }

    #[test]
    fn test_linear_system_underdetermined() {
        // The same equation twice.
        let solution = solve_linear_2x2(
            Vector2::new(1.0, 1.0),
            Vector2::new(1.0, 1.0),
            Vector2::new(1.0, 1.0),
        );
        assert_eq!(solution, Linear2x2Solution::InfinitelyMany);
    }
}
