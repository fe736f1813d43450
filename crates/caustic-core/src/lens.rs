//! The deformable lens at the center of the pipeline.
//!
//! A [`Lens`] is a grid of vertex positions whose cells redirect light
//! onto the target image. March steps redistribute cell areas to chase
//! the target's brightness shares, moving every vertex against a velocity
//! field and stopping at a fixed fraction of the time at which the first
//! mesh triangle would collapse, so cells never fold over.

use nalgebra::Vector2;
use tracing::debug;

use crate::error::{CausticError, CausticResult};
use crate::geometry;
use crate::scalar::ScalarField;
use crate::vector::VectorField;

/// Fraction of the first collapse time a march step travels by default.
pub const DEFAULT_MARCH_EXTENT: f64 = 0.5;

/// A deformable quad mesh with one vertex per grid position.
#[derive(Debug, Clone)]
pub struct Lens {
    positions: VectorField,
}

/// Outcome of a march step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarchResult {
    /// Time at which the first triangle of the mesh would have collapsed.
    /// Zero when the velocity field was zero and nothing moved.
    pub limit_time: f64,
    /// Largest vertex displacement of the step.
    pub max_displacement: f64,
}

impl Lens {
    /// Builds an undeformed lens of `cells_wide` x `cells_high` unit cells.
    ///
    /// The vertex grid has one more position per axis than the cell grid,
    /// and every vertex starts on the integer lattice point matching its
    /// grid coordinates.
    pub fn new(cells_wide: usize, cells_high: usize) -> Self {
        let positions = VectorField::from_fn(cells_wide + 1, cells_high + 1, |x, y| {
            Vector2::new(x as f64, y as f64)
        });
        Lens { positions }
    }

    /// Builds a lens directly from a vertex position field.
    pub fn from_positions(positions: VectorField) -> Self {
        Lens { positions }
    }

    /// The vertex positions of the lens.
    pub fn positions(&self) -> &VectorField {
        &self.positions
    }

    /// Number of vertices along the x axis.
    pub fn width(&self) -> usize {
        self.positions.width()
    }

    /// Number of vertices along the y axis.
    pub fn height(&self) -> usize {
        self.positions.height()
    }

    /// Normalization area used by [`loss`](Lens::loss): the vertex count
    /// `width * height`. Note that this counts vertices while the cells of
    /// an undeformed lens cover `(width - 1) * (height - 1)`, so the loss
    /// of a uniform target on a fresh lens is a nonzero constant.
    pub fn total_area(&self) -> f64 {
        (self.width() * self.height()) as f64
    }

    /// Area of every cell of the mesh, computed with the shoelace formula
    /// on the four corner vertices. The result has one element per cell.
    pub fn cell_areas(&self) -> ScalarField {
        let mut areas = ScalarField::zeros(
            self.width().saturating_sub(1),
            self.height().saturating_sub(1),
        );
        for square in self.positions.cell_squares() {
            let corners = square.map(|(x, y)| self.positions.get(x, y));
            let (x, y) = square[0];
            areas.set(x, y, geometry::polygon_area(&corners));
        }
        areas
    }

    /// Per-cell difference between the brightness share the target asks
    /// for and the area share the cell currently covers.
    ///
    /// Fails with a shape mismatch error unless `target` has exactly one
    /// element per cell.
    pub fn loss(&self, target: &ScalarField) -> CausticResult<ScalarField> {
        let areas = self.cell_areas();
        if !areas.has_same_shape(target) {
            return Err(CausticError::shape_mismatch(areas.shape(), target.shape()));
        }
        let brightness_share = target.divided_by(target.sum());
        let area_share = areas.divided_by(self.total_area());
        brightness_share.minus(&area_share)
    }

    /// Marches the lens along `velocity` with the default extent.
    pub fn march(&mut self, velocity: &VectorField) -> CausticResult<MarchResult> {
        self.march_with_extent(velocity, DEFAULT_MARCH_EXTENT)
    }

    /// Marches every vertex against `velocity` for `extent` times the first
    /// triangle collapse time.
    ///
    /// `velocity` holds one vector per cell and is validated against the
    /// lens shape. The cell vectors are negated, embedded into the vertex
    /// grid and extended to the far row and column, and boundary vertices
    /// are restricted to tangential motion so the lens keeps its outline.
    ///
    /// A zero velocity field leaves the lens unchanged. A nonzero field
    /// that no triangle collapse bounds fails with an unconstrained march
    /// error, since stepping an unbounded march would fold the mesh.
    ///
    /// # Panics
    ///
    /// Panics if `extent` lies outside `[0, 1]`.
    pub fn march_with_extent(
        &mut self,
        velocity: &VectorField,
        extent: f64,
    ) -> CausticResult<MarchResult> {
        assert!(
            (0.0..=1.0).contains(&extent),
            "march extent must lie in [0, 1], got {extent}"
        );
        let expected = [
            self.width().saturating_sub(1),
            self.height().saturating_sub(1),
        ];
        if velocity.shape() != expected {
            return Err(CausticError::march_size_mismatch(
                self.positions.shape(),
                velocity.shape(),
            ));
        }

        let step = self.clamped_step_field(velocity);

        let mut limit_time: Option<f64> = None;
        for triangle in self.positions.cell_triangles() {
            let points = triangle.map(|(x, y)| self.positions.get(x, y));
            let velocities = triangle.map(|(x, y)| step.get(x, y));
            let times = geometry::triangle_collapse_times(points, velocities);
            if let Some(t) = times.smallest_positive() {
                limit_time = Some(limit_time.map_or(t, |current| current.min(t)));
            }
        }

        let limit_time = match limit_time {
            Some(t) => t,
            None => {
                if step.iter().all(|v| geometry::is_zero(v.norm())) {
                    debug!("velocity field is zero, lens unchanged");
                    return Ok(MarchResult {
                        limit_time: 0.0,
                        max_displacement: 0.0,
                    });
                }
                return Err(CausticError::unconstrained_march());
            }
        };

        let travel = limit_time * extent;
        let mut max_displacement = 0.0f64;
        self.positions = self.positions.zipped_with(&step, |position, v| {
            let displacement = v * travel;
            max_displacement = max_displacement.max(displacement.norm());
            position + displacement
        })?;

        debug!(limit_time, travel, max_displacement, "march step applied");
        Ok(MarchResult {
            limit_time,
            max_displacement,
        })
    }

    /// Builds the per-vertex step field from a per-cell velocity field.
    ///
    /// The velocity is negated and placed at the top-left vertex of each
    /// cell. The remaining far row and column replicate their inner
    /// neighbors, the far row first. Finally boundary rows lose their y
    /// component and boundary columns their x component, which keeps
    /// boundary vertices sliding along the lens outline.
    fn clamped_step_field(&self, velocity: &VectorField) -> VectorField {
        let width = self.width();
        let height = self.height();
        let mut step = velocity
            .negated()
            .copied_into(&VectorField::zeros(width, height));

        if height >= 2 {
            for x in 0..width.saturating_sub(1) {
                step.set(x, height - 1, step.get(x, height - 2));
            }
        }
        if width >= 2 {
            for y in 0..height {
                step.set(width - 1, y, step.get(width - 2, y));
            }
        }

        for x in 0..width {
            let top = step.get(x, 0);
            step.set(x, 0, Vector2::new(top.x, 0.0));
            let bottom = step.get(x, height - 1);
            step.set(x, height - 1, Vector2::new(bottom.x, 0.0));
        }
        for y in 0..height {
            let left = step.get(0, y);
            step.set(0, y, Vector2::new(0.0, left.y));
            let right = step.get(width - 1, y);
            step.set(width - 1, y, Vector2::new(0.0, right.y));
        }
        step
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CausticErrorCode;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_lens_sits_on_the_integer_lattice() {
        let lens = Lens::new(2, 3);
        assert_eq!(lens.width(), 3);
        assert_eq!(lens.height(), 4);
        for y in 0..4 {
            for x in 0..3 {
                let position = lens.positions().get(x, y);
                assert_relative_eq!(position.x, x as f64, epsilon = 1e-10);
                assert_relative_eq!(position.y, y as f64, epsilon = 1e-10);
            }
        }
    }

    #[test]
    fn test_fresh_cells_have_unit_area() {
        let lens = Lens::new(2, 2);
        let areas = lens.cell_areas();
        assert_eq!(areas.shape(), [2, 2]);
        for &area in areas.iter() {
            assert_relative_eq!(area, 1.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_total_area_counts_vertices() {
        let lens = Lens::new(2, 2);
        assert_relative_eq!(lens.total_area(), 9.0, epsilon = 1e-10);
    }

    #[test]
    fn test_loss_of_uniform_target_is_constant() {
        // Brightness share is 1/4 per cell, area share 1/9 per cell under
        // the vertex-count normalization, so the loss is 5/36 everywhere.
        let lens = Lens::new(2, 2);
        let target = ScalarField::filled(2, 2, 5.0);
        let loss = lens.loss(&target).unwrap();
        for &value in loss.iter() {
            assert_relative_eq!(value, 5.0 / 36.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_loss_rejects_wrong_target_shape() {
        let lens = Lens::new(2, 2);
        let target = ScalarField::filled(3, 3, 1.0);
        let err = lens.loss(&target).unwrap_err();
        assert_eq!(err.code(), CausticErrorCode::ShapeMismatch);
    }

    #[test]
    fn test_march_zero_velocity_leaves_lens_unchanged() {
        let mut lens = Lens::new(3, 3);
        let before = lens.positions().clone();
        let result = lens.march(&VectorField::zeros(3, 3)).unwrap();
        assert_eq!(result.limit_time, 0.0);
        assert_eq!(result.max_displacement, 0.0);
        assert_eq!(lens.positions(), &before);
    }

    #[test]
    fn test_march_rejects_wrong_velocity_shape() {
        let mut lens = Lens::new(2, 2);
        let err = lens.march(&VectorField::zeros(3, 3)).unwrap_err();
        assert_eq!(err.code(), CausticErrorCode::MarchSizeMismatch);
    }

    #[test]
    fn test_march_stops_at_half_the_collapse_time() {
        // Only the center cell pushes: the interior vertex (1, 1) and its
        // replicated neighbor (1, 2) step left. The nearest collapse is at
        // t = 1, when (1, 1) would reach the corner (0, 1), so the default
        // extent moves the vertices half a unit.
        let mut lens = Lens::new(2, 2);
        let mut velocity = VectorField::zeros(2, 2);
        velocity.set(1, 1, Vector2::new(1.0, 0.0));

        let result = lens.march(&velocity).unwrap();
        assert_relative_eq!(result.limit_time, 1.0, epsilon = 1e-10);
        assert_relative_eq!(result.max_displacement, 0.5, epsilon = 1e-10);

        let moved = lens.positions().get(1, 1);
        assert_relative_eq!(moved.x, 0.5, epsilon = 1e-10);
        assert_relative_eq!(moved.y, 1.0, epsilon = 1e-10);
        let slid = lens.positions().get(1, 2);
        assert_relative_eq!(slid.x, 0.5, epsilon = 1e-10);
        assert_relative_eq!(slid.y, 2.0, epsilon = 1e-10);

        // Everything else stays put.
        for (x, y) in [(0, 0), (1, 0), (2, 0), (0, 1), (2, 1), (0, 2), (2, 2)] {
            let position = lens.positions().get(x, y);
            assert_relative_eq!(position.x, x as f64, epsilon = 1e-10);
            assert_relative_eq!(position.y, y as f64, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_march_keeps_boundary_vertices_on_the_outline() {
        let mut lens = Lens::new(2, 2);
        let velocity = VectorField::filled(2, 2, Vector2::new(1.0, 1.0));
        lens.march(&velocity).unwrap();

        for i in 0..3 {
            assert_relative_eq!(lens.positions().get(0, i).x, 0.0, epsilon = 1e-10);
            assert_relative_eq!(lens.positions().get(2, i).x, 2.0, epsilon = 1e-10);
            assert_relative_eq!(lens.positions().get(i, 0).y, 0.0, epsilon = 1e-10);
            assert_relative_eq!(lens.positions().get(i, 2).y, 2.0, epsilon = 1e-10);
        }
    }

    #[test]
    fn test_march_on_fully_clamped_lens_is_a_no_op() {
        // A single-cell lens has only boundary vertices; clamping removes
        // every component of the step field.
        let mut lens = Lens::new(1, 1);
        let before = lens.positions().clone();
        let mut velocity = VectorField::zeros(1, 1);
        velocity.set(0, 0, Vector2::new(3.0, -2.0));

        let result = lens.march(&velocity).unwrap();
        assert_eq!(result.limit_time, 0.0);
        assert_eq!(lens.positions(), &before);
    }

    #[test]
    fn test_march_on_collapsed_lens_is_unconstrained() {
        // Every vertex sits on the same point, so no triangle can newly
        // collapse, yet the step field is nonzero.
        let mut lens = Lens::from_positions(VectorField::zeros(3, 3));
        let mut velocity = VectorField::zeros(2, 2);
        velocity.set(1, 1, Vector2::new(1.0, 0.0));

        let err = lens.march(&velocity).unwrap_err();
        assert_eq!(err.code(), CausticErrorCode::UnconstrainedMarch);
    }

    #[test]
    #[should_panic(expected = "march extent")]
    fn test_march_extent_outside_unit_interval_panics() {
        let mut lens = Lens::new(2, 2);
        let _ = lens.march_with_extent(&VectorField::zeros(2, 2), 1.5);
    }

    #[test]
    fn test_march_redistributes_cell_areas() {
        // Pushing against cell (1, 1) moves the interior vertex toward the
        // far corner: the bottom-right cell shrinks toward its collapse at
        // t = 1 and the top-left cell absorbs the freed area.
        let mut lens = Lens::new(2, 2);
        let mut velocity = VectorField::zeros(2, 2);
        velocity.set(1, 1, Vector2::new(-1.0, -1.0));

        let result = lens.march(&velocity).unwrap();
        assert_relative_eq!(result.limit_time, 1.0, epsilon = 1e-10);

        let areas = lens.cell_areas();
        assert_relative_eq!(areas.get(0, 0), 1.5, epsilon = 1e-10);
        assert_relative_eq!(areas.get(1, 0), 1.125, epsilon = 1e-10);
        assert_relative_eq!(areas.get(0, 1), 1.125, epsilon = 1e-10);
        assert_relative_eq!(areas.get(1, 1), 0.25, epsilon = 1e-10);
        // The boundary clamp conserves the total mesh area.
        assert_relative_eq!(areas.sum(), 4.0, epsilon = 1e-10);
    }
}
