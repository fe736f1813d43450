//! Generic rectangular grid of values with row-major storage.
//!
//! [`Field`] is the container underneath every scalar and vector quantity in
//! the pipeline: brightness images, loss fields, potentials, velocity fields
//! and lens vertex positions all live in one. The shape is fixed at
//! construction; only element values change afterwards.

use crate::error::{CausticError, CausticResult};

/// A `width` x `height` grid of values stored in a flat row-major buffer.
///
/// Coordinates are `(x, y)` with `x` running along a row and `y` selecting
/// the row, so element `(x, y)` lives at flat index `y * width + x`. Both
/// dimensions may be zero, which yields an inert empty field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T> Field<T> {
    /// Builds a field by evaluating `f` at every `(x, y)` position in
    /// row-major order.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Field {
            width,
            height,
            data,
        }
    }

    /// Width of the field in elements.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the field in elements.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Shape as `[width, height]`.
    #[inline]
    pub fn shape(&self) -> [usize; 2] {
        [self.width, self.height]
    }

    /// Total number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the field holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether `(x, y)` addresses an element of this field.
    #[inline]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    /// Whether `other` has exactly this field's width and height.
    #[inline]
    pub fn has_same_shape<U>(&self, other: &Field<U>) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Iterates over all elements in row-major order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        assert!(
            self.contains(x, y),
            "position ({x}, {y}) is out of bounds for a {}x{} field",
            self.width,
            self.height
        );
        y * self.width + x
    }
}

impl<T: Clone> Field<T> {
    /// Builds a field with every element set to `value`.
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Field {
            width,
            height,
            data: vec![value; width * height],
        }
    }
}

impl<T: Copy> Field<T> {
    /// Returns the element at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the field.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        self.data[self.index(x, y)]
    }

    /// Returns the element at `(x, y)`, or `None` when the position is
    /// outside the field.
    #[inline]
    pub fn try_get(&self, x: usize, y: usize) -> Option<T> {
        if self.contains(x, y) {
            Some(self.data[y * self.width + x])
        } else {
            None
        }
    }

    /// Replaces the element at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is outside the field.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let index = self.index(x, y);
        self.data[index] = value;
    }

    /// Applies `f` to every element, producing a field of the same shape.
    pub fn mapped<U>(&self, f: impl FnMut(T) -> U) -> Field<U> {
        Field {
            width: self.width,
            height: self.height,
            data: self.data.iter().copied().map(f).collect(),
        }
    }

    /// Combines two fields element-wise with `f`.
    ///
    /// Fails with a shape mismatch error when the shapes differ.
    pub fn zipped_with<U: Copy, V>(
        &self,
        other: &Field<U>,
        mut f: impl FnMut(T, U) -> V,
    ) -> CausticResult<Field<V>> {
        if !self.has_same_shape(other) {
            return Err(CausticError::shape_mismatch(self.shape(), other.shape()));
        }
        let data = self
            .data
            .iter()
            .zip(other.data.iter())
            .map(|(&a, &b)| f(a, b))
            .collect();
        Ok(Field {
            width: self.width,
            height: self.height,
            data,
        })
    }

    /// Iterates over the orthogonal neighbors of `(x, y)` that lie inside
    /// the field, in right, below, left, above order.
    ///
    /// Yields between two neighbors (at a corner) and four (in the
    /// interior).
    pub fn neighbors(&self, x: usize, y: usize) -> impl Iterator<Item = T> + '_ {
        let candidates = [
            (x + 1, y),
            (x, y + 1),
            (x.wrapping_sub(1), y),
            (x, y.wrapping_sub(1)),
        ];
        candidates
            .into_iter()
            .filter_map(|(nx, ny)| self.try_get(nx, ny))
    }

    /// Copies this field into a clone of `target`, anchored at the top-left
    /// corner. Elements outside the overlap keep `target`'s values; elements
    /// of `self` outside `target` are dropped.
    pub fn copied_into(&self, target: &Field<T>) -> Field<T> {
        let mut result = target.clone();
        for y in 0..self.height.min(target.height) {
            for x in 0..self.width.min(target.width) {
                result.set(x, y, self.get(x, y));
            }
        }
        result
    }
}

impl<T> Field<T> {
    /// Enumerates the corner positions of every unit cell, clockwise from
    /// the top-left corner: `(x, y)`, `(x+1, y)`, `(x+1, y+1)`, `(x, y+1)`.
    ///
    /// A `width` x `height` field has `(width-1) * (height-1)` cells.
    pub fn cell_squares(&self) -> impl Iterator<Item = [(usize, usize); 4]> {
        let width = self.width;
        (0..self.height.saturating_sub(1)).flat_map(move |y| {
            (0..width.saturating_sub(1))
                .map(move |x| [(x, y), (x + 1, y), (x + 1, y + 1), (x, y + 1)])
        })
    }

    /// Enumerates every cell split into two triangles along the diagonal
    /// from the top-right to the bottom-left corner. The upper-left triangle
    /// of a cell comes before its lower-right triangle.
    pub fn cell_triangles(&self) -> impl Iterator<Item = [(usize, usize); 3]> {
        self.cell_squares()
            .flat_map(|[tl, tr, br, bl]| [[tl, tr, bl], [tr, br, bl]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CausticErrorCode;

    #[test]
    fn test_from_fn_is_row_major() {
        let field = Field::from_fn(3, 2, |x, y| (x, y));
        assert_eq!(field.shape(), [3, 2]);
        assert_eq!(field.get(0, 0), (0, 0));
        assert_eq!(field.get(2, 0), (2, 0));
        assert_eq!(field.get(0, 1), (0, 1));
        let collected: Vec<_> = field.iter().copied().collect();
        assert_eq!(
            collected,
            vec![(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]
        );
    }

    #[test]
    fn test_filled_and_set() {
        let mut field = Field::filled(2, 2, 1.5);
        assert_eq!(field.get(1, 1), 1.5);
        field.set(1, 0, -3.0);
        assert_eq!(field.get(1, 0), -3.0);
        assert_eq!(field.get(0, 0), 1.5);
    }

    #[test]
    fn test_empty_field_is_inert() {
        let field: Field<f64> = Field::filled(0, 3, 0.0);
        assert!(field.is_empty());
        assert_eq!(field.len(), 0);
        assert_eq!(field.try_get(0, 0), None);
        assert_eq!(field.cell_squares().count(), 0);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_get_out_of_bounds_panics() {
        let field = Field::filled(2, 2, 0.0);
        field.get(2, 0);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_set_out_of_bounds_panics() {
        let mut field = Field::filled(2, 2, 0.0);
        field.set(0, 5, 1.0);
    }

    #[test]
    fn test_try_get_is_total() {
        let field = Field::from_fn(2, 2, |x, y| x + 10 * y);
        assert_eq!(field.try_get(1, 1), Some(11));
        assert_eq!(field.try_get(2, 0), None);
        assert_eq!(field.try_get(0, 2), None);
    }

    #[test]
    fn test_mapped_preserves_shape() {
        let field = Field::from_fn(3, 2, |x, _| x as f64);
        let doubled = field.mapped(|v| v * 2.0);
        assert_eq!(doubled.shape(), [3, 2]);
        assert_eq!(doubled.get(2, 1), 4.0);
    }

    #[test]
    fn test_zipped_with_rejects_shape_mismatch() {
        let a = Field::filled(2, 3, 1.0);
        let b = Field::filled(3, 2, 1.0);
        let err = a.zipped_with(&b, |x, y| x + y).unwrap_err();
        assert_eq!(err.code(), CausticErrorCode::ShapeMismatch);
    }

    #[test]
    fn test_zipped_with_combines_elements() {
        let a = Field::from_fn(2, 2, |x, y| (x + y) as f64);
        let b = Field::filled(2, 2, 10.0);
        let sum = a.zipped_with(&b, |x, y| x + y).unwrap();
        assert_eq!(sum.get(0, 0), 10.0);
        assert_eq!(sum.get(1, 1), 12.0);
    }

    #[test]
    fn test_neighbors_order_and_clipping() {
        let field = Field::from_fn(3, 3, |x, y| (10 * x + y) as i32);

        // Interior element keeps the full right, below, left, above order.
        let interior: Vec<_> = field.neighbors(1, 1).collect();
        assert_eq!(interior, vec![21, 12, 1, 10]);

        // Corner element keeps only the in-bounds neighbors, same order.
        let corner: Vec<_> = field.neighbors(0, 0).collect();
        assert_eq!(corner, vec![10, 1]);

        let edge: Vec<_> = field.neighbors(2, 1).collect();
        assert_eq!(edge, vec![22, 11, 20]);
    }

    #[test]
    fn test_copied_into_larger_field() {
        let small = Field::filled(2, 2, 7.0);
        let large = Field::filled(4, 3, 0.0);
        let merged = small.copied_into(&large);
        assert_eq!(merged.shape(), [4, 3]);
        assert_eq!(merged.get(1, 1), 7.0);
        assert_eq!(merged.get(2, 0), 0.0);
        assert_eq!(merged.get(3, 2), 0.0);
    }

    #[test]
    fn test_copied_into_smaller_field_drops_excess() {
        let large = Field::filled(4, 4, 7.0);
        let small = Field::filled(2, 2, 0.0);
        let merged = large.copied_into(&small);
        assert_eq!(merged.shape(), [2, 2]);
        assert!(merged.iter().all(|&v| v == 7.0));
    }

    #[test]
    fn test_cell_squares_are_clockwise_from_top_left() {
        let field = Field::filled(3, 2, 0);
        let squares: Vec<_> = field.cell_squares().collect();
        assert_eq!(squares.len(), 2);
        assert_eq!(squares[0], [(0, 0), (1, 0), (1, 1), (0, 1)]);
        assert_eq!(squares[1], [(1, 0), (2, 0), (2, 1), (1, 1)]);
    }

    #[test]
    fn test_cell_triangles_split_along_antidiagonal() {
        let field = Field::filled(2, 2, 0);
        let triangles: Vec<_> = field.cell_triangles().collect();
        assert_eq!(triangles.len(), 2);
        // Upper-left triangle, then lower-right, sharing the TR-BL diagonal.
        assert_eq!(triangles[0], [(0, 0), (1, 0), (0, 1)]);
        assert_eq!(triangles[1], [(1, 0), (1, 1), (0, 1)]);
    }
}
