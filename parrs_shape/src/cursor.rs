//! Depth-first traversal of a hyperslab.
//!
//! An [`ArrayCursor`] tracks the cell currently visited within an array of known shape.
//! [`visit_array`] drives an [`ArrayVisitor`] over every cell of a hyperslab, with the last dimension varying fastest.
//! The visitor is notified when the traversal leaves a dimension, which lets visitors that operate on whole
//! layers (e.g. the last layer of partitions along a dimension) hook in between rows.

use crate::{Hyperslab, Index, Indices, Shape, linear_index};

/// A cursor into a rank `R` array.
///
/// The cursor knows the shape of the array, the hyperslab selected for a visit, the dimension currently being
/// traversed and the indices of the cell currently visited.
#[derive(Clone, Debug)]
pub struct ArrayCursor<const R: usize> {
    shape: Shape<R>,
    start: Indices<R>,
    count: Shape<R>,
    current_cell: Indices<R>,
    dimension_idx: usize,
}

impl<const R: usize> ArrayCursor<R> {
    /// Create a new cursor selecting the whole of an array with `shape`.
    #[must_use]
    pub fn new(shape: Shape<R>) -> Self {
        Self::new_with_hyperslab(shape, &Hyperslab::new_with_shape(shape))
    }

    /// Create a new cursor selecting `hyperslab` of an array with `shape`.
    ///
    /// # Panics
    /// Panics if `hyperslab` is not within `shape`.
    #[must_use]
    pub fn new_with_hyperslab(shape: Shape<R>, hyperslab: &Hyperslab<R>) -> Self {
        let mut cursor = Self {
            shape,
            start: [0; R],
            count: [0; R],
            current_cell: [0; R],
            dimension_idx: 0,
        };
        cursor.init(hyperslab);
        cursor
    }

    /// Select `hyperslab` and reset the cursor to its first cell.
    ///
    /// # Panics
    /// Panics if `hyperslab` is not within the array shape.
    pub fn init(&mut self, hyperslab: &Hyperslab<R>) {
        assert!(
            hyperslab.inbounds_shape(&self.shape),
            "hyperslab {hyperslab} is not within shape {:?}",
            self.shape
        );
        self.start = *hyperslab.start();
        self.count = *hyperslab.count();
        self.current_cell = self.start;
        self.dimension_idx = 0;
    }

    /// Move the traversal one dimension inwards.
    ///
    /// # Panics
    /// Panics if the cursor is already at the last dimension.
    pub fn enter_next_dimension(&mut self) {
        assert!(self.dimension_idx + 1 < R, "no dimension left to enter");
        self.dimension_idx += 1;
    }

    /// Reset the index of the current dimension to the start of the hyperslab and move one dimension outwards.
    ///
    /// # Panics
    /// Panics if the cursor is at the first dimension.
    pub fn leave_current_dimension(&mut self) {
        assert!(self.dimension_idx > 0, "cannot leave the first dimension");
        self.current_cell[self.dimension_idx] = self.start[self.dimension_idx];
        self.dimension_idx -= 1;
    }

    /// Advance the index of the current dimension by one.
    ///
    /// # Panics
    /// Panics if the index is already past the array extent.
    pub fn advance(&mut self) {
        let d = self.dimension_idx;
        assert!(self.current_cell[d] < self.shape[d], "advanced past the array extent");
        self.current_cell[d] += 1;
    }

    /// Return the shape of the array.
    #[must_use]
    pub fn shape(&self) -> &Shape<R> {
        &self.shape
    }

    /// Return the start of the selected hyperslab.
    #[must_use]
    pub fn start(&self) -> &Indices<R> {
        &self.start
    }

    /// Return the count of the selected hyperslab.
    #[must_use]
    pub fn count(&self) -> &Shape<R> {
        &self.count
    }

    /// Return the start index of the selected hyperslab along the current dimension.
    #[must_use]
    pub fn start_idx(&self) -> Index {
        self.start[self.dimension_idx]
    }

    /// Return the end index (exclusive) of the selected hyperslab along the current dimension.
    #[must_use]
    pub fn end_idx(&self) -> Index {
        self.start[self.dimension_idx] + self.count[self.dimension_idx]
    }

    /// Return the indices of the currently visited cell.
    #[must_use]
    pub fn current_cell(&self) -> &Indices<R> {
        &self.current_cell
    }

    /// Return the dimension currently traversed.
    #[must_use]
    pub fn dimension_idx(&self) -> usize {
        self.dimension_idx
    }

    /// Return the linear index of the currently visited cell.
    ///
    /// Only meaningful while the visitor is at a selected cell.
    ///
    /// # Panics
    /// Panics if the current cell is outside of the array.
    #[must_use]
    pub fn linear_idx(&self) -> Index {
        linear_index(&self.current_cell, &self.shape)
    }
}

/// A visitor of (a subset of) the cells of an array.
///
/// Implementors own an [`ArrayCursor`] and are called once per selected cell by [`visit_array`].
pub trait ArrayVisitor<const R: usize> {
    /// Return the cursor.
    fn cursor(&self) -> &ArrayCursor<R>;

    /// Return the cursor mutably.
    fn cursor_mut(&mut self) -> &mut ArrayCursor<R>;

    /// Called at each selected cell.
    fn visit(&mut self);

    /// Called just before the traversal leaves the current dimension.
    fn leaving_current_dimension(&mut self) {}

    /// Called just after the traversal left a dimension.
    fn left_current_dimension(&mut self) {}

    /// See [`ArrayCursor::enter_next_dimension`].
    fn enter_next_dimension(&mut self) {
        self.cursor_mut().enter_next_dimension();
    }

    /// See [`ArrayCursor::leave_current_dimension`].
    fn leave_current_dimension(&mut self) {
        self.leaving_current_dimension();
        self.cursor_mut().leave_current_dimension();
        self.left_current_dimension();
    }
}

fn visit_dimensions<const R: usize, V: ArrayVisitor<R> + ?Sized>(visitor: &mut V, rank: usize) {
    if rank == 0 {
        visitor.visit();
        return;
    }
    let begin = visitor.cursor().start_idx();
    let end = visitor.cursor().end_idx();
    for _ in begin..end {
        if rank > 1 {
            visitor.enter_next_dimension();
        }
        visit_dimensions(visitor, rank - 1);
        if rank > 1 {
            visitor.leave_current_dimension();
        }
        visitor.cursor_mut().advance();
    }
}

/// Visit every cell of `hyperslab` depth-first, the last dimension varying fastest.
///
/// The visitor's cursor is initialised to `hyperslab` before the visit.
/// A rank 0 visit calls [`ArrayVisitor::visit`] once. An empty hyperslab is not visited.
///
/// # Panics
/// Panics if `hyperslab` is not within the shape of the visitor's cursor.
pub fn visit_array<const R: usize, V: ArrayVisitor<R> + ?Sized>(
    hyperslab: &Hyperslab<R>,
    visitor: &mut V,
) {
    visitor.cursor_mut().init(hyperslab);
    if hyperslab.is_empty() {
        return;
    }
    visit_dimensions(visitor, R);
}

/// An [`ArrayVisitor`] calling a closure with the cursor at each selected cell.
pub struct CellVisitor<const R: usize, F> {
    cursor: ArrayCursor<R>,
    f: F,
}

impl<const R: usize, F: FnMut(&ArrayCursor<R>)> CellVisitor<R, F> {
    /// Create a new cell visitor over an array with `shape`.
    pub fn new(shape: Shape<R>, f: F) -> Self {
        Self {
            cursor: ArrayCursor::new(shape),
            f,
        }
    }
}

impl<const R: usize, F: FnMut(&ArrayCursor<R>)> ArrayVisitor<R> for CellVisitor<R, F> {
    fn cursor(&self) -> &ArrayCursor<R> {
        &self.cursor
    }

    fn cursor_mut(&mut self) -> &mut ArrayCursor<R> {
        &mut self.cursor
    }

    fn visit(&mut self) {
        (self.f)(&self.cursor);
    }
}

/// Call `f` with the cursor at every cell of `hyperslab` within an array with `shape`.
///
/// # Panics
/// Panics if `hyperslab` is not within `shape`.
pub fn visit_cells<const R: usize>(
    shape: Shape<R>,
    hyperslab: &Hyperslab<R>,
    f: impl FnMut(&ArrayCursor<R>),
) {
    let mut visitor = CellVisitor::new(shape, f);
    visit_array(hyperslab, &mut visitor);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_manual_traversal() {
        let mut cursor = ArrayCursor::new([3, 2]);
        assert_eq!(cursor.dimension_idx(), 0);
        assert_eq!(cursor.current_cell(), &[0, 0]);
        assert_eq!((cursor.start_idx(), cursor.end_idx()), (0, 3));

        cursor.enter_next_dimension();
        assert_eq!(cursor.dimension_idx(), 1);
        assert_eq!(cursor.linear_idx(), 0);
        cursor.advance();
        assert_eq!(cursor.current_cell(), &[0, 1]);
        assert_eq!(cursor.linear_idx(), 1);
        cursor.advance();
        cursor.leave_current_dimension();
        assert_eq!(cursor.current_cell(), &[0, 0]);
        cursor.advance();
        assert_eq!(cursor.current_cell(), &[1, 0]);
        cursor.enter_next_dimension();
        cursor.advance();
        assert_eq!(cursor.linear_idx(), 3);
    }

    #[test]
    fn visit_all_cells() {
        let mut visited = Vec::new();
        visit_cells([2, 3], &Hyperslab::new_with_shape([2, 3]), |cursor| {
            visited.push(cursor.linear_idx());
        });
        assert_eq!(visited, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn visit_sub_range() {
        let mut visited = Vec::new();
        visit_cells(
            [2, 3],
            &Hyperslab::new_with_start_count([1, 1], [1, 2]),
            |cursor| visited.push(cursor.linear_idx()),
        );
        assert_eq!(visited, vec![4, 5]);
    }

    #[test]
    fn visit_rank_3_and_rank_0() {
        let mut visited = Vec::new();
        visit_cells(
            [2, 2, 2],
            &Hyperslab::new_with_ranges(&[0..2, 1..2, 0..2]),
            |cursor| visited.push(*cursor.current_cell()),
        );
        assert_eq!(visited, vec![[0, 1, 0], [0, 1, 1], [1, 1, 0], [1, 1, 1]]);

        let mut nr_visits = 0;
        visit_cells([], &Hyperslab::new_with_shape([]), |_| nr_visits += 1);
        assert_eq!(nr_visits, 1);
    }

    #[test]
    fn visit_empty() {
        let mut nr_visits = 0;
        visit_cells([4, 4], &Hyperslab::new_with_ranges(&[1..3, 2..2]), |_| {
            nr_visits += 1;
        });
        assert_eq!(nr_visits, 0);
    }

    struct RowCounter {
        cursor: ArrayCursor<2>,
        rows: usize,
        cells: usize,
    }

    impl ArrayVisitor<2> for RowCounter {
        fn cursor(&self) -> &ArrayCursor<2> {
            &self.cursor
        }

        fn cursor_mut(&mut self) -> &mut ArrayCursor<2> {
            &mut self.cursor
        }

        fn visit(&mut self) {
            self.cells += 1;
        }

        fn leaving_current_dimension(&mut self) {
            assert_eq!(self.cursor.dimension_idx(), 1);
            self.rows += 1;
        }
    }

    #[test]
    fn visit_leaving_hook() {
        let mut visitor = RowCounter {
            cursor: ArrayCursor::new([4, 5]),
            rows: 0,
            cells: 0,
        };
        visit_array(&Hyperslab::new_with_ranges(&[1..4, 0..2]), &mut visitor);
        assert_eq!(visitor.rows, 3);
        assert_eq!(visitor.cells, 6);
    }

    #[test]
    #[should_panic(expected = "is not within shape")]
    fn visit_out_of_bounds() {
        visit_cells([2, 2], &Hyperslab::new_with_shape([3, 2]), |_| {});
    }
}
