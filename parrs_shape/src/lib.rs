//! Shapes, hyperslabs, cursors and partition grids for the [`parrs`](https://docs.rs/parrs/latest/parrs/index.html) crate.
//!
//! Rank is a const generic parameter throughout: a shape, offset or index tuple of a rank `R` array is a `[u64; R]`.
//!
//! - [`Hyperslab`]: an axis-aligned rectangular region (start and count per dimension).
//! - [`iterators`]: iterators over the indices of a [`Hyperslab`].
//! - [`ArrayCursor`], [`ArrayVisitor`] and [`visit_array`]: a depth-first traversal of a hyperslab, used to visit cells of a buffer or partitions of a partitioned array.
//! - [`PartitionGrid`]: the arithmetic of splitting an array shape into regular partitions.
//!
//! ## Licence
//! `parrs_shape` is licensed under either of
//!  - the Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> or
//!  - the MIT license <http://opensource.org/licenses/MIT>, at your option.

mod hyperslab;
pub use hyperslab::{Hyperslab, HyperslabError};

mod cursor;
pub use cursor::{visit_array, visit_cells, ArrayCursor, ArrayVisitor, CellVisitor};

mod grid;
pub use grid::{max_partition_shape, shape_in_partitions, PartitionGrid, PartitionGridError};

pub mod iterators;

use thiserror::Error;

/// A number of elements.
pub type Count = u64;

/// A linear or per-dimension index.
pub type Index = u64;

/// The extent of a rank `R` array along each dimension.
pub type Shape<const R: usize> = [Count; R];

/// The position of the first element of a partition within a rank `R` array.
pub type Offset<const R: usize> = [Index; R];

/// An ND index to an element of a rank `R` array.
pub type Indices<const R: usize> = [Index; R];

/// Indices that do not fit within a shape.
#[derive(Clone, Debug, Error)]
pub enum IndexerError {
    /// The indices reference elements outside of the array shape.
    #[error("indices {_0:?} are out-of-bounds of array shape {_1:?}")]
    OutOfBounds(Vec<u64>, Vec<u64>),
    /// A number of elements does not match the expected number.
    #[error("got {_0} elements, expected {_1}")]
    IncompatibleLength(u64, u64),
}

impl IndexerError {
    /// Create a new [`IndexerError`] representing out-of-bounds indices.
    #[must_use]
    pub fn new_oob(indices: &[u64], shape: &[u64]) -> Self {
        Self::OutOfBounds(indices.to_vec(), shape.to_vec())
    }
}

/// Return the number of elements of an array with `shape`.
///
/// A rank 0 shape (a scalar) has one element.
#[must_use]
pub fn nr_elements(shape: &[u64]) -> Count {
    shape.iter().product()
}

/// Return the linear (row-major) index of `indices` within `shape`.
///
/// Returns [`None`] if `indices` are not within `shape`.
#[must_use]
pub fn ravel_indices(indices: &[u64], shape: &[u64]) -> Option<Index> {
    let mut index: u64 = 0;
    let mut count = 1;
    for (i, s) in std::iter::zip(indices, shape).rev() {
        if i >= s {
            return None;
        }
        index += i * count;
        count *= s;
    }
    Some(index)
}

/// Return the linear (row-major, last dimension fastest) index of `indices` within `shape`.
///
/// # Panics
/// Panics if `indices` are not within `shape`.
#[must_use]
pub fn linear_index<const R: usize>(indices: &Indices<R>, shape: &Shape<R>) -> Index {
    ravel_indices(indices, shape)
        .unwrap_or_else(|| panic!("indices {indices:?} are outside of shape {shape:?}"))
}

/// Unravel a linear (row-major) index to ND indices within `shape`.
///
/// Returns [`None`] if `index` is not less than the number of elements of `shape`.
#[must_use]
pub fn unravel_index<const R: usize>(mut index: Index, shape: &Shape<R>) -> Option<Indices<R>> {
    if index >= nr_elements(shape) {
        return None;
    }
    let mut indices = [0; R];
    for (i, &s) in std::iter::zip(indices.iter_mut(), shape).rev() {
        *i = index % s;
        index /= s;
    }
    Some(indices)
}
