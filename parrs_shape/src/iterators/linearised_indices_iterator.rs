use std::iter::FusedIterator;

use crate::{linear_index, Hyperslab, IndexerError, Shape};

use super::{Indices, IndicesIterator};

/// The linear indices of the elements of a hyperslab within an enclosing array shape, last dimension fastest.
///
/// Within a 4x3 array, the linear indices of the hyperslab `[2..4, 1..3]` are `7`, `8`, `10` and `11`.
#[derive(Clone, Copy, Debug)]
pub struct LinearisedIndices<const R: usize> {
    indices: Indices<R>,
    array_shape: Shape<R>,
}

impl<const R: usize> LinearisedIndices<R> {
    /// Create the linear indices of the elements of `hyperslab` within `array_shape`.
    ///
    /// # Errors
    /// Returns [`IndexerError::OutOfBounds`] if `hyperslab` is not within `array_shape`.
    pub fn new(hyperslab: Hyperslab<R>, array_shape: Shape<R>) -> Result<Self, IndexerError> {
        if hyperslab.inbounds_shape(&array_shape) {
            Ok(Self {
                indices: hyperslab.indices(),
                array_shape,
            })
        } else {
            Err(IndexerError::new_oob(&hyperslab.end_exc(), &array_shape))
        }
    }

    /// Return the number of indices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns true if there are no indices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Create a new serial iterator.
    #[must_use]
    pub fn iter(&self) -> LinearisedIndicesIterator<R> {
        LinearisedIndicesIterator {
            inner: self.indices.iter(),
            array_shape: self.array_shape,
        }
    }
}

impl<const R: usize> IntoIterator for LinearisedIndices<R> {
    type Item = u64;
    type IntoIter = LinearisedIndicesIterator<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<const R: usize> IntoIterator for &LinearisedIndices<R> {
    type Item = u64;
    type IntoIter = LinearisedIndicesIterator<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Serial iterator over [`LinearisedIndices`].
#[derive(Clone, Debug)]
pub struct LinearisedIndicesIterator<const R: usize> {
    inner: IndicesIterator<R>,
    array_shape: Shape<R>,
}

impl<const R: usize> Iterator for LinearisedIndicesIterator<R> {
    type Item = u64;

    fn next(&mut self) -> Option<Self::Item> {
        // In bounds: the hyperslab was checked against the array shape on construction
        self.inner.next().map(|indices| linear_index(&indices, &self.array_shape))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<const R: usize> ExactSizeIterator for LinearisedIndicesIterator<R> {}

impl<const R: usize> FusedIterator for LinearisedIndicesIterator<R> {}
