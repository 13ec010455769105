//! Hyperslabs.
//!
//! A [`Hyperslab`] is an axis-aligned rectangular region of an array, given by a start and a count per dimension.
//! Cursors, partition grids and buffer slicing are all expressed in terms of hyperslabs.

use std::fmt::{Debug, Display};
use std::ops::Range;

use thiserror::Error;

use crate::iterators::{Indices, LinearisedIndices};
use crate::{Count, IndexerError, Offset, Shape};

/// An invalid hyperslab construction or transformation.
#[derive(Clone, Debug, Error)]
#[allow(missing_docs)]
pub enum HyperslabError {
    /// Incompatible start and end indices.
    #[error("incompatible start {start:?} with end {end:?} (inclusive: {inclusive})")]
    IncompatibleStartEnd {
        start: Vec<u64>,
        end: Vec<u64>,
        inclusive: bool,
    },
    /// Incompatible offset.
    #[error("incompatible offset {offset:?} for region with start {start:?}")]
    IncompatibleOffset { start: Vec<u64>, offset: Vec<u64> },
}

/// A rectangular region of a rank `R` array.
///
/// An empty hyperslab (a zero count along any dimension) is valid and contains no elements.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct Hyperslab<const R: usize> {
    start: Offset<R>,
    count: Shape<R>,
}

impl<const R: usize> Display for Hyperslab<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.to_ranges().fmt(f)
    }
}

impl<const R: usize> From<[Range<u64>; R]> for Hyperslab<R> {
    fn from(ranges: [Range<u64>; R]) -> Self {
        Self::new_with_ranges(&ranges)
    }
}

impl<const R: usize> Hyperslab<R> {
    /// Create a new empty hyperslab at the origin.
    #[must_use]
    pub fn new_empty() -> Self {
        Self {
            start: [0; R],
            count: [0; R],
        }
    }

    /// Create a new hyperslab from a list of [`Range`]s.
    ///
    /// A range with an end before its start is empty.
    #[must_use]
    pub fn new_with_ranges(ranges: &[Range<u64>; R]) -> Self {
        Self {
            start: std::array::from_fn(|d| ranges[d].start),
            count: std::array::from_fn(|d| ranges[d].end.saturating_sub(ranges[d].start)),
        }
    }

    /// Create a new hyperslab covering `shape` starting at the origin.
    #[must_use]
    pub fn new_with_shape(shape: Shape<R>) -> Self {
        Self {
            start: [0; R],
            count: shape,
        }
    }

    /// Create a new hyperslab from a start and a count.
    #[must_use]
    pub fn new_with_start_count(start: Offset<R>, count: Shape<R>) -> Self {
        Self { start, count }
    }

    /// Create a new hyperslab from a start and end (inclusive).
    ///
    /// # Errors
    /// Returns [`HyperslabError`] if any element of `end` is less than `start`.
    pub fn new_with_start_end_inc(start: Offset<R>, end: Offset<R>) -> Result<Self, HyperslabError> {
        if std::iter::zip(&start, &end).any(|(start, end)| end < start) {
            Err(HyperslabError::IncompatibleStartEnd {
                start: start.to_vec(),
                end: end.to_vec(),
                inclusive: true,
            })
        } else {
            let count = std::array::from_fn(|d| end[d] - start[d] + 1);
            Ok(Self { start, count })
        }
    }

    /// Create a new hyperslab from a start and end (exclusive).
    ///
    /// # Errors
    /// Returns [`HyperslabError`] if any element of `end` is less than `start`.
    pub fn new_with_start_end_exc(start: Offset<R>, end: Offset<R>) -> Result<Self, HyperslabError> {
        if std::iter::zip(&start, &end).any(|(start, end)| end < start) {
            Err(HyperslabError::IncompatibleStartEnd {
                start: start.to_vec(),
                end: end.to_vec(),
                inclusive: false,
            })
        } else {
            let count = std::array::from_fn(|d| end[d] - start[d]);
            Ok(Self { start, count })
        }
    }

    /// Bound the hyperslab to the domain within `end` (exclusive).
    #[must_use]
    pub fn bound(&self, end: &Offset<R>) -> Self {
        let end_exc = self.end_exc();
        let start: Offset<R> = std::array::from_fn(|d| self.start[d].min(end[d]));
        let count = std::array::from_fn(|d| end_exc[d].min(end[d]) - start[d]);
        Self { start, count }
    }

    /// Return the start of the hyperslab.
    #[must_use]
    pub fn start(&self) -> &Offset<R> {
        &self.start
    }

    /// Return the number of elements of the hyperslab along each dimension.
    #[must_use]
    pub fn count(&self) -> &Shape<R> {
        &self.count
    }

    /// Return the end (exclusive) of the hyperslab.
    #[must_use]
    pub fn end_exc(&self) -> Offset<R> {
        std::array::from_fn(|d| self.start[d] + self.count[d])
    }

    /// Return the end (inclusive) of the hyperslab.
    ///
    /// Returns [`None`] if the hyperslab is empty.
    #[must_use]
    pub fn end_inc(&self) -> Option<Offset<R>> {
        if self.is_empty() {
            None
        } else {
            Some(std::array::from_fn(|d| self.start[d] + self.count[d] - 1))
        }
    }

    /// Returns if the hyperslab is empty (i.e. has a zero element in its count).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count.iter().any(|&c| c == 0)
    }

    /// Return the number of elements of the hyperslab.
    #[must_use]
    pub fn num_elements(&self) -> Count {
        self.count.iter().product()
    }

    /// Return the number of elements of the hyperslab as a [`usize`].
    ///
    /// # Panics
    /// Panics if the number of elements exceeds [`usize::MAX`].
    #[must_use]
    pub fn num_elements_usize(&self) -> usize {
        usize::try_from(self.num_elements()).expect("number of elements exceeds usize::MAX")
    }

    /// Return the hyperslab as a list of ranges.
    #[must_use]
    pub fn to_ranges(&self) -> [Range<u64>; R] {
        std::array::from_fn(|d| self.start[d]..self.start[d] + self.count[d])
    }

    /// Returns true if `indices` are within the hyperslab.
    #[must_use]
    pub fn contains(&self, indices: &[u64; R]) -> bool {
        (0..R).all(|d| indices[d] >= self.start[d] && indices[d] - self.start[d] < self.count[d])
    }

    /// Returns true if the hyperslab is within the bounds of an array with `shape`.
    #[must_use]
    pub fn inbounds_shape(&self, shape: &Shape<R>) -> bool {
        (0..R).all(|d| self.start[d] + self.count[d] <= shape[d])
    }

    /// Returns true if the hyperslab is within `other`.
    #[must_use]
    pub fn inbounds(&self, other: &Self) -> bool {
        let end = self.end_exc();
        let other_end = other.end_exc();
        (0..R).all(|d| self.start[d] >= other.start[d] && end[d] <= other_end[d])
    }

    /// Return the overlapping region of two hyperslabs.
    ///
    /// The result is empty if they do not overlap.
    #[must_use]
    pub fn overlap(&self, other: &Self) -> Self {
        let end = self.end_exc();
        let other_end = other.end_exc();
        let start: Offset<R> = std::array::from_fn(|d| self.start[d].max(other.start[d]));
        let count = std::array::from_fn(|d| end[d].min(other_end[d]).saturating_sub(start[d]));
        Self { start, count }
    }

    /// Return the hyperslab relative to `offset`, which is subtracted from its start.
    ///
    /// # Errors
    /// Returns [`HyperslabError`] if `offset` exceeds the start along any dimension.
    pub fn relative_to(&self, offset: &Offset<R>) -> Result<Self, HyperslabError> {
        if std::iter::zip(&self.start, offset).any(|(start, offset)| start < offset) {
            Err(HyperslabError::IncompatibleOffset {
                start: self.start.to_vec(),
                offset: offset.to_vec(),
            })
        } else {
            Ok(Self {
                start: std::array::from_fn(|d| self.start[d] - offset[d]),
                count: self.count,
            })
        }
    }

    /// Returns an iterator over the indices of elements within the hyperslab.
    #[must_use]
    pub fn indices(&self) -> Indices<R> {
        Indices::new(*self)
    }

    /// Returns an iterator over the linearised indices of elements within the hyperslab.
    ///
    /// # Errors
    /// Returns [`IndexerError`] if `array_shape` does not encapsulate this hyperslab.
    pub fn linearised_indices(
        &self,
        array_shape: &Shape<R>,
    ) -> Result<LinearisedIndices<R>, IndexerError> {
        LinearisedIndices::new(*self, *array_shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hyperslab() {
        assert!(Hyperslab::new_with_start_end_inc([0, 0], [10, 10]).is_ok());
        assert!(Hyperslab::new_with_start_end_inc([5, 5], [0, 0]).is_err());
        assert!(Hyperslab::new_with_start_end_exc([0, 0], [10, 10]).is_ok());
        assert!(Hyperslab::new_with_start_end_exc([5, 5], [0, 0]).is_err());
        assert_eq!(
            Hyperslab::new_with_start_end_exc([2, 3], [2, 5]).unwrap().count(),
            &[0, 2]
        );
        let hyperslab = Hyperslab::new_with_shape([10, 10]).bound(&[5, 5]);
        assert_eq!(hyperslab.count(), &[5, 5]);

        let hyperslab0 = Hyperslab::new_with_ranges(&[1..5, 2..6]);
        let hyperslab1 = Hyperslab::from([3..6, 4..7]);
        assert_eq!(
            hyperslab0.overlap(&hyperslab1),
            Hyperslab::new_with_ranges(&[3..5, 4..6])
        );
        assert!(
            hyperslab0
                .overlap(&Hyperslab::new_with_ranges(&[6..8, 0..2]))
                .is_empty()
        );
        assert_eq!(
            hyperslab0.relative_to(&[1, 1]).unwrap(),
            Hyperslab::new_with_ranges(&[0..4, 1..5])
        );
        assert!(hyperslab0.relative_to(&[2, 1]).is_err());
        assert!(hyperslab0.inbounds_shape(&[10, 10]));
        assert!(!hyperslab0.inbounds_shape(&[2, 2]));
        assert!(hyperslab0.inbounds(&Hyperslab::new_with_ranges(&[0..6, 1..7])));
        assert!(hyperslab0.inbounds(&Hyperslab::new_with_ranges(&[1..5, 2..6])));
        assert!(!hyperslab0.inbounds(&Hyperslab::new_with_ranges(&[2..5, 2..6])));
        assert!(!hyperslab0.inbounds(&Hyperslab::new_with_ranges(&[1..5, 2..5])));
        assert_eq!(hyperslab0.to_ranges(), [1..5, 2..6]);
        assert_eq!(hyperslab0.to_string(), "[1..5, 2..6]");
        assert_eq!(hyperslab0.end_exc(), [5, 6]);
        assert_eq!(hyperslab0.end_inc(), Some([4, 5]));
        assert_eq!(hyperslab0.num_elements(), 16);
        assert!(hyperslab0.contains(&[1, 5]));
        assert!(!hyperslab0.contains(&[5, 5]));
        assert!(!hyperslab0.contains(&[0, 2]));

        let hyperslab2 = Hyperslab::new_with_ranges(&[3..6, 4..7, 0..1]);
        assert_eq!(
            hyperslab2
                .linearised_indices(&[6, 7, 1])
                .unwrap()
                .into_iter()
                .next(),
            Some(4 + (3 * 7))
        );
        assert!(hyperslab2.linearised_indices(&[5, 7, 1]).is_err());
    }

    #[test]
    fn hyperslab_empty() {
        let empty = Hyperslab::<3>::new_empty();
        assert!(empty.is_empty());
        assert_eq!(empty.num_elements(), 0);
        assert_eq!(empty.end_inc(), None);
        assert_eq!(empty.indices().len(), 0);
        assert!(empty.inbounds_shape(&[0, 0, 0]));
    }

    #[test]
    fn hyperslab_rank_zero() {
        let scalar = Hyperslab::<0>::new_with_shape([]);
        assert!(!scalar.is_empty());
        assert_eq!(scalar.num_elements(), 1);
        assert_eq!(scalar.indices().into_iter().collect::<Vec<_>>(), vec![[]]);
    }
}
