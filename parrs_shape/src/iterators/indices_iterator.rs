use std::iter::FusedIterator;

use rayon::iter::{IntoParallelIterator, MapWith, ParallelIterator};

use crate::{unravel_index, Hyperslab, Indices as ArrayIndices, Offset};

/// The indices of the elements of a hyperslab, last dimension fastest.
///
/// The indices of the hyperslab `[2..4, 1..3]` are `[2, 1]`, `[2, 2]`, `[3, 1]` and `[3, 2]`.
/// A rank 0 hyperslab has a single element with indices `[]`.
#[derive(Clone, Copy, Debug)]
pub struct Indices<const R: usize> {
    hyperslab: Hyperslab<R>,
}

impl<const R: usize> Indices<R> {
    /// Create the indices of the elements of `hyperslab`.
    #[must_use]
    pub fn new(hyperslab: Hyperslab<R>) -> Self {
        Self { hyperslab }
    }

    /// Return the number of indices.
    ///
    /// # Panics
    /// Panics if the number of indices exceeds [`usize::MAX`].
    #[must_use]
    pub fn len(&self) -> usize {
        self.hyperslab.num_elements_usize()
    }

    /// Returns true if there are no indices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hyperslab.is_empty()
    }

    /// Create a new serial iterator.
    #[must_use]
    pub fn iter(&self) -> IndicesIterator<R> {
        IndicesIterator::new(&self.hyperslab)
    }
}

impl<const R: usize> IntoIterator for Indices<R> {
    type Item = ArrayIndices<R>;
    type IntoIter = IndicesIterator<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<const R: usize> IntoIterator for &Indices<R> {
    type Item = ArrayIndices<R>;
    type IntoIter = IndicesIterator<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Parallel iterator over [`Indices`].
///
/// Each rayon job unravels the linear index it starts at, so jobs can split anywhere.
pub type ParIndicesIterator<const R: usize> =
    MapWith<rayon::range::Iter<usize>, Hyperslab<R>, fn(&mut Hyperslab<R>, usize) -> ArrayIndices<R>>;

fn nth_indices<const R: usize>(hyperslab: &mut Hyperslab<R>, index: usize) -> ArrayIndices<R> {
    let Some(within) = unravel_index(index as u64, hyperslab.count()) else {
        panic!("index {index} is out of bounds of hyperslab {hyperslab}")
    };
    std::array::from_fn(|d| hyperslab.start()[d] + within[d])
}

impl<const R: usize> IntoParallelIterator for Indices<R> {
    type Item = ArrayIndices<R>;
    type Iter = ParIndicesIterator<R>;

    fn into_par_iter(self) -> Self::Iter {
        let nth: fn(&mut Hyperslab<R>, usize) -> ArrayIndices<R> = nth_indices;
        (0..self.len()).into_par_iter().map_with(self.hyperslab, nth)
    }
}

impl<const R: usize> IntoParallelIterator for &Indices<R> {
    type Item = ArrayIndices<R>;
    type Iter = ParIndicesIterator<R>;

    fn into_par_iter(self) -> Self::Iter {
        (*self).into_par_iter()
    }
}

/// Serial iterator over [`Indices`].
///
/// Steps through the hyperslab like an odometer: the last dimension is incremented and wraps to its start into the
/// dimension before it.
#[derive(Clone, Debug)]
pub struct IndicesIterator<const R: usize> {
    start: Offset<R>,
    end: Offset<R>,
    next: ArrayIndices<R>,
    remaining: usize,
}

impl<const R: usize> IndicesIterator<R> {
    fn new(hyperslab: &Hyperslab<R>) -> Self {
        Self {
            start: *hyperslab.start(),
            end: hyperslab.end_exc(),
            next: *hyperslab.start(),
            remaining: hyperslab.num_elements_usize(),
        }
    }
}

impl<const R: usize> Iterator for IndicesIterator<R> {
    type Item = ArrayIndices<R>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let current = self.next;
        self.remaining -= 1;
        for d in (0..R).rev() {
            self.next[d] += 1;
            if self.next[d] < self.end[d] {
                break;
            }
            self.next[d] = self.start[d];
        }
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<const R: usize> ExactSizeIterator for IndicesIterator<R> {}

impl<const R: usize> FusedIterator for IndicesIterator<R> {}
