//! Regular partition grids.
//!
//! A [`PartitionGrid`] splits an array shape into partitions of a nominal shape.
//! When an array extent is not a multiple of the nominal partition extent, the last partition along that dimension
//! is "bounded": it is clipped to the array extent, and the number of cells it is short by is the [`excess`](PartitionGrid::excess).

use thiserror::Error;

use crate::{Hyperslab, Indices, Offset, Shape, nr_elements};

/// An invalid partition grid.
#[derive(Clone, Debug, Error)]
#[error("partition shape {_0:?} has a zero extent")]
pub struct PartitionGridError(pub Vec<u64>);

/// Return the number of partitions along each dimension: the per-dimension ceiling of `array_shape / partition_shape`.
///
/// # Panics
/// Panics if `partition_shape` has a zero extent.
#[must_use]
pub fn shape_in_partitions<const R: usize>(
    array_shape: &Shape<R>,
    partition_shape: &Shape<R>,
) -> Shape<R> {
    std::array::from_fn(|d| {
        assert!(partition_shape[d] > 0, "partition extent must be non-zero");
        array_shape[d].div_ceil(partition_shape[d])
    })
}

/// Return a partition shape that splits `array_shape` into at least `min_nr_partitions` partitions.
///
/// Starting from a single partition covering the array, the dimension with the largest partition extent is split
/// into one more partition until there are enough partitions or no partition extent can be split further.
/// Partition extents are never zero; an empty array extent yields a partition extent of one.
#[must_use]
pub fn max_partition_shape<const R: usize>(array_shape: &Shape<R>, min_nr_partitions: u64) -> Shape<R> {
    let mut nr_partitions: Shape<R> = [1; R];
    let partition_shape = |nr_partitions: &Shape<R>| -> Shape<R> {
        std::array::from_fn(|d| array_shape[d].div_ceil(nr_partitions[d]).max(1))
    };
    let mut shape = partition_shape(&nr_partitions);
    if nr_elements(array_shape) == 0 {
        return shape;
    }
    while nr_elements(&shape_in_partitions(array_shape, &shape)) < min_nr_partitions {
        let Some(d) = (0..R)
            .filter(|&d| shape[d] > 1)
            .max_by_key(|&d| (shape[d], std::cmp::Reverse(d)))
        else {
            break;
        };
        // Grow until the partition extent actually changes
        let current = shape[d];
        while partition_shape(&nr_partitions)[d] == current {
            nr_partitions[d] += 1;
        }
        shape = partition_shape(&nr_partitions);
    }
    shape
}

/// A regular grid of partitions over an array.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PartitionGrid<const R: usize> {
    array_shape: Shape<R>,
    partition_shape: Shape<R>,
    shape_in_partitions: Shape<R>,
}

impl<const R: usize> PartitionGrid<R> {
    /// Create a new partition grid.
    ///
    /// # Errors
    /// Returns [`PartitionGridError`] if `partition_shape` has a zero extent.
    pub fn new(array_shape: Shape<R>, partition_shape: Shape<R>) -> Result<Self, PartitionGridError> {
        if partition_shape.contains(&0) {
            return Err(PartitionGridError(partition_shape.to_vec()));
        }
        Ok(Self {
            array_shape,
            partition_shape,
            shape_in_partitions: shape_in_partitions(&array_shape, &partition_shape),
        })
    }

    /// Return the array shape.
    #[must_use]
    pub fn array_shape(&self) -> &Shape<R> {
        &self.array_shape
    }

    /// Return the nominal partition shape.
    #[must_use]
    pub fn partition_shape(&self) -> &Shape<R> {
        &self.partition_shape
    }

    /// Return the number of partitions along each dimension.
    #[must_use]
    pub fn shape_in_partitions(&self) -> &Shape<R> {
        &self.shape_in_partitions
    }

    /// Return the total number of partitions.
    #[must_use]
    pub fn nr_partitions(&self) -> u64 {
        nr_elements(&self.shape_in_partitions)
    }

    /// Return the number of cells the last partition along `dimension` extends beyond the array.
    ///
    /// The excess is always less than the nominal partition extent.
    #[must_use]
    pub fn excess(&self, dimension: usize) -> u64 {
        self.shape_in_partitions[dimension] * self.partition_shape[dimension] - self.array_shape[dimension]
    }

    /// Return the offset of the partition at `partition_indices`.
    #[must_use]
    pub fn offset(&self, partition_indices: &Indices<R>) -> Offset<R> {
        std::array::from_fn(|d| partition_indices[d] * self.partition_shape[d])
    }

    /// Return the shape of the partition at `partition_indices`, clipped to the array extent.
    ///
    /// # Panics
    /// Panics if `partition_indices` are outside of the grid.
    #[must_use]
    pub fn bounded_partition_shape(&self, partition_indices: &Indices<R>) -> Shape<R> {
        assert!(
            Hyperslab::new_with_shape(self.shape_in_partitions).contains(partition_indices),
            "partition {partition_indices:?} is outside of the grid {:?}",
            self.shape_in_partitions
        );
        let offset = self.offset(partition_indices);
        std::array::from_fn(|d| self.partition_shape[d].min(self.array_shape[d] - offset[d]))
    }

    /// Return the region of the array covered by the partition at `partition_indices`.
    ///
    /// # Panics
    /// Panics if `partition_indices` are outside of the grid.
    #[must_use]
    pub fn partition_hyperslab(&self, partition_indices: &Indices<R>) -> Hyperslab<R> {
        Hyperslab::new_with_start_count(
            self.offset(partition_indices),
            self.bounded_partition_shape(partition_indices),
        )
    }

    /// Return the partition indices and the partition-local indices of the array element at `array_indices`.
    ///
    /// Returns [`None`] if `array_indices` are outside of the array.
    #[must_use]
    pub fn partition_of(&self, array_indices: &Indices<R>) -> Option<(Indices<R>, Indices<R>)> {
        if !Hyperslab::new_with_shape(self.array_shape).contains(array_indices) {
            return None;
        }
        let partition = std::array::from_fn(|d| array_indices[d] / self.partition_shape[d]);
        let local = std::array::from_fn(|d| array_indices[d] % self.partition_shape[d]);
        Some((partition, local))
    }

    /// Return the indices of all partitions, in row-major order.
    #[must_use]
    pub fn partitions(&self) -> crate::iterators::Indices<R> {
        Hyperslab::new_with_shape(self.shape_in_partitions).indices()
    }
}
