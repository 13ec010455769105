//! Partitioned arrays.
//!
//! A [`PartitionedArray`] is a rank `R` array whose elements are split into rectangular partitions.
//! Each partition is an [`ArrayPartition`]: a handle to [`ArrayPartitionData`] that is computed asynchronously on the
//! [locality](parrs_runtime::Locality) the partition is placed on.
//!
//! The partitions of an array, in row-major order, tile the array exactly: every element of the array belongs to
//! exactly one partition. Partitions are created with a nominal partition shape, and the partitions at the trailing
//! border of the array are fitted to the array extent according to a [`ClampMode`].
//!
//! A partitioned array value is immutable. Algorithms create new arrays with new partitions, computed from the
//! partitions of their inputs on the same localities.

mod array_errors;
mod border;
mod partition;
mod partition_data;
mod scalar_data;

use parrs_runtime::LocalityId;
use parrs_shape::{max_partition_shape, nr_elements, Count, Hyperslab, Index, Indices, PartitionGrid, Shape};
use rayon::prelude::*;

pub use self::array_errors::{ArrayCreateError, ArrayError};
pub use self::border::ClampMode;
pub use self::partition::ArrayPartition;
pub use self::partition_data::ArrayPartitionData;
pub use self::scalar_data::ScalarData;
use crate::config::Context;

/// The element type of a partitioned array.
///
/// Implemented for all types satisfying its bounds.
pub trait Element: Clone + Default + std::fmt::Debug + Send + Sync + 'static {}

impl<T> Element for T where T: Clone + Default + std::fmt::Debug + Send + Sync + 'static {}

/// The data of a partition, independent of its rank.
///
/// Implemented by [`ArrayPartitionData`] and [`ScalarData`], so generic algorithm code can consume array and
/// scalar data alike.
pub trait PartitionData: Send + Sync + Sized + 'static {
    /// The element type.
    type Element: Element;

    /// Return the shape. The shape of scalar data is empty.
    fn shape(&self) -> &[u64];

    /// Return the number of elements. Scalar data has one element.
    fn nr_elements(&self) -> Count {
        nr_elements(self.shape())
    }

    /// Return the element at linear `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    fn get(&self, index: Index) -> Self::Element;

    /// Set the element at linear `index` to `value`.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    fn set(&mut self, index: Index, value: Self::Element);

    /// Reshape the data to `shape`, keeping the elements within the overlap of the current and the new shape.
    ///
    /// # Panics
    /// Panics if the data is scalar data or `shape` has a different rank.
    fn reshape(&mut self, shape: &[u64]);

    /// Return a deep copy of the data.
    #[must_use]
    fn copy(&self) -> Self;

    /// Return a handle sharing the elements of this data.
    #[must_use]
    fn share(&self) -> Self;
}

/// A rank `R` array split into partitions placed on localities.
pub struct PartitionedArray<T, const R: usize> {
    shape: Shape<R>,
    partition_shape: Shape<R>,
    localities: ArrayPartitionData<LocalityId, R>,
    partitions: ArrayPartitionData<ArrayPartition<T, R>, R>,
}

impl<T: Element, const R: usize> PartitionedArray<T, R> {
    /// Create a new array with `shape` filled with the default element.
    ///
    /// The partition shape is chosen such that there are at least as many partitions as localities,
    /// if the array has enough elements.
    ///
    /// # Errors
    /// Returns an [`ArrayCreateError`] if the placement of partitions fails.
    pub fn new(ctx: &Context, shape: Shape<R>) -> Result<Self, ArrayCreateError> {
        let nr_localities = ctx.runtime().nr_localities() as u64;
        Self::create(ctx, shape, max_partition_shape(&shape, nr_localities))
    }

    /// Create a new array with `shape` in partitions of `partition_shape`, filled with the default element.
    ///
    /// # Errors
    /// Returns an [`ArrayCreateError`] if `partition_shape` has a zero extent or the placement of partitions fails.
    pub fn create(ctx: &Context, shape: Shape<R>, partition_shape: Shape<R>) -> Result<Self, ArrayCreateError> {
        Self::create_with_value(ctx, shape, partition_shape, T::default())
    }

    /// Create a new array with `shape` in partitions of `partition_shape`, filled with `value`.
    ///
    /// The trailing partitions are clamped with the clamp mode of the context configuration.
    ///
    /// # Errors
    /// Returns an [`ArrayCreateError`] if `partition_shape` has a zero extent or the placement of partitions fails.
    pub fn create_with_value(
        ctx: &Context,
        shape: Shape<R>,
        partition_shape: Shape<R>,
        value: T,
    ) -> Result<Self, ArrayCreateError> {
        let clamp_mode = ctx.config().clamp_mode();
        Self::create_with_value_and_clamp_mode(ctx, shape, partition_shape, value, clamp_mode)
    }

    /// Create a new array with `shape` in partitions of `partition_shape`, filled with the default element.
    ///
    /// # Errors
    /// Returns an [`ArrayCreateError`] if `partition_shape` has a zero extent or the placement of partitions fails.
    pub fn create_with_clamp_mode(
        ctx: &Context,
        shape: Shape<R>,
        partition_shape: Shape<R>,
        clamp_mode: ClampMode,
    ) -> Result<Self, ArrayCreateError> {
        Self::create_with_value_and_clamp_mode(ctx, shape, partition_shape, T::default(), clamp_mode)
    }

    /// Create a new array with `shape` in partitions of `partition_shape`, filled with `value`.
    ///
    /// Each partition is filled by a task on its locality. Partitions are created with the nominal `partition_shape`;
    /// the partitions at the trailing border of the array are then fitted to the array shape according to `clamp_mode`.
    ///
    /// # Errors
    /// Returns an [`ArrayCreateError`] if
    ///  - `partition_shape` has a zero extent,
    ///  - the placement policy of the context produces an invalid placement, or
    ///  - validation is enabled and the created partitions do not tile the array.
    pub fn create_with_value_and_clamp_mode(
        ctx: &Context,
        shape: Shape<R>,
        partition_shape: Shape<R>,
        value: T,
        clamp_mode: ClampMode,
    ) -> Result<Self, ArrayCreateError> {
        let grid = PartitionGrid::new(shape, partition_shape)?;
        let mut localities = place(ctx, &grid)?;
        let runtime = ctx.runtime();

        let partitions = grid
            .partitions()
            .iter()
            .map(|indices| {
                let locality = localities.get_nd(&indices);
                let value = value.clone();
                let data = runtime.spawn(locality, async move {
                    Ok(ArrayPartitionData::new_with_value(partition_shape, value))
                });
                ArrayPartition::new(locality, grid.offset(&indices), partition_shape, data)
            })
            .collect();
        let mut partitions = ArrayPartitionData::from_vec(*grid.shape_in_partitions(), partitions);
        border::clamp_partitions(runtime, &grid, clamp_mode, &mut localities, &mut partitions);

        log::debug!(
            "created partitioned array of shape {shape:?} with {:?} partitions of nominal shape {partition_shape:?} ({clamp_mode})",
            partitions.shape()
        );
        Self::created(ctx, shape, partition_shape, localities, partitions)
    }

    /// Create a new array from in-memory `data`, split into partitions of `partition_shape`.
    ///
    /// Each partition holds a copy of its region of `data`.
    /// The partitions at the trailing border of the array are bounded to the array shape.
    ///
    /// # Errors
    /// Returns an [`ArrayCreateError`] if `partition_shape` has a zero extent or the placement of partitions fails.
    pub fn from_data(
        ctx: &Context,
        data: &ArrayPartitionData<T, R>,
        partition_shape: Shape<R>,
    ) -> Result<Self, ArrayCreateError> {
        let shape = *data.shape();
        let grid = PartitionGrid::new(shape, partition_shape)?;
        let localities = place(ctx, &grid)?;

        let slices: Vec<_> = grid
            .partitions()
            .par_iter()
            .map(|indices| (indices, data.slice(&grid.partition_hyperslab(&indices).to_ranges())))
            .collect();
        let runtime = ctx.runtime();
        let partitions = slices
            .into_iter()
            .map(|(indices, slice)| {
                let locality = localities.get_nd(&indices);
                let slice_shape = *slice.shape();
                let data = runtime.spawn(locality, async move { Ok(slice) });
                ArrayPartition::new(locality, grid.offset(&indices), slice_shape, data)
            })
            .collect();
        let partitions = ArrayPartitionData::from_vec(*grid.shape_in_partitions(), partitions);

        log::debug!(
            "distributed data of shape {shape:?} over {:?} partitions of nominal shape {partition_shape:?}",
            partitions.shape()
        );
        Self::created(ctx, shape, partition_shape, localities, partitions)
    }

    /// Create a new array with `shape` from `elements` in row-major order, split into partitions of `partition_shape`.
    ///
    /// See [`from_data`](PartitionedArray::from_data).
    ///
    /// # Errors
    /// Returns an [`ArrayCreateError`] if the number of elements does not match `shape`, `partition_shape` has a
    /// zero extent, or the placement of partitions fails.
    pub fn from_elements(
        ctx: &Context,
        shape: Shape<R>,
        elements: Vec<T>,
        partition_shape: Shape<R>,
    ) -> Result<Self, ArrayCreateError> {
        let data = ArrayPartitionData::try_from_vec(shape, elements)?;
        Self::from_data(ctx, &data, partition_shape)
    }

    fn created(
        ctx: &Context,
        shape: Shape<R>,
        partition_shape: Shape<R>,
        localities: ArrayPartitionData<LocalityId, R>,
        partitions: ArrayPartitionData<ArrayPartition<T, R>, R>,
    ) -> Result<Self, ArrayCreateError> {
        let array = Self::from_parts(shape, partition_shape, localities, partitions);
        let nr_localities = ctx.runtime().nr_localities() as u64;
        if array.nr_partitions() < nr_localities {
            log::warn!(
                "array of shape {shape:?} has {} partitions, fewer than the {nr_localities} localities",
                array.nr_partitions()
            );
        }
        if ctx.config().validate() {
            array.check_tiling()?;
        }
        Ok(array)
    }

    /// Block until all partitions are available and return the elements of the array as one buffer.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if a partition failed or its data does not match its shape.
    ///
    /// # Panics
    /// Panics if the number of elements of the array exceeds [`usize::MAX`].
    pub fn gather(&self) -> Result<ArrayPartitionData<T, R>, ArrayError> {
        let partitions = self.partitions.to_vec();
        let data = partitions
            .par_iter()
            .map(ArrayPartition::wait)
            .collect::<Result<Vec<_>, _>>()?;

        let mut array = ArrayPartitionData::new(self.shape);
        {
            let mut elements = array.elements_mut();
            for (partition, data) in partitions.iter().zip(&data) {
                if data.shape() != partition.shape() {
                    return Err(ArrayError::incompatible_shape(data.shape(), partition.shape()));
                }
                let indices = partition.hyperslab().linearised_indices(&self.shape)?;
                for (index, element) in indices.iter().zip(data.elements().iter()) {
                    let index = usize::try_from(index)
                        .unwrap_or_else(|_| panic!("linear index {index} exceeds usize::MAX"));
                    elements[index] = element.clone();
                }
            }
        }
        Ok(array)
    }

    /// Block until all partitions are available and check that they tile the array.
    ///
    /// # Errors
    /// Returns an [`ArrayError`] if a partition failed, the partitions do not tile the array, or the data of a
    /// partition does not match its shape.
    pub fn validate(&self) -> Result<(), ArrayError> {
        self.check_tiling()?;
        self.partitions.to_vec().par_iter().try_for_each(|partition| {
            let data = partition.wait()?;
            if data.shape() == partition.shape() {
                Ok(())
            } else {
                Err(ArrayError::incompatible_shape(data.shape(), partition.shape()))
            }
        })
    }
}

impl<T, const R: usize> PartitionedArray<T, R> {
    /// Create an array from its partitions.
    ///
    /// # Panics
    /// Panics if `localities` and `partitions` differ in shape.
    pub(crate) fn from_parts(
        shape: Shape<R>,
        partition_shape: Shape<R>,
        localities: ArrayPartitionData<LocalityId, R>,
        partitions: ArrayPartitionData<ArrayPartition<T, R>, R>,
    ) -> Self {
        assert_eq!(
            localities.shape(),
            partitions.shape(),
            "the placement table does not match the partitions"
        );
        Self {
            shape,
            partition_shape,
            localities,
            partitions,
        }
    }

    /// Return the shape.
    #[must_use]
    pub fn shape(&self) -> &Shape<R> {
        &self.shape
    }

    /// Return the nominal partition shape.
    ///
    /// Partitions at the trailing border of the array may be smaller (or larger, if merged).
    #[must_use]
    pub fn partition_shape(&self) -> &Shape<R> {
        &self.partition_shape
    }

    /// Return the number of partitions along each dimension.
    #[must_use]
    pub fn shape_in_partitions(&self) -> &Shape<R> {
        self.partitions.shape()
    }

    /// Return the number of partitions.
    #[must_use]
    pub fn nr_partitions(&self) -> Count {
        self.partitions.nr_elements()
    }

    /// Return the number of elements.
    #[must_use]
    pub fn nr_elements(&self) -> Count {
        nr_elements(&self.shape)
    }

    /// Return the partitions, in row-major order.
    #[must_use]
    pub fn partitions(&self) -> &ArrayPartitionData<ArrayPartition<T, R>, R> {
        &self.partitions
    }

    /// Return the locality of each partition.
    #[must_use]
    pub fn localities(&self) -> &ArrayPartitionData<LocalityId, R> {
        &self.localities
    }

    /// Return the partition at `indices` in the grid of partitions.
    ///
    /// # Panics
    /// Panics if `indices` are outside of the [shape in partitions](PartitionedArray::shape_in_partitions).
    #[must_use]
    pub fn partition(&self, indices: &Indices<R>) -> ArrayPartition<T, R> {
        self.partitions.get_nd(indices)
    }

    /// Returns true if the partitions of this array and `other` have the same offsets and shapes.
    #[must_use]
    pub fn is_partitioned_like<U>(&self, other: &PartitionedArray<U, R>) -> bool {
        if self.shape != other.shape || self.shape_in_partitions() != other.shape_in_partitions() {
            return false;
        }
        let partitions = self.partitions.elements();
        let other_partitions = other.partitions.elements();
        partitions
            .iter()
            .zip(other_partitions.iter())
            .all(|(a, b)| a.offset() == b.offset() && a.shape() == b.shape())
    }

    /// Check that the partition offsets and shapes tile the array and that the placement table matches the partitions.
    ///
    /// Does not wait for partition data.
    fn check_tiling(&self) -> Result<(), ArrayError> {
        let shape_in_partitions = *self.shape_in_partitions();
        let invalid = |message: String| Err(ArrayError::InvalidTiling(message));
        if self.localities.shape() != &shape_in_partitions {
            return invalid(format!(
                "placement table of shape {:?} does not match the {shape_in_partitions:?} partitions",
                self.localities.shape()
            ));
        }
        if self.partitions.is_empty() {
            return if nr_elements(&self.shape) == 0 {
                Ok(())
            } else {
                invalid(format!("array of shape {:?} has no partitions", self.shape))
            };
        }

        let mut nr_elements_partitions = 0;
        for indices in &Hyperslab::new_with_shape(shape_in_partitions).indices() {
            let partition = self.partitions.get_nd(&indices);
            if partition.locality() != self.localities.get_nd(&indices) {
                return invalid(format!(
                    "partition {indices:?} is on {}, the placement table says {}",
                    partition.locality(),
                    self.localities.get_nd(&indices)
                ));
            }
            // Offsets and extents along a dimension only depend on the partition index along that dimension
            for dimension in 0..R {
                let mut reference_indices = [0; R];
                reference_indices[dimension] = indices[dimension];
                let reference = self.partitions.get_nd(&reference_indices);
                if partition.offset()[dimension] != reference.offset()[dimension]
                    || partition.shape()[dimension] != reference.shape()[dimension]
                {
                    return invalid(format!(
                        "partition {indices:?} is not aligned with partition {reference_indices:?} along dimension {dimension}"
                    ));
                }
            }
            nr_elements_partitions += partition.nr_elements();
        }

        for dimension in 0..R {
            let mut end = 0;
            for idx in 0..shape_in_partitions[dimension] {
                let mut indices = [0; R];
                indices[dimension] = idx;
                let partition = self.partitions.get_nd(&indices);
                if partition.offset()[dimension] != end {
                    return invalid(format!(
                        "partition {indices:?} starts at {} along dimension {dimension}, expected {end}",
                        partition.offset()[dimension]
                    ));
                }
                end += partition.shape()[dimension];
            }
            if end != self.shape[dimension] {
                return invalid(format!(
                    "partitions end at {end} along dimension {dimension}, expected {}",
                    self.shape[dimension]
                ));
            }
        }

        if nr_elements_partitions == nr_elements(&self.shape) {
            Ok(())
        } else {
            invalid(format!(
                "partitions have {nr_elements_partitions} elements, expected {}",
                nr_elements(&self.shape)
            ))
        }
    }
}

/// Place the partitions of `grid` on the localities of the context.
fn place<const R: usize>(
    ctx: &Context,
    grid: &PartitionGrid<R>,
) -> Result<ArrayPartitionData<LocalityId, R>, ArrayCreateError> {
    let placement = ctx
        .runtime()
        .place(&ctx.config().placement(), grid.shape_in_partitions())?;
    Ok(ArrayPartitionData::from_vec(*grid.shape_in_partitions(), placement))
}

impl<T, const R: usize> Clone for PartitionedArray<T, R> {
    fn clone(&self) -> Self {
        Self {
            shape: self.shape,
            partition_shape: self.partition_shape,
            localities: self.localities.copy(),
            partitions: self.partitions.copy(),
        }
    }
}

impl<T, const R: usize> std::fmt::Debug for PartitionedArray<T, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PartitionedArray")
            .field("shape", &self.shape)
            .field("partition_shape", &self.partition_shape)
            .field("shape_in_partitions", self.shape_in_partitions())
            .field("localities", &self.localities)
            .finish_non_exhaustive()
    }
}
