//! Adjustment of the partitions at the trailing border of a partitioned array.
//!
//! Partitions are created with the nominal partition shape. If an array extent is not a multiple of the nominal
//! partition extent, the last layer of partitions along that dimension extends beyond the array by the
//! [excess](parrs_shape::PartitionGrid::excess) of that dimension. Each dimension is adjusted independently.

use derive_more::Display;
use parrs_runtime::{LocalityId, Runtime};
use parrs_shape::{
    visit_array, visit_cells, ArrayCursor, ArrayVisitor, Hyperslab, Index, Indices, PartitionGrid, Shape,
};

use super::{ArrayPartition, ArrayPartitionData, Element};

/// The way the trailing partitions of an array are fitted to the array extent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display)]
pub enum ClampMode {
    /// Shrink the last partition along a dimension to the array extent.
    ///
    /// An array of extent 10 with a nominal partition extent of 4 has partitions of extent 4, 4 and 2.
    #[default]
    #[display("shrink")]
    Shrink,
    /// Merge the valid cells of the last partition along a dimension into the one before it.
    ///
    /// An array of extent 10 with a nominal partition extent of 4 has partitions of extent 4 and 6.
    /// If there is only one partition along a dimension, it is shrunk.
    #[display("merge")]
    Merge,
}

type Partitions<T, const R: usize> = ArrayPartitionData<ArrayPartition<T, R>, R>;

/// Replaces each visited partition with the partition returned by `f`.
struct PartitionVisitor<'p, T, const R: usize, F> {
    cursor: ArrayCursor<R>,
    partitions: &'p mut Partitions<T, R>,
    f: F,
}

impl<T, const R: usize, F> ArrayVisitor<R> for PartitionVisitor<'_, T, R, F>
where
    F: FnMut(&Indices<R>, &Partitions<T, R>) -> ArrayPartition<T, R>,
{
    fn cursor(&self) -> &ArrayCursor<R> {
        &self.cursor
    }

    fn cursor_mut(&mut self) -> &mut ArrayCursor<R> {
        &mut self.cursor
    }

    fn visit(&mut self) {
        let partition = (self.f)(self.cursor.current_cell(), &*self.partitions);
        self.partitions.set(self.cursor.linear_idx(), partition);
    }
}

fn visit_partitions<T, const R: usize>(
    partitions: &mut Partitions<T, R>,
    hyperslab: &Hyperslab<R>,
    f: impl FnMut(&Indices<R>, &Partitions<T, R>) -> ArrayPartition<T, R>,
) {
    let mut visitor = PartitionVisitor {
        cursor: ArrayCursor::new(*partitions.shape()),
        partitions,
        f,
    };
    visit_array(hyperslab, &mut visitor);
}

/// Return the hyperslab of partitions at `index` along `dimension`.
fn layer<const R: usize>(shape_in_partitions: &Shape<R>, dimension: usize, index: Index) -> Hyperslab<R> {
    let mut start = [0; R];
    let mut count = *shape_in_partitions;
    start[dimension] = index;
    count[dimension] = 1;
    Hyperslab::new_with_start_count(start, count)
}

/// Fit the trailing partitions created with the nominal partition shape of `grid` to its array shape.
///
/// `localities` and `partitions` must have the shape in partitions of `grid`. A merge erases the last layer of both.
///
/// # Panics
/// Panics if an excess is not less than the nominal partition extent.
pub(crate) fn clamp_partitions<T: Element, const R: usize>(
    runtime: &Runtime,
    grid: &PartitionGrid<R>,
    clamp_mode: ClampMode,
    localities: &mut ArrayPartitionData<LocalityId, R>,
    partitions: &mut Partitions<T, R>,
) {
    for dimension in 0..R {
        let nominal_extent = grid.partition_shape()[dimension];
        let excess = grid.excess(dimension);
        assert!(
            excess < nominal_extent,
            "excess {excess} along dimension {dimension} is not less than the partition extent {nominal_extent}"
        );
        if excess == 0 {
            continue;
        }
        let extent = nominal_extent - excess;
        if clamp_mode == ClampMode::Merge && partitions.shape()[dimension] > 1 {
            merge_partitions(runtime, localities, partitions, dimension, extent);
        } else {
            shrink_partitions(runtime, partitions, dimension, extent);
        }
    }
}

/// Shrink the last layer of partitions along `dimension` to `extent`.
fn shrink_partitions<T: Element, const R: usize>(
    runtime: &Runtime,
    partitions: &mut Partitions<T, R>,
    dimension: usize,
    extent: u64,
) {
    let last = layer(partitions.shape(), dimension, partitions.shape()[dimension] - 1);
    visit_partitions(partitions, &last, move |indices, partitions| {
        let partition = partitions.get_nd(indices);
        let mut shape = *partition.shape();
        shape[dimension] = shape[dimension].min(extent);
        partition.then_reshaped(runtime, shape, move |data| {
            let mut data = data.share();
            data.reshape(shape);
            data
        })
    });
}

/// Enlarge the second to last layer of partitions along `dimension` with the first `extent` cells of the last layer,
/// then erase the last layer of partitions and localities.
fn merge_partitions<T: Element, const R: usize>(
    runtime: &Runtime,
    localities: &mut ArrayPartitionData<LocalityId, R>,
    partitions: &mut Partitions<T, R>,
    dimension: usize,
    extent: u64,
) {
    let nr_partitions = partitions.shape()[dimension];
    let second_to_last = layer(partitions.shape(), dimension, nr_partitions - 2);
    visit_partitions(partitions, &second_to_last, move |indices, partitions| {
        let head = partitions.get_nd(indices);
        let mut tail_indices = *indices;
        tail_indices[dimension] += 1;
        let tail = partitions.get_nd(&tail_indices);

        let head_extent = head.shape()[dimension];
        let mut shape = *head.shape();
        shape[dimension] += extent;
        let mut valid_tail_shape = *tail.shape();
        valid_tail_shape[dimension] = valid_tail_shape[dimension].min(extent);

        let (head_data, tail_data) = (head.data().clone(), tail.data().clone());
        let data = runtime.spawn(head.locality(), async move {
            let head = head_data.await?;
            let tail = tail_data.await?;
            let mut merged = head.share();
            merged.reshape(shape);
            visit_cells(*tail.shape(), &Hyperslab::new_with_shape(valid_tail_shape), |cursor| {
                let mut target = *cursor.current_cell();
                target[dimension] += head_extent;
                merged.set_nd(&target, tail.get(cursor.linear_idx()));
            });
            Ok(merged)
        });
        ArrayPartition::new(head.locality(), *head.offset(), shape, data)
    });
    localities.erase(dimension, nr_partitions - 1, nr_partitions);
    partitions.erase(dimension, nr_partitions - 1, nr_partitions);
}
