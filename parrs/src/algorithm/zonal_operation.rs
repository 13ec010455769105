//! The zonal operation engine.
//!
//! A zonal operation computes a statistic per zone and assigns each cell the statistic of its zone.
//! It runs in three phases, each phase awaiting the futures of the previous one:
//! 1. **Aggregate**: per partition, on the locality of the zone partition, an [`Aggregator`] is fed every
//!    `(zone, value)` pair of the partition.
//! 2. **Merge**: a single task folds the per-partition aggregators into one, in the order they complete.
//! 3. **Apply**: per partition, on the locality of the zone partition, each cell gets the statistic of its zone
//!    from the merged aggregator.
//!
//! Because partitions complete in an unspecified order, [`Aggregator::merge`] must be commutative and associative.

use std::hash::Hash;
use std::sync::Arc;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use parrs_runtime::{LocalityId, TaskFuture};

use crate::array::{
    ArrayError, ArrayPartition, ArrayPartitionData, Element, PartitionData, PartitionedArray,
    ScalarData,
};
use crate::config::Context;

/// A mergeable per-zone accumulator.
///
/// An aggregator is fed `(zone, value)` pairs with [`add`](Aggregator::add), combined with other aggregators with
/// [`merge`](Aggregator::merge), and queried per zone with [`statistic`](Aggregator::statistic).
/// Missing data markers are a concern of the aggregator: every pair is passed to [`add`](Aggregator::add).
pub trait Aggregator: Default + Send + Sync + 'static {
    /// The zone type.
    type Zone: Element + Eq + Hash;
    /// The value type.
    type Value: Element;
    /// The statistic type.
    type Output: Element;

    /// Add `value` to the statistic of `zone`.
    fn add(&mut self, zone: Self::Zone, value: Self::Value);

    /// Merge the state of `other` into this aggregator.
    ///
    /// Must be commutative and associative.
    fn merge(&mut self, other: &Self);

    /// Return the statistic of `zone`, or [`None`] if nothing was added for `zone`.
    fn statistic(&self, zone: &Self::Zone) -> Option<Self::Output>;
}

/// Feed every `(zone, value)` pair of a partition to a new aggregator.
///
/// Scalar `values` are paired with every zone.
fn aggregate<A, V, Z>(values: &V, zones: &Z) -> A
where
    A: Aggregator,
    V: PartitionData<Element = A::Value>,
    Z: PartitionData<Element = A::Zone>,
{
    let broadcast = values.shape().is_empty();
    assert!(
        broadcast || values.shape() == zones.shape(),
        "value partition of shape {:?} does not match zone partition of shape {:?}",
        values.shape(),
        zones.shape()
    );
    let mut aggregator = A::default();
    for index in 0..zones.nr_elements() {
        let value = values.get(if broadcast { 0 } else { index });
        aggregator.add(zones.get(index), value);
    }
    aggregator
}

fn zonal_operation_impl<A, V, const R: usize>(
    ctx: &Context,
    values: impl Fn(usize) -> TaskFuture<V>,
    zones: &PartitionedArray<A::Zone, R>,
) -> PartitionedArray<A::Output, R>
where
    A: Aggregator,
    V: PartitionData<Element = A::Value>,
{
    let runtime = ctx.runtime();
    let zone_partitions = zones.partitions().to_vec();

    // Aggregate
    let aggregators: Vec<TaskFuture<A>> = zone_partitions
        .iter()
        .enumerate()
        .map(|(idx, partition)| {
            let values = values(idx);
            let zones = partition.data().clone();
            runtime.spawn(partition.locality(), async move {
                let zones = zones.await?;
                let values = values.await?;
                Ok(aggregate::<A, _, _>(&*values, &*zones))
            })
        })
        .collect();

    // Merge
    let merged: TaskFuture<A> = runtime.spawn(LocalityId::new(0), async move {
        let mut pending: FuturesUnordered<_> = aggregators.into_iter().collect();
        let mut merged = A::default();
        while let Some(aggregator) = pending.next().await {
            merged.merge(&*aggregator?);
        }
        Ok(merged)
    });

    // Apply
    let partitions = zone_partitions
        .into_iter()
        .map(|partition| {
            let merged = merged.clone();
            let zones = partition.data().clone();
            let data = runtime.spawn(partition.locality(), async move {
                let merged: Arc<A> = merged.await?;
                let zones = zones.await?;
                Ok(zones.map(|zone| {
                    merged
                        .statistic(zone)
                        .unwrap_or_else(|| panic!("zone {zone:?} was not aggregated"))
                }))
            });
            ArrayPartition::new(partition.locality(), *partition.offset(), *partition.shape(), data)
        })
        .collect();

    PartitionedArray::from_parts(
        *zones.shape(),
        *zones.partition_shape(),
        zones.localities().copy(),
        ArrayPartitionData::from_vec(*zones.shape_in_partitions(), partitions),
    )
}

/// Return an array where each cell holds the statistic of its zone over the cells of `values` in that zone.
///
/// See the [module documentation](self) for the protocol.
/// Output partitions are placed like the partitions of `zones`.
///
/// # Errors
/// Returns an [`ArrayError`] if `values` and `zones` differ in shape or are not partitioned alike.
pub fn zonal_operation<A: Aggregator, const R: usize>(
    ctx: &Context,
    values: &PartitionedArray<A::Value, R>,
    zones: &PartitionedArray<A::Zone, R>,
) -> Result<PartitionedArray<A::Output, R>, ArrayError> {
    if values.shape() != zones.shape() {
        return Err(ArrayError::incompatible_shape(values.shape(), zones.shape()));
    }
    if !values.is_partitioned_like(zones) {
        return Err(ArrayError::IncompatiblePartitions);
    }
    let value_partitions = values.partitions().to_vec();
    Ok(zonal_operation_impl::<A, _, R>(
        ctx,
        |idx| value_partitions[idx].data().clone(),
        zones,
    ))
}

/// Return an array where each cell holds the statistic of its zone, with `value` as the value of every cell.
#[must_use]
pub fn zonal_operation_scalar<A: Aggregator, const R: usize>(
    ctx: &Context,
    value: &ScalarData<A::Value>,
    zones: &PartitionedArray<A::Zone, R>,
) -> PartitionedArray<A::Output, R> {
    zonal_operation_impl::<A, _, R>(ctx, |_| TaskFuture::ready(value.share()), zones)
}
