use std::sync::Arc;

use parrs_shape::Shape;

use crate::array::{
    ArrayCreateError, ArrayError, ArrayPartition, ArrayPartitionData, Element, PartitionedArray,
};
use crate::config::Context;

/// Apply `f` to each element of `array`.
///
/// Each output partition is computed on the locality of the corresponding input partition.
#[must_use]
pub fn unary_local_operation<T, U, F, const R: usize>(
    ctx: &Context,
    array: &PartitionedArray<T, R>,
    f: F,
) -> PartitionedArray<U, R>
where
    T: Element,
    U: Element,
    F: Fn(&T) -> U + Send + Sync + 'static,
{
    let f = Arc::new(f);
    let partitions = array.partitions().map(|partition| {
        let f = Arc::clone(&f);
        partition.then(ctx.runtime(), move |data| data.map(|element| f(element)))
    });
    PartitionedArray::from_parts(
        *array.shape(),
        *array.partition_shape(),
        array.localities().copy(),
        partitions,
    )
}

/// Apply `f` to each pair of elements of `a` and `b`.
///
/// Each output partition is computed on the locality of the corresponding partition of `a`.
///
/// # Errors
/// Returns an [`ArrayError`] if `a` and `b` differ in shape or are not partitioned alike.
pub fn binary_local_operation<T1, T2, U, F, const R: usize>(
    ctx: &Context,
    a: &PartitionedArray<T1, R>,
    b: &PartitionedArray<T2, R>,
    f: F,
) -> Result<PartitionedArray<U, R>, ArrayError>
where
    T1: Element,
    T2: Element,
    U: Element,
    F: Fn(&T1, &T2) -> U + Send + Sync + 'static,
{
    if a.shape() != b.shape() {
        return Err(ArrayError::incompatible_shape(b.shape(), a.shape()));
    }
    if !a.is_partitioned_like(b) {
        return Err(ArrayError::IncompatiblePartitions);
    }
    let f = Arc::new(f);
    let b_partitions = b.partitions().to_vec();
    let partitions = a
        .partitions()
        .to_vec()
        .into_iter()
        .zip(b_partitions)
        .map(|(partition_a, partition_b)| {
            let f = Arc::clone(&f);
            let shape = *partition_a.shape();
            let (data_a, data_b) = (partition_a.data().clone(), partition_b.data().clone());
            let data = ctx.runtime().spawn(partition_a.locality(), async move {
                let data_a = data_a.await?;
                let data_b = data_b.await?;
                let elements_a = data_a.elements();
                let elements_b = data_b.elements();
                Ok(ArrayPartitionData::from_elements(
                    shape,
                    elements_a
                        .iter()
                        .zip(elements_b.iter())
                        .map(|(a, b)| f(a, b)),
                ))
            });
            ArrayPartition::new(partition_a.locality(), *partition_a.offset(), shape, data)
        })
        .collect();
    Ok(PartitionedArray::from_parts(
        *a.shape(),
        *a.partition_shape(),
        a.localities().copy(),
        ArrayPartitionData::from_vec(*a.shape_in_partitions(), partitions),
    ))
}

/// Return a deep copy of `array`: every partition of the result holds a copy of the data of the input partition.
#[must_use]
pub fn copy<T: Element, const R: usize>(ctx: &Context, array: &PartitionedArray<T, R>) -> PartitionedArray<T, R> {
    let partitions = array
        .partitions()
        .map(|partition| partition.then(ctx.runtime(), ArrayPartitionData::copy));
    PartitionedArray::from_parts(
        *array.shape(),
        *array.partition_shape(),
        array.localities().copy(),
        partitions,
    )
}

/// Create an array with `shape` in partitions of `partition_shape`, filled with `value`.
///
/// See [`PartitionedArray::create_with_value`].
///
/// # Errors
/// Returns an [`ArrayCreateError`] if the array cannot be created.
pub fn fill<T: Element, const R: usize>(
    ctx: &Context,
    shape: Shape<R>,
    partition_shape: Shape<R>,
    value: T,
) -> Result<PartitionedArray<T, R>, ArrayCreateError> {
    PartitionedArray::create_with_value(ctx, shape, partition_shape, value)
}
