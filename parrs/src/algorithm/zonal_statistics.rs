use std::hash::Hash;
use std::ops::AddAssign;

use num::ToPrimitive;

use super::{
    Diversity, Majority, Maximum, Mean, Minimum, Sum, zonal_operation, zonal_operation_scalar,
};
use crate::array::{ArrayError, Element, PartitionedArray, ScalarData};
use crate::config::Context;

/// Return the sum of `values` per zone of `zones`.
///
/// # Errors
/// Returns an [`ArrayError`] if `values` and `zones` differ in shape or are not partitioned alike.
pub fn zonal_sum<Z, V, const R: usize>(
    ctx: &Context,
    values: &PartitionedArray<V, R>,
    zones: &PartitionedArray<Z, R>,
) -> Result<PartitionedArray<V, R>, ArrayError>
where
    Z: Element + Eq + Hash,
    V: Element + AddAssign,
{
    zonal_operation::<Sum<Z, V>, R>(ctx, values, zones)
}

/// Return the mean of `values` per zone of `zones`.
///
/// # Errors
/// Returns an [`ArrayError`] if `values` and `zones` differ in shape or are not partitioned alike.
pub fn zonal_mean<Z, V, const R: usize>(
    ctx: &Context,
    values: &PartitionedArray<V, R>,
    zones: &PartitionedArray<Z, R>,
) -> Result<PartitionedArray<f64, R>, ArrayError>
where
    Z: Element + Eq + Hash,
    V: Element + ToPrimitive,
{
    zonal_operation::<Mean<Z, V>, R>(ctx, values, zones)
}

/// Return the minimum of `values` per zone of `zones`.
///
/// # Errors
/// Returns an [`ArrayError`] if `values` and `zones` differ in shape or are not partitioned alike.
pub fn zonal_minimum<Z, V, const R: usize>(
    ctx: &Context,
    values: &PartitionedArray<V, R>,
    zones: &PartitionedArray<Z, R>,
) -> Result<PartitionedArray<V, R>, ArrayError>
where
    Z: Element + Eq + Hash,
    V: Element + PartialOrd,
{
    zonal_operation::<Minimum<Z, V>, R>(ctx, values, zones)
}

/// Return the maximum of `values` per zone of `zones`.
///
/// # Errors
/// Returns an [`ArrayError`] if `values` and `zones` differ in shape or are not partitioned alike.
pub fn zonal_maximum<Z, V, const R: usize>(
    ctx: &Context,
    values: &PartitionedArray<V, R>,
    zones: &PartitionedArray<Z, R>,
) -> Result<PartitionedArray<V, R>, ArrayError>
where
    Z: Element + Eq + Hash,
    V: Element + PartialOrd,
{
    zonal_operation::<Maximum<Z, V>, R>(ctx, values, zones)
}

/// Return the most frequent value of `values` per zone of `zones`, the larger value on ties.
///
/// # Errors
/// Returns an [`ArrayError`] if `values` and `zones` differ in shape or are not partitioned alike.
pub fn zonal_majority<Z, V, const R: usize>(
    ctx: &Context,
    values: &PartitionedArray<V, R>,
    zones: &PartitionedArray<Z, R>,
) -> Result<PartitionedArray<V, R>, ArrayError>
where
    Z: Element + Eq + Hash,
    V: Element + Eq + Hash + Ord,
{
    zonal_operation::<Majority<Z, V>, R>(ctx, values, zones)
}

/// Return the number of distinct values of `values` per zone of `zones`.
///
/// # Errors
/// Returns an [`ArrayError`] if `values` and `zones` differ in shape or are not partitioned alike.
pub fn zonal_diversity<Z, V, const R: usize>(
    ctx: &Context,
    values: &PartitionedArray<V, R>,
    zones: &PartitionedArray<Z, R>,
) -> Result<PartitionedArray<u64, R>, ArrayError>
where
    Z: Element + Eq + Hash,
    V: Element + Eq + Hash,
{
    zonal_operation::<Diversity<Z, V>, R>(ctx, values, zones)
}

/// Return the number of cells per zone of `zones`.
#[must_use]
pub fn zonal_area<Z, const R: usize>(ctx: &Context, zones: &PartitionedArray<Z, R>) -> PartitionedArray<u64, R>
where
    Z: Element + Eq + Hash,
{
    zonal_operation_scalar::<Sum<Z, u64>, R>(ctx, &ScalarData::new(1), zones)
}
