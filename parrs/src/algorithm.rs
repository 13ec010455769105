//! Algorithms on partitioned arrays.
//!
//! Algorithms create a new [`PartitionedArray`](crate::array::PartitionedArray) with one partition per input
//! partition, each computed by a task on the locality of the input partition it reads.
//! Output arrays share the partition grid and placement of their inputs, so partitions of related arrays are co-located.
//!
//! - Local operations compute each output element from the input elements at the same position:
//!   [`unary_local_operation`], [`binary_local_operation`], [`copy`] and [`fill`].
//! - Zonal operations compute a statistic per zone with an [`Aggregator`]: [`zonal_operation`] and
//!   [`zonal_operation_scalar`], with reference statistics like [`zonal_sum`] and [`zonal_majority`].

mod aggregators;
mod local_operation;
mod zonal_operation;
mod zonal_statistics;

pub use aggregators::{Diversity, Majority, Maximum, Mean, Minimum, Sum};
pub use local_operation::{binary_local_operation, copy, fill, unary_local_operation};
pub use zonal_operation::{Aggregator, zonal_operation, zonal_operation_scalar};
pub use zonal_statistics::{
    zonal_area, zonal_diversity, zonal_majority, zonal_maximum, zonal_mean, zonal_minimum, zonal_sum,
};
