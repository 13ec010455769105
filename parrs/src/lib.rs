//! `parrs` is a Rust library for partitioned multidimensional arrays and partition-parallel algorithms.
//!
//! A [`PartitionedArray`](array::PartitionedArray) splits a rank `R` array into rectangular partitions.
//! Partitions are placed on the localities of a [`Runtime`](runtime::Runtime) and computed asynchronously:
//! each partition is the future result of a task, and tasks depending on other partitions await them instead of
//! blocking a thread.
//!
//! ## Getting Started
//! ```rust
//! # use parrs::array::PartitionedArray;
//! # use parrs::config::{Config, Context};
//! # use parrs::runtime::RuntimeOptions;
//! // A context holds the runtime and the configuration; there is no global state
//! let ctx = Context::new_with_options(&RuntimeOptions::default().with_nr_localities(2), Config::default())?;
//!
//! // A 9x9 array of ones in 3x3 partitions, and zones by row
//! let values = PartitionedArray::<u32, 2>::create_with_value(&ctx, [9, 9], [3, 3], 1)?;
//! let zones = PartitionedArray::from_elements(&ctx, [9, 9], (0..81).map(|i| i / 9).collect(), [3, 3])?;
//!
//! let sums = parrs::algorithm::zonal_sum(&ctx, &values, &zones)?;
//! assert!(sums.gather()?.to_vec().iter().all(|&sum| sum == 9));
//! ctx.shutdown();
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Crate Features
//! `parrs` is split into the following crates, which are re-exported:
//! - [`parrs_shape`] as [`shape`]: shapes, hyperslabs, cursors and partition grids.
//! - [`parrs_runtime`] as [`runtime`]: localities, tasks and placement policies.
//!
//! ## Logging
//! `parrs` logs information and errors using the [`log`](https://docs.rs/log/latest/log/) crate.
//! A suitable logging implementation (e.g. [`env_logger`](https://docs.rs/env_logger/latest/env_logger/)) must be
//! installed to see the messages.
//! The creation of arrays is logged at the debug level. A warning is logged when an array has fewer partitions than
//! there are localities.
//!
//! ## Licence
//! `parrs` is licensed under either of
//!  - the Apache License, Version 2.0 [LICENSE-APACHE](https://docs.rs/crate/parrs/latest/source/LICENCE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0> or
//!  - the MIT license [LICENSE-MIT](https://docs.rs/crate/parrs/latest/source/LICENCE-MIT) or <http://opensource.org/licenses/MIT>, at your option.

pub mod algorithm;
pub mod array;
pub mod config;

pub use parrs_runtime as runtime;
pub use parrs_shape as shape;
