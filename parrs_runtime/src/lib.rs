//! Localities, task dispatch and partition placement for the [`parrs`](https://docs.rs/parrs/latest/parrs/index.html) crate.
//!
//! A [`Runtime`] is an explicitly created set of [`Locality`]s. Each locality owns a pool of worker threads.
//! Work is dispatched to a locality as a task: an `async` block whose result is exposed as a [`TaskFuture`].
//! A task future can be awaited by any number of dependent tasks, so data dependencies between tasks are expressed by
//! awaiting their futures inside the dependent task. Awaiting suspends the task, it never blocks a worker thread.
//!
//! A [`PlacementPolicy`] maps the partitions of a partition grid to localities.
//!
//! ## Logging
//! `parrs_runtime` logs information and errors using the [`log`](https://docs.rs/log/latest/log/) crate.
//! Runtime start and shutdown are logged at the debug level, and every dispatched task at the trace level.
//!
//! ## Licence
//! `parrs_runtime` is licensed under either of
//!  - the Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> or
//!  - the MIT license <http://opensource.org/licenses/MIT>, at your option.

mod locality;
mod options;
mod placement;
mod runtime;
mod task;

pub use locality::{Locality, LocalityId};
pub use options::RuntimeOptions;
pub use placement::{
    Blocked, HilbertCurve, Placement, PlacementError, PlacementPolicy, RoundRobin,
};
pub use runtime::{Runtime, RuntimeCreateError};
pub use task::{TaskError, TaskFuture, TaskResult, try_join_all};
