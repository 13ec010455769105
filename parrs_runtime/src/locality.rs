use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use derive_more::{Display, From};
use futures::FutureExt;
use futures::channel::oneshot;
use futures::executor::ThreadPool;

use crate::{RuntimeCreateError, TaskError, TaskFuture};

/// The identifier of a locality.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Display, From)]
#[display("locality {_0}")]
pub struct LocalityId(usize);

impl LocalityId {
    /// Create a new locality identifier.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Return the index of the locality within its runtime.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A placement target for partitions and the tasks computing them.
///
/// Each locality owns a thread pool. A task dispatched to a locality runs on one of its threads only.
#[derive(Debug)]
pub struct Locality {
    id: LocalityId,
    nr_threads: usize,
    pool: ThreadPool,
}

impl Locality {
    pub(crate) fn new(
        id: LocalityId,
        nr_threads: usize,
        thread_name_prefix: &str,
    ) -> Result<Self, RuntimeCreateError> {
        let pool = ThreadPool::builder()
            .pool_size(nr_threads)
            .name_prefix(format!("{thread_name_prefix}-{}-", id.index()))
            .create()
            .map_err(|err| RuntimeCreateError::ThreadPool {
                locality: id,
                message: err.to_string(),
            })?;
        Ok(Self {
            id,
            nr_threads,
            pool,
        })
    }

    /// Return the identifier of the locality.
    #[must_use]
    pub fn id(&self) -> LocalityId {
        self.id
    }

    /// Return the number of worker threads of the locality.
    #[must_use]
    pub fn nr_threads(&self) -> usize {
        self.nr_threads
    }

    /// Dispatch `task` to run on this locality and return a future to its result.
    ///
    /// Dependencies of the task are awaited inside it, so waiting never blocks a worker thread.
    /// A panic inside the task resolves the returned future to [`TaskError::Panicked`].
    /// If the task resolves to an error (e.g. a failed dependency propagated with `?`), so does the returned future.
    pub fn spawn<T, F>(&self, task: F) -> TaskFuture<T>
    where
        T: Send + Sync + 'static,
        F: Future<Output = Result<T, TaskError>> + Send + 'static,
    {
        let (sender, receiver) = oneshot::channel();
        let id = self.id;
        log::trace!("dispatching task to {id}");
        self.pool.spawn_ok(async move {
            let result = match AssertUnwindSafe(task).catch_unwind().await {
                Ok(result) => result.map(Arc::new),
                Err(payload) => Err(TaskError::from_panic(id, payload.as_ref())),
            };
            // The result is dropped if nothing waits for it
            let _ = sender.send(result);
        });
        TaskFuture::new(receiver.map(|result| result.unwrap_or(Err(TaskError::Canceled))))
    }
}
