use std::future::Future;

use thiserror::Error;

use crate::{
    Locality, LocalityId, PlacementError, PlacementPolicy, RuntimeOptions, TaskError, TaskFuture,
};

/// A runtime creation error.
#[derive(Clone, Debug, Error)]
pub enum RuntimeCreateError {
    /// The number of localities is zero.
    #[error("a runtime needs at least one locality")]
    ZeroLocalities,
    /// The number of threads per locality is zero.
    #[error("a locality needs at least one thread")]
    ZeroThreads,
    /// A thread pool could not be created.
    #[error("failed to create the thread pool of {locality}: {message}")]
    ThreadPool {
        /// The locality.
        locality: LocalityId,
        /// The underlying error message.
        message: String,
    },
}

/// The runtime: a set of localities tasks can be dispatched to.
///
/// A runtime is explicitly created with [`Runtime::new`] and shut down with [`Runtime::shutdown`] or by dropping it.
/// Tasks that are still in flight at shutdown run to completion; the worker threads exit once no task remains.
#[derive(Debug)]
pub struct Runtime {
    localities: Vec<Locality>,
}

impl Runtime {
    /// Create a new runtime.
    ///
    /// # Errors
    /// Returns a [`RuntimeCreateError`] if there are no localities, no threads per locality, or a thread pool cannot be created.
    pub fn new(options: &RuntimeOptions) -> Result<Self, RuntimeCreateError> {
        let nr_localities = options.nr_localities();
        let nr_threads = options.nr_threads_per_locality();
        if nr_localities == 0 {
            return Err(RuntimeCreateError::ZeroLocalities);
        }
        if nr_threads == 0 {
            return Err(RuntimeCreateError::ZeroThreads);
        }
        let localities = (0..nr_localities)
            .map(|idx| Locality::new(LocalityId::new(idx), nr_threads, options.thread_name_prefix()))
            .collect::<Result<Vec<_>, _>>()?;
        log::debug!("started runtime with {nr_localities} localities of {nr_threads} threads");
        Ok(Self { localities })
    }

    /// Return the number of localities.
    #[must_use]
    pub fn nr_localities(&self) -> usize {
        self.localities.len()
    }

    /// Return the localities.
    #[must_use]
    pub fn localities(&self) -> &[Locality] {
        &self.localities
    }

    /// Return the locality with `id`, or [`None`] if the runtime has no such locality.
    #[must_use]
    pub fn locality(&self, id: LocalityId) -> Option<&Locality> {
        self.localities.get(id.index())
    }

    /// Dispatch `task` to the locality with `id`.
    ///
    /// See [`Locality::spawn`].
    ///
    /// # Panics
    /// Panics if the runtime has no locality with `id`.
    pub fn spawn<T, F>(&self, id: LocalityId, task: F) -> TaskFuture<T>
    where
        T: Send + Sync + 'static,
        F: Future<Output = Result<T, TaskError>> + Send + 'static,
    {
        self.locality(id)
            .unwrap_or_else(|| panic!("unknown {id}, the runtime has {} localities", self.nr_localities()))
            .spawn(task)
    }

    /// Place the partitions of a grid with `shape_in_partitions` on the localities of this runtime.
    ///
    /// # Errors
    /// Returns a [`PlacementError`] if `policy` does not produce exactly one known locality per partition.
    pub fn place(
        &self,
        policy: &dyn PlacementPolicy,
        shape_in_partitions: &[u64],
    ) -> Result<Vec<LocalityId>, PlacementError> {
        let nr_localities = self.nr_localities();
        let placement = policy.place(shape_in_partitions, nr_localities);
        let expected = shape_in_partitions.iter().product::<u64>();
        if placement.len() as u64 != expected {
            return Err(PlacementError::IncompatibleLength {
                got: placement.len(),
                expected: usize::try_from(expected).unwrap_or(usize::MAX),
            });
        }
        placement
            .into_iter()
            .map(|locality| {
                if locality < nr_localities {
                    Ok(LocalityId::new(locality))
                } else {
                    Err(PlacementError::UnknownLocality {
                        locality,
                        nr_localities,
                    })
                }
            })
            .collect()
    }

    /// Shut the runtime down.
    pub fn shutdown(self) {
        drop(self);
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        log::debug!("shutting down runtime with {} localities", self.localities.len());
    }
}
