use parrs_runtime::{LocalityId, Runtime, TaskFuture, TaskResult};
use parrs_shape::{nr_elements, Count, Hyperslab, Offset, Shape};

use super::ArrayPartitionData;

/// A handle to a partition of a [`PartitionedArray`](super::PartitionedArray).
///
/// The data of a partition is computed asynchronously on its locality.
/// The offset and shape of a partition are known eagerly, before its data is ready.
pub struct ArrayPartition<T, const R: usize> {
    locality: LocalityId,
    offset: Offset<R>,
    shape: Shape<R>,
    data: TaskFuture<ArrayPartitionData<T, R>>,
}

impl<T, const R: usize> Clone for ArrayPartition<T, R> {
    fn clone(&self) -> Self {
        Self {
            locality: self.locality,
            offset: self.offset,
            shape: self.shape,
            data: self.data.clone(),
        }
    }
}

impl<T, const R: usize> std::fmt::Debug for ArrayPartition<T, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArrayPartition")
            .field("locality", &self.locality)
            .field("offset", &self.offset)
            .field("shape", &self.shape)
            .field("data", &self.data)
            .finish()
    }
}

impl<T, const R: usize> ArrayPartition<T, R> {
    /// Return the locality the partition is computed and stored on.
    #[must_use]
    pub fn locality(&self) -> LocalityId {
        self.locality
    }

    /// Return the offset of the first element of the partition within the array.
    #[must_use]
    pub fn offset(&self) -> &Offset<R> {
        &self.offset
    }

    /// Return the shape of the partition.
    #[must_use]
    pub fn shape(&self) -> &Shape<R> {
        &self.shape
    }

    /// Return the number of elements of the partition.
    #[must_use]
    pub fn nr_elements(&self) -> Count {
        nr_elements(&self.shape)
    }

    /// Return the region of the array covered by the partition.
    #[must_use]
    pub fn hyperslab(&self) -> Hyperslab<R> {
        Hyperslab::new_with_start_count(self.offset, self.shape)
    }

    /// Return the future to the data of the partition.
    #[must_use]
    pub fn data(&self) -> &TaskFuture<ArrayPartitionData<T, R>> {
        &self.data
    }

    /// Returns true if the data of the partition is available.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.data.is_ready()
    }
}

impl<T: Send + Sync + 'static, const R: usize> ArrayPartition<T, R> {
    /// Create a new partition handle.
    ///
    /// `shape` must be the shape `data` resolves to.
    #[must_use]
    pub fn new(
        locality: LocalityId,
        offset: Offset<R>,
        shape: Shape<R>,
        data: TaskFuture<ArrayPartitionData<T, R>>,
    ) -> Self {
        Self {
            locality,
            offset,
            shape,
            data,
        }
    }

    /// Create a partition handle to `data` that is already available.
    #[must_use]
    pub fn ready(locality: LocalityId, offset: Offset<R>, data: ArrayPartitionData<T, R>) -> Self {
        Self::new(locality, offset, *data.shape(), TaskFuture::ready(data))
    }

    /// Block until the data of the partition is available and return it.
    ///
    /// # Errors
    /// Returns the [`TaskError`](parrs_runtime::TaskError) of the task computing the partition.
    pub fn wait(&self) -> TaskResult<ArrayPartitionData<T, R>> {
        self.data.wait()
    }

    /// Return a partition of the same shape computed from this one by `f` on the same locality.
    ///
    /// See [`then_reshaped`](ArrayPartition::then_reshaped).
    ///
    /// # Panics
    /// Panics if the locality of this partition is not part of `runtime`.
    #[must_use]
    pub fn then<U, F>(&self, runtime: &Runtime, f: F) -> ArrayPartition<U, R>
    where
        U: Send + Sync + 'static,
        F: FnOnce(&ArrayPartitionData<T, R>) -> ArrayPartitionData<U, R> + Send + 'static,
    {
        self.then_reshaped(runtime, self.shape, f)
    }

    /// Return a partition of `shape` computed from this one by `f` on the same locality.
    ///
    /// # Panics
    /// Panics if the locality of this partition is not part of `runtime`.
    ///
    /// The returned partition fails with a [`TaskError::Panicked`](parrs_runtime::TaskError::Panicked) if `f` does not
    /// return data of `shape`.
    #[must_use]
    pub fn then_reshaped<U, F>(&self, runtime: &Runtime, shape: Shape<R>, f: F) -> ArrayPartition<U, R>
    where
        U: Send + Sync + 'static,
        F: FnOnce(&ArrayPartitionData<T, R>) -> ArrayPartitionData<U, R> + Send + 'static,
    {
        let input = self.data.clone();
        let data = runtime.spawn(self.locality, async move {
            let input = input.await?;
            let output = f(&input);
            assert_eq!(
                output.shape(),
                &shape,
                "partition data of shape {:?} does not match the partition shape {shape:?}",
                output.shape()
            );
            Ok(output)
        });
        ArrayPartition::new(self.locality, self.offset, shape, data)
    }
}

#[cfg(test)]
mod tests {
    use parrs_runtime::{RuntimeOptions, TaskError};

    use super::*;

    fn runtime() -> Runtime {
        Runtime::new(
            &RuntimeOptions::default()
                .with_nr_localities(2)
                .with_nr_threads_per_locality(1),
        )
        .unwrap()
    }

    #[test]
    fn partition_then() {
        let runtime = runtime();
        let partition = ArrayPartition::ready(
            LocalityId::new(1),
            [4, 0],
            ArrayPartitionData::from_vec([2, 2], vec![1, 2, 3, 4]),
        );
        assert!(partition.is_ready());
        assert_eq!(partition.hyperslab().to_ranges(), [4..6, 0..2]);

        let doubled = partition.then(&runtime, |data| data.map(|v| v * 2));
        assert_eq!(doubled.locality(), LocalityId::new(1));
        assert_eq!(doubled.offset(), &[4, 0]);
        assert_eq!(doubled.wait().unwrap().to_vec(), vec![2, 4, 6, 8]);

        let shrunk = partition.then_reshaped(&runtime, [1, 2], |data| {
            let mut data = data.share();
            data.reshape([1, 2]);
            data
        });
        assert_eq!(shrunk.nr_elements(), 2);
        assert_eq!(shrunk.wait().unwrap().to_vec(), vec![1, 2]);
        assert_eq!(partition.wait().unwrap().shape(), &[2, 2]);
    }

    #[test]
    fn partition_ready_without_wait() {
        let runtime = runtime();
        let data = runtime.spawn(LocalityId::new(0), async {
            Ok(ArrayPartitionData::from_vec([3], vec![7u16, 8, 9]))
        });
        let partition = ArrayPartition::new(LocalityId::new(0), [3], [3], data);
        let doubled = partition.then(&runtime, |data| data.map(|v| v * 2));
        let mut polls = 0;
        while !doubled.is_ready() {
            assert!(polls < 1000, "partition did not become ready");
            polls += 1;
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        assert!(partition.is_ready());
        assert_eq!(doubled.wait().unwrap().to_vec(), vec![14, 16, 18]);
    }

    #[test]
    fn partition_then_shape_mismatch() {
        let runtime = runtime();
        let partition = ArrayPartition::ready(
            LocalityId::new(0),
            [0],
            ArrayPartitionData::from_vec([2], vec![1u8, 2]),
        );
        let wrong = partition.then(&runtime, |data| data.slice(&[0..1]));
        assert!(matches!(
            wrong.wait(),
            Err(TaskError::Panicked { message, .. }) if message.contains("does not match the partition shape")
        ));
        // Dependents observe the same failure
        let dependent = wrong.then(&runtime, ArrayPartitionData::copy);
        assert!(matches!(dependent.wait(), Err(TaskError::Panicked { .. })));
    }
}
