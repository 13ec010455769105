use std::ops::Range;
use std::sync::Arc;

use parking_lot::{MappedRwLockReadGuard, MappedRwLockWriteGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use parrs_shape::{
    linear_index, nr_elements, visit_cells, Count, Hyperslab, Index, IndexerError, Indices, Shape,
};

/// The data of a partition: a rank `R` buffer of elements stored contiguously in row-major order.
///
/// The element buffer is reference counted.
/// A buffer is either deep-copied with [`copy`](ArrayPartitionData::copy), resulting in an independent buffer,
/// or aliased with [`share`](ArrayPartitionData::share), after which a mutation through one handle is visible through the other.
/// Code that hands out a shared buffer must not mutate it afterwards: mutation always targets a copied buffer.
///
/// Rank 0 data is represented by [`ScalarData`](super::ScalarData).
pub struct ArrayPartitionData<T, const R: usize> {
    shape: Shape<R>,
    elements: Arc<RwLock<Vec<T>>>,
}

impl<T, const R: usize> ArrayPartitionData<T, R> {
    const RANK_CHECK: () = assert!(R > 0, "rank 0 partition data must be represented by ScalarData");

    fn new_unchecked(shape: Shape<R>, elements: Vec<T>) -> Self {
        let () = Self::RANK_CHECK;
        Self {
            shape,
            elements: Arc::new(RwLock::new(elements)),
        }
    }

    /// Create partition data from `elements` in row-major order.
    ///
    /// # Errors
    /// Returns [`IndexerError::IncompatibleLength`] if the number of elements does not match `shape`.
    pub fn try_from_vec(shape: Shape<R>, elements: Vec<T>) -> Result<Self, IndexerError> {
        let expected = nr_elements(&shape);
        if elements.len() as u64 == expected {
            Ok(Self::new_unchecked(shape, elements))
        } else {
            Err(IndexerError::IncompatibleLength(elements.len() as u64, expected))
        }
    }

    /// Create partition data from `elements` in row-major order.
    ///
    /// # Panics
    /// Panics if the number of elements does not match `shape`.
    #[must_use]
    pub fn from_vec(shape: Shape<R>, elements: Vec<T>) -> Self {
        match Self::try_from_vec(shape, elements) {
            Ok(data) => data,
            Err(err) => panic!("{err}"),
        }
    }

    /// Create partition data by moving in `elements` in row-major order.
    ///
    /// # Panics
    /// Panics if the number of elements does not match `shape`.
    #[must_use]
    pub fn from_elements(shape: Shape<R>, elements: impl IntoIterator<Item = T>) -> Self {
        Self::from_vec(shape, elements.into_iter().collect())
    }

    /// Create partition data with `shape` filled with the default element.
    ///
    /// # Panics
    /// Panics if the number of elements of `shape` exceeds [`usize::MAX`].
    #[must_use]
    pub fn new(shape: Shape<R>) -> Self
    where
        T: Default,
    {
        let mut elements = Vec::new();
        elements.resize_with(to_usize(nr_elements(&shape)), T::default);
        Self::new_unchecked(shape, elements)
    }

    /// Create partition data with `shape` filled with `value`.
    ///
    /// # Panics
    /// Panics if the number of elements of `shape` exceeds [`usize::MAX`].
    #[must_use]
    pub fn new_with_value(shape: Shape<R>, value: T) -> Self
    where
        T: Clone,
    {
        Self::new_unchecked(shape, vec![value; to_usize(nr_elements(&shape))])
    }

    /// Return a deep copy of the data. The copy does not alias this buffer.
    #[must_use]
    pub fn copy(&self) -> Self
    where
        T: Clone,
    {
        Self::new_unchecked(self.shape, self.elements.read().clone())
    }

    /// Return a handle sharing the element buffer of this data.
    #[must_use]
    pub fn share(&self) -> Self {
        Self {
            shape: self.shape,
            elements: Arc::clone(&self.elements),
        }
    }

    /// Returns true if this data and `other` share the same element buffer.
    #[must_use]
    pub fn is_shared_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.elements, &other.elements)
    }

    /// Return the shape.
    #[must_use]
    pub fn shape(&self) -> &Shape<R> {
        &self.shape
    }

    /// Return the number of elements.
    #[must_use]
    pub fn nr_elements(&self) -> Count {
        nr_elements(&self.shape)
    }

    /// Returns true if the data has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nr_elements() == 0
    }

    /// Return a read guard over the elements in row-major order.
    #[must_use]
    pub fn elements(&self) -> MappedRwLockReadGuard<'_, [T]> {
        RwLockReadGuard::map(self.elements.read(), Vec::as_slice)
    }

    /// Return a write guard over the elements in row-major order.
    ///
    /// Writes are visible through every handle sharing this buffer.
    #[must_use]
    pub fn elements_mut(&mut self) -> MappedRwLockWriteGuard<'_, [T]> {
        RwLockWriteGuard::map(self.elements.write(), Vec::as_mut_slice)
    }

    /// Return the element at linear `index`.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn get(&self, index: Index) -> T
    where
        T: Clone,
    {
        let elements = self.elements.read();
        elements
            .get(to_usize(index))
            .unwrap_or_else(|| panic!("index {index} is out of bounds of {} elements", elements.len()))
            .clone()
    }

    /// Return the element at `indices`.
    ///
    /// # Panics
    /// Panics if `indices` are outside of the shape.
    #[must_use]
    pub fn get_nd(&self, indices: &Indices<R>) -> T
    where
        T: Clone,
    {
        self.get(linear_index(indices, &self.shape))
    }

    /// Set the element at linear `index` to `value`.
    ///
    /// # Panics
    /// Panics if `index` is out of bounds.
    pub fn set(&mut self, index: Index, value: T) {
        let mut elements = self.elements.write();
        let nr_elements = elements.len();
        *elements
            .get_mut(to_usize(index))
            .unwrap_or_else(|| panic!("index {index} is out of bounds of {nr_elements} elements")) = value;
    }

    /// Set the element at `indices` to `value`.
    ///
    /// # Panics
    /// Panics if `indices` are outside of the shape.
    pub fn set_nd(&mut self, indices: &Indices<R>, value: T) {
        self.set(linear_index(indices, &self.shape), value);
    }

    /// Set every element to `value`.
    pub fn fill(&mut self, value: T)
    where
        T: Clone,
    {
        self.elements.write().fill(value);
    }

    /// Call `f` with every element in row-major order.
    pub fn for_each(&self, f: impl FnMut(&T)) {
        self.elements.read().iter().for_each(f);
    }

    /// Return the elements in row-major order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.elements.read().clone()
    }

    /// Return new data of the same shape with `f` applied to each element.
    #[must_use]
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> ArrayPartitionData<U, R> {
        ArrayPartitionData::new_unchecked(self.shape, self.elements.read().iter().map(f).collect())
    }

    /// Return a copy of the elements within `ranges`, one per dimension.
    ///
    /// # Panics
    /// Panics if a range is not within `0..shape[d]` of its dimension `d`.
    #[must_use]
    pub fn slice(&self, ranges: &[Range<u64>; R]) -> Self
    where
        T: Clone,
    {
        let hyperslab = Hyperslab::new_with_ranges(ranges);
        let indices = match hyperslab.linearised_indices(&self.shape) {
            Ok(indices) => indices,
            Err(_) => panic!("slice {hyperslab} is not within shape {:?}", self.shape),
        };
        let elements = self.elements.read();
        Self::new_unchecked(
            *hyperslab.count(),
            indices
                .iter()
                .map(|index| elements[to_usize(index)].clone())
                .collect(),
        )
    }

    /// Reshape the data to `shape`, filling new cells with the default element.
    ///
    /// See [`reshape_with`](ArrayPartitionData::reshape_with).
    pub fn reshape(&mut self, shape: Shape<R>)
    where
        T: Clone + Default,
    {
        self.reshape_with(shape, T::default());
    }

    /// Reshape the data to `shape`, filling new cells with `fill`.
    ///
    /// Elements within the overlap of the current and the new shape keep their value.
    /// Reshaping to the current shape is a no-op.
    /// Otherwise the data gets a new element buffer: handles previously sharing the buffer are not affected.
    pub fn reshape_with(&mut self, shape: Shape<R>, fill: T)
    where
        T: Clone,
    {
        if shape == self.shape {
            return;
        }
        let mut reshaped = vec![fill; to_usize(nr_elements(&shape))];
        let overlap = Hyperslab::new_with_shape(self.shape).overlap(&Hyperslab::new_with_shape(shape));
        {
            let elements = self.elements.read();
            visit_cells(self.shape, &overlap, |cursor| {
                let target = linear_index(cursor.current_cell(), &shape);
                reshaped[to_usize(target)] = elements[to_usize(cursor.linear_idx())].clone();
            });
        }
        *self = Self::new_unchecked(shape, reshaped);
    }

    /// Remove the layers `begin..end` along `dimension`.
    ///
    /// The data gets a new element buffer.
    ///
    /// # Panics
    /// Panics if `dimension` is not less than `R` or `begin..end` is not within the extent of `dimension`.
    pub fn erase(&mut self, dimension: usize, begin: Index, end: Index)
    where
        T: Clone,
    {
        assert!(dimension < R, "dimension {dimension} is out of bounds for rank {R}");
        assert!(
            begin <= end && end <= self.shape[dimension],
            "layers {begin}..{end} are not within extent {} of dimension {dimension}",
            self.shape[dimension]
        );
        let mut shape = self.shape;
        shape[dimension] -= end - begin;
        let elements = {
            let elements = self.elements.read();
            Hyperslab::new_with_shape(self.shape)
                .indices()
                .into_iter()
                .zip(elements.iter())
                .filter(|(indices, _)| !(begin..end).contains(&indices[dimension]))
                .map(|(_, element)| element.clone())
                .collect()
        };
        *self = Self::new_unchecked(shape, elements);
    }
}

impl<T: PartialEq, const R: usize> PartialEq for ArrayPartitionData<T, R> {
    fn eq(&self, other: &Self) -> bool {
        self.shape == other.shape
            && (self.is_shared_with(other) || *self.elements.read() == *other.elements.read())
    }
}

impl<T: std::fmt::Debug, const R: usize> std::fmt::Debug for ArrayPartitionData<T, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArrayPartitionData")
            .field("shape", &self.shape)
            .field("elements", &*self.elements.read())
            .finish()
    }
}

/// Convert an element count or linear index to [`usize`].
///
/// # Panics
/// Panics if `value` exceeds [`usize::MAX`].
fn to_usize(value: u64) -> usize {
    usize::try_from(value).unwrap_or_else(|_| panic!("{value} exceeds usize::MAX"))
}
