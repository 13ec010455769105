use std::sync::Arc;

use parking_lot::RwLock;
use parrs_shape::{Count, Index};

use super::{ArrayPartitionData, Element, PartitionData};

/// Rank 0 data: a single element.
///
/// Like [`ArrayPartitionData`], the element is reference counted and can be copied or shared.
/// Scalar data has an empty shape and cannot be reshaped.
pub struct ScalarData<T> {
    element: Arc<RwLock<T>>,
}

impl<T> ScalarData<T> {
    /// Create new scalar data holding `value`.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            element: Arc::new(RwLock::new(value)),
        }
    }

    /// Return a deep copy of the data.
    #[must_use]
    pub fn copy(&self) -> Self
    where
        T: Clone,
    {
        Self::new(self.element.read().clone())
    }

    /// Return a handle sharing the element of this data.
    #[must_use]
    pub fn share(&self) -> Self {
        Self {
            element: Arc::clone(&self.element),
        }
    }

    /// Returns true if this data and `other` share the same element.
    #[must_use]
    pub fn is_shared_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.element, &other.element)
    }

    /// Return the element.
    #[must_use]
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.element.read().clone()
    }

    /// Set the element to `value`.
    pub fn set(&mut self, value: T) {
        *self.element.write() = value;
    }
}

impl<T: Default> Default for ScalarData<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> From<T> for ScalarData<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: PartialEq> PartialEq for ScalarData<T> {
    fn eq(&self, other: &Self) -> bool {
        self.is_shared_with(other) || *self.element.read() == *other.element.read()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for ScalarData<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ScalarData").field(&*self.element.read()).finish()
    }
}

impl<T: Element> PartitionData for ScalarData<T> {
    type Element = T;

    fn shape(&self) -> &[u64] {
        &[]
    }

    fn nr_elements(&self) -> Count {
        1
    }

    fn get(&self, index: Index) -> T {
        assert_eq!(index, 0, "index {index} is out of bounds of a scalar");
        Self::get(self)
    }

    fn set(&mut self, index: Index, value: T) {
        assert_eq!(index, 0, "index {index} is out of bounds of a scalar");
        Self::set(self, value);
    }

    fn reshape(&mut self, shape: &[u64]) {
        panic!("scalar data cannot be reshaped to {shape:?}");
    }

    fn copy(&self) -> Self {
        Self::copy(self)
    }

    fn share(&self) -> Self {
        Self::share(self)
    }
}

impl<T: Element, const R: usize> PartitionData for ArrayPartitionData<T, R> {
    type Element = T;

    fn shape(&self) -> &[u64] {
        Self::shape(self)
    }

    fn nr_elements(&self) -> Count {
        Self::nr_elements(self)
    }

    fn get(&self, index: Index) -> T {
        Self::get(self, index)
    }

    fn set(&mut self, index: Index, value: T) {
        Self::set(self, index, value);
    }

    fn reshape(&mut self, shape: &[u64]) {
        let shape: [u64; R] = shape
            .try_into()
            .unwrap_or_else(|_| panic!("shape {shape:?} does not have rank {R}"));
        Self::reshape(self, shape);
    }

    fn copy(&self) -> Self {
        Self::copy(self)
    }

    fn share(&self) -> Self {
        Self::share(self)
    }
}
