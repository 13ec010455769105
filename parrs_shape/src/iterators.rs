//! Hyperslab iterators.
//!
//!  - [`Indices`]: the multidimensional indices of the elements in a hyperslab, serial or with [`rayon`].
//!  - [`LinearisedIndices`]: the linear indices of the elements in a hyperslab, relative to an enclosing array shape.
//!
//! These are created with [`Hyperslab::indices`](crate::Hyperslab::indices) and [`Hyperslab::linearised_indices`](crate::Hyperslab::linearised_indices).

mod indices_iterator;
mod linearised_indices_iterator;

pub use indices_iterator::{Indices, IndicesIterator, ParIndicesIterator};
pub use linearised_indices_iterator::{LinearisedIndices, LinearisedIndicesIterator};
