use parrs_runtime::{PlacementError, TaskError};
use parrs_shape::{IndexerError, PartitionGridError};
use thiserror::Error;

/// A partitioned array creation error.
#[derive(Clone, Debug, Error)]
pub enum ArrayCreateError {
    /// The partition shape is invalid.
    #[error(transparent)]
    InvalidPartitionShape(#[from] PartitionGridError),
    /// The placement policy produced an invalid placement.
    #[error(transparent)]
    PlacementError(#[from] PlacementError),
    /// The data does not match the array shape.
    #[error(transparent)]
    IndexerError(#[from] IndexerError),
    /// The created array is invalid.
    #[error(transparent)]
    ArrayError(#[from] ArrayError),
}

/// A partitioned array error.
#[derive(Clone, Debug, Error)]
pub enum ArrayError {
    /// A task computing a partition failed.
    #[error(transparent)]
    TaskError(#[from] TaskError),
    /// Indices are outside of a shape.
    #[error(transparent)]
    IndexerError(#[from] IndexerError),
    /// Array shapes do not match.
    #[error("incompatible array shape {got:?}, expected {expected:?}")]
    IncompatibleShape {
        /// The shape.
        got: Vec<u64>,
        /// The expected shape.
        expected: Vec<u64>,
    },
    /// Arrays of the same shape are not partitioned alike.
    #[error("arrays are not partitioned alike")]
    IncompatiblePartitions,
    /// The partitions do not tile the array.
    #[error("invalid tiling: {_0}")]
    InvalidTiling(String),
}

impl ArrayError {
    pub(crate) fn incompatible_shape(got: &[u64], expected: &[u64]) -> Self {
        Self::IncompatibleShape {
            got: got.to_vec(),
            expected: expected.to_vec(),
        }
    }
}
