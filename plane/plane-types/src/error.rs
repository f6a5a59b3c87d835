//! Error types for point cloud and plane operations.

use thiserror::Error;

/// Result type for point cloud and plane operations.
pub type TypesResult<T> = Result<T, TypesError>;

/// Errors that can occur while loading, preparing or querying point clouds.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TypesError {
    /// Point cloud is empty.
    #[error("point cloud is empty")]
    EmptyPointCloud,

    /// Not enough points for the requested operation.
    #[error("insufficient points: need at least {required}, got {actual}")]
    InsufficientPoints {
        /// Minimum number of points required.
        required: usize,
        /// Actual number of points provided.
        actual: usize,
    },

    /// The operation needs per-point normals but the cloud has none.
    #[error("point cloud has no normals")]
    MissingNormals,

    /// Invalid parameter value.
    #[error("invalid parameter: {reason}")]
    InvalidParameter {
        /// Description of why the parameter is invalid.
        reason: String,
    },

    /// A line of a point cloud file could not be parsed.
    #[error("parse error on line {line}: {reason}")]
    Parse {
        /// One-based line number.
        line: usize,
        /// Description of the parsing error.
        reason: String,
    },

    /// Unsupported file format.
    #[error("unsupported format: {format}")]
    UnsupportedFormat {
        /// The format that was not supported.
        format: String,
    },

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
