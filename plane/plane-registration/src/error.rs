//! Error types for plane registration.

use thiserror::Error;

/// Errors that can occur while estimating a rotation from plane sets.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RegistrationError {
    /// The weighted normal covariance carries no orientation information.
    #[error("degenerate plane configuration: {reason}")]
    DegenerateGeometry {
        /// What made the configuration degenerate.
        reason: String,
    },

    /// An external weight matrix does not match the plane sets.
    #[error("weight matrix is {rows}x{cols}, expected {expected_rows}x{expected_cols}")]
    DimensionMismatch {
        /// Number of target planes.
        expected_rows: usize,
        /// Number of source planes.
        expected_cols: usize,
        /// Rows of the supplied matrix.
        rows: usize,
        /// Columns of the supplied matrix.
        cols: usize,
    },

    /// SVD computation failed during rotation estimation.
    #[error("SVD computation failed during rotation estimation")]
    SvdFailed,

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for registration operations.
pub type RegistrationResult<T> = Result<T, RegistrationError>;
