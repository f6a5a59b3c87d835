//! Error types for plane segmentation.

use plane_types::TypesError;
use thiserror::Error;

/// Errors that prevent a segmentation run from starting.
///
/// Regions that fail a planarity or size check are not errors; they are
/// reported as [`GrowthOutcome::Rejected`](crate::GrowthOutcome::Rejected).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SegmentError {
    /// Invalid parameters, or engine inputs that do not fit together.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Error from the underlying point cloud types.
    #[error(transparent)]
    Types(#[from] TypesError),
}

/// Result type for segmentation operations.
pub type SegmentResult<T> = Result<T, SegmentError>;
