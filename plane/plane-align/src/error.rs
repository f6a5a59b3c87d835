//! Error type of the alignment pipeline.

use plane_registration::RegistrationError;
use plane_segment::SegmentError;
use plane_types::TypesError;
use thiserror::Error;

/// Any failure of [`align_clouds`](crate::align_clouds).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AlignError {
    /// Loading a cloud or estimating its normals failed.
    #[error(transparent)]
    Types(#[from] TypesError),

    /// Segmentation could not start.
    #[error(transparent)]
    Segment(#[from] SegmentError),

    /// Rotation estimation failed.
    #[error(transparent)]
    Registration(#[from] RegistrationError),

    /// Invalid pipeline parameter.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for pipeline operations.
pub type AlignResult<T> = Result<T, AlignError>;
