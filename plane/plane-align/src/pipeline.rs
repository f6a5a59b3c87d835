//! Segment two clouds and estimate the rotation between them.

use std::borrow::Cow;

use nalgebra::Matrix3;
use plane_registration::{Alignment, CorrespondenceMode, RegistrationParams, RotationSolver};
use plane_segment::{segment, SegmentationParams};
use plane_types::{PointCloud, SegmentedPlane};
use tracing::info;

use crate::error::{AlignError, AlignResult};

/// Parameters of the whole pipeline.
///
/// # Example
///
/// ```
/// use plane_align::AlignParams;
///
/// let params = AlignParams::new().with_normal_k(20).with_descriptor(true);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlignParams {
    /// Neighbours used to estimate normals of clouds without them
    /// (default: 15).
    pub normal_k: usize,
    /// Region growing parameters, shared by both clouds.
    pub segmentation: SegmentationParams,
    /// Rotation estimation parameters.
    pub registration: RegistrationParams,
}

impl Default for AlignParams {
    fn default() -> Self {
        Self {
            normal_k: Self::DEFAULT_NORMAL_K,
            segmentation: SegmentationParams::default(),
            registration: RegistrationParams::default(),
        }
    }
}

impl AlignParams {
    /// Default neighbourhood size for normal estimation.
    pub const DEFAULT_NORMAL_K: usize = 15;

    /// Creates parameters with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the normal estimation neighbourhood.
    #[must_use]
    pub const fn with_normal_k(mut self, k: usize) -> Self {
        self.normal_k = k;
        self
    }

    /// Replaces the segmentation parameters.
    #[must_use]
    pub fn with_segmentation(mut self, params: SegmentationParams) -> Self {
        self.segmentation = params;
        self
    }

    /// Replaces the registration parameters.
    #[must_use]
    pub fn with_registration(mut self, params: RegistrationParams) -> Self {
        self.registration = params;
        self
    }

    /// Pairs planes through their descriptors instead of weighting every
    /// pair by normal distance.
    #[must_use]
    pub fn with_descriptor(mut self, enabled: bool) -> Self {
        self.registration.mode = if enabled {
            CorrespondenceMode::Descriptor
        } else {
            CorrespondenceMode::NormalDistance
        };
        self
    }

    /// Validates every stage's parameters.
    ///
    /// # Errors
    ///
    /// Returns the first stage error found.
    pub fn validate(&self) -> AlignResult<()> {
        if self.normal_k < 3 {
            return Err(AlignError::InvalidParameter(format!(
                "normal_k must be at least 3, got {}",
                self.normal_k
            )));
        }
        self.segmentation.validate()?;
        self.registration.validate()?;
        Ok(())
    }
}

/// Everything the pipeline found.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AlignmentReport {
    /// Planes segmented from the source cloud.
    pub source_planes: Vec<SegmentedPlane>,
    /// Planes segmented from the target cloud.
    pub target_planes: Vec<SegmentedPlane>,
    /// Estimated transform from source to target.
    pub alignment: Alignment,
}

impl AlignmentReport {
    /// The estimated rotation.
    #[must_use]
    pub const fn rotation(&self) -> &Matrix3<f64> {
        &self.alignment.rotation
    }
}

/// Returns the cloud ready for segmentation, estimating normals and
/// curvature with `k` neighbours when it lacks them.
///
/// # Errors
///
/// Returns [`AlignError::Types`] if the cloud is too small for `k`.
pub fn prepare_cloud(cloud: &PointCloud, k: usize) -> AlignResult<Cow<'_, PointCloud>> {
    if cloud.is_empty() || (cloud.has_normals() && cloud.has_curvature()) {
        return Ok(Cow::Borrowed(cloud));
    }
    let mut prepared = cloud.clone();
    prepared.estimate_normals(k)?;
    Ok(Cow::Owned(prepared))
}

/// Segments a prepared cloud. An empty cloud has no planes.
///
/// # Errors
///
/// Returns [`AlignError::Segment`] if segmentation cannot start.
pub fn segment_cloud(
    cloud: &PointCloud,
    params: &SegmentationParams,
) -> AlignResult<Vec<SegmentedPlane>> {
    if cloud.is_empty() {
        return Ok(Vec::new());
    }
    Ok(segment(cloud, params.clone())?)
}

/// Aligns `source` onto `target`: normals are estimated where missing,
/// both clouds are segmented into planes, plane surfaces are re-estimated
/// with the registration's surface method and the rotation between the
/// plane sets is estimated. An empty cloud yields the identity.
///
/// # Errors
///
/// Returns an error if a parameter is invalid, normal estimation fails or
/// the plane normals are degenerate.
pub fn align_clouds(
    source: &PointCloud,
    target: &PointCloud,
    params: &AlignParams,
) -> AlignResult<AlignmentReport> {
    params.validate()?;
    info!(
        source_points = source.len(),
        target_points = target.len(),
        "Aligning clouds"
    );

    let source = prepare_cloud(source, params.normal_k)?;
    let target = prepare_cloud(target, params.normal_k)?;

    let source_planes = segment_cloud(&source, &params.segmentation)?;
    let target_planes = segment_cloud(&target, &params.segmentation)?;

    let mut solver = RotationSolver::new(params.registration.clone())?;
    solver.set_clouds(source_planes, target_planes, false);
    solver.estimate_surfaces(&source, &target);
    let alignment = solver.find_alignment()?;

    info!(
        source_planes = solver.source_planes().len(),
        target_planes = solver.target_planes().len(),
        angle_deg = alignment.angle().to_degrees(),
        "Alignment finished"
    );

    Ok(AlignmentReport {
        source_planes: solver.source_planes().to_vec(),
        target_planes: solver.target_planes().to_vec(),
        alignment,
    })
}
