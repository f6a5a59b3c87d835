//! Rotation estimation between two segmented plane sets.

use std::borrow::Cow;

use nalgebra::{DMatrix, Vector3};
use plane_types::{estimate_planes_surface, Observer, PointCloud, SegmentedPlane, SharedObserver};
use tracing::{debug, info, warn};

use crate::alignment::Alignment;
use crate::error::{RegistrationError, RegistrationResult};
use crate::events::{pair_color, RegistrationEvent};
use crate::filter::select_planes;
use crate::params::{CorrespondenceMode, RegistrationParams};
use crate::rotation::rotation_from_covariance;
use crate::weights::{descriptor_weights, normal_distance_weights, weighted_covariance};

/// Estimates the rotation taking a source plane set onto a target plane set.
///
/// Each plane contributes its normal. The normals are combined into a
/// weighted covariance `H = Σ M(i,j) n_source_j n_target_iᵀ` and the
/// rotation follows from its SVD. Translation is not estimated.
///
/// # Example
///
/// ```
/// use plane_registration::{RegistrationParams, RotationSolver};
/// use plane_types::{Plane, SegmentedPlane};
/// use nalgebra::{DMatrix, Point3, Rotation3, Vector3};
///
/// let truth = Rotation3::from_euler_angles(0.2, 0.1, -0.3);
/// let normals = [Vector3::x(), Vector3::y(), Vector3::z()];
/// let face = |n: Vector3<f64>| {
///     SegmentedPlane::from_mesh(Plane::from_point_normal(Point3::origin(), n).unwrap(), 1.0)
/// };
///
/// let mut solver = RotationSolver::new(RegistrationParams::default()).unwrap();
/// solver.set_clouds(
///     normals.iter().map(|n| face(*n)).collect(),
///     normals.iter().map(|n| face(truth * n)).collect(),
///     true,
/// );
///
/// let alignment = solver.find_alignment_with_weights(&DMatrix::identity(3, 3)).unwrap();
/// assert!((alignment.rotation - truth.matrix()).norm() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct RotationSolver {
    params: RegistrationParams,
    source: Vec<SegmentedPlane>,
    target: Vec<SegmentedPlane>,
    target_is_mesh: bool,
    source_surfaces: Vec<f64>,
    target_surfaces: Vec<f64>,
    observer: SharedObserver<RegistrationEvent>,
}

impl RotationSolver {
    /// Creates a solver with no planes.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::InvalidParameter`] if `params` do not
    /// validate.
    pub fn new(params: RegistrationParams) -> RegistrationResult<Self> {
        params.validate()?;
        Ok(Self {
            params,
            source: Vec::new(),
            target: Vec::new(),
            target_is_mesh: false,
            source_surfaces: Vec::new(),
            target_surfaces: Vec::new(),
            observer: SharedObserver::default(),
        })
    }

    /// Replaces the observer notified of plane pairings.
    pub fn set_observer<O>(&mut self, observer: O)
    where
        O: Observer<RegistrationEvent> + 'static,
    {
        self.observer = SharedObserver::new(observer);
    }

    /// Builder form of [`set_observer`](Self::set_observer).
    #[must_use]
    pub fn with_observer<O>(mut self, observer: O) -> Self
    where
        O: Observer<RegistrationEvent> + 'static,
    {
        self.set_observer(observer);
        self
    }

    /// The solver's parameters.
    #[must_use]
    pub const fn params(&self) -> &RegistrationParams {
        &self.params
    }

    /// Stores the plane sets to align. Planes of a mesh target have no
    /// member points and weigh 1 each; cloud planes weigh their size.
    pub fn set_clouds(
        &mut self,
        source: Vec<SegmentedPlane>,
        target: Vec<SegmentedPlane>,
        target_is_mesh: bool,
    ) {
        self.source_surfaces = source.iter().map(|p| p.surface).collect();
        self.target_surfaces = target.iter().map(|p| p.surface).collect();
        self.source = source;
        self.target = target;
        self.target_is_mesh = target_is_mesh;
        debug!(
            source = self.source.len(),
            target = self.target.len(),
            target_is_mesh,
            "Plane sets loaded"
        );
    }

    /// Source planes.
    #[must_use]
    pub fn source_planes(&self) -> &[SegmentedPlane] {
        &self.source
    }

    /// Target planes.
    #[must_use]
    pub fn target_planes(&self) -> &[SegmentedPlane] {
        &self.target
    }

    /// Surfaces used for plane selection, source then target.
    #[must_use]
    pub fn surfaces(&self) -> (&[f64], &[f64]) {
        (&self.source_surfaces, &self.target_surfaces)
    }

    /// Re-estimates every cloud plane's surface from the points it was
    /// segmented from. Mesh planes keep their exact area.
    pub fn estimate_surfaces(&mut self, source_cloud: &PointCloud, target_cloud: &PointCloud) {
        let method = self.params.surface_method;
        self.source_surfaces = estimate_planes_surface(source_cloud, &self.source, method);
        self.target_surfaces = estimate_planes_surface(target_cloud, &self.target, method);

        for (plane, &surface) in self.source.iter_mut().zip(&self.source_surfaces) {
            plane.surface = surface;
        }
        for (plane, &surface) in self.target.iter_mut().zip(&self.target_surfaces) {
            plane.surface = surface;
        }
    }

    /// Translation between the scans. Planes do not constrain it, so this
    /// is always zero.
    #[must_use]
    pub fn find_translation(&self) -> Vector3<f64> {
        Vector3::zeros()
    }

    /// Estimates the rotation from the stored plane sets.
    ///
    /// Planes are first selected by surface, then weighted according to
    /// the correspondence mode. An empty set, before or after selection,
    /// yields the identity.
    ///
    /// # Errors
    ///
    /// - [`RegistrationError::DegenerateGeometry`] if the weighted normals
    ///   carry no orientation
    /// - [`RegistrationError::SvdFailed`] if the decomposition fails
    pub fn find_alignment(&self) -> RegistrationResult<Alignment> {
        if self.source.is_empty() || self.target.is_empty() {
            info!(
                source = self.source.len(),
                target = self.target.len(),
                "Nothing to align, returning identity"
            );
            return Ok(Alignment::identity());
        }

        let source_ids = select_planes(
            &self.source_surfaces,
            self.params.min_surface,
            self.params.max_planes,
        );
        let target_ids = select_planes(
            &self.target_surfaces,
            self.params.min_surface,
            self.params.max_planes,
        );
        if source_ids.is_empty() || target_ids.is_empty() {
            warn!(
                min_surface = ?self.params.min_surface,
                source = source_ids.len(),
                target = target_ids.len(),
                "Surface selection left no planes, returning identity"
            );
            return Ok(Alignment::identity());
        }

        let source = subset(&self.source, &source_ids);
        let target = subset(&self.target, &target_ids);

        let (weights, pairs) = match self.params.mode {
            CorrespondenceMode::NormalDistance => (
                normal_distance_weights(&source, &target, self.target_is_mesh),
                Vec::new(),
            ),
            CorrespondenceMode::Descriptor => {
                descriptor_weights(&source, &target, self.params.descriptor_k)
            }
        };

        let correspondences: Vec<(usize, usize)> = pairs
            .iter()
            .map(|&(s, t)| (source_ids[s], target_ids[t]))
            .collect();
        for (k, &(source, target)) in correspondences.iter().enumerate() {
            self.observer.notify(&RegistrationEvent::PlaneAligned {
                source,
                target,
                color: pair_color(k),
            });
        }

        let mut alignment = self.solve(&source, &target, &weights)?;
        alignment.correspondences = correspondences;
        Ok(alignment)
    }

    /// Estimates the rotation from an externally supplied weight matrix,
    /// `|target| x |source|`, over all stored planes. No selection is
    /// applied.
    ///
    /// # Errors
    ///
    /// - [`RegistrationError::DimensionMismatch`] if the matrix shape does
    ///   not match the plane sets
    /// - [`RegistrationError::DegenerateGeometry`] if the weighted normals
    ///   carry no orientation
    /// - [`RegistrationError::SvdFailed`] if the decomposition fails
    pub fn find_alignment_with_weights(
        &self,
        weights: &DMatrix<f64>,
    ) -> RegistrationResult<Alignment> {
        let expected = (self.target.len(), self.source.len());
        if weights.shape() != expected {
            return Err(RegistrationError::DimensionMismatch {
                expected_rows: expected.0,
                expected_cols: expected.1,
                rows: weights.nrows(),
                cols: weights.ncols(),
            });
        }
        if self.source.is_empty() || self.target.is_empty() {
            return Ok(Alignment::identity());
        }
        self.solve(&self.source, &self.target, weights)
    }

    fn solve(
        &self,
        source: &[SegmentedPlane],
        target: &[SegmentedPlane],
        weights: &DMatrix<f64>,
    ) -> RegistrationResult<Alignment> {
        let source_normals: Vec<Vector3<f64>> = source.iter().map(SegmentedPlane::normal).collect();
        let target_normals: Vec<Vector3<f64>> = target.iter().map(SegmentedPlane::normal).collect();

        let h = weighted_covariance(&source_normals, &target_normals, weights);
        let estimate = rotation_from_covariance(&h, self.params.singular_tolerance)?;

        let alignment = Alignment {
            rotation: estimate.rotation,
            translation: self.find_translation(),
            singular_values: estimate.singular_values,
            conditioning: estimate.conditioning,
            source_planes: source.len(),
            target_planes: target.len(),
            correspondences: Vec::new(),
        };
        info!(
            angle_deg = alignment.angle().to_degrees(),
            conditioning = ?alignment.conditioning,
            source_planes = source.len(),
            target_planes = target.len(),
            "Rotation estimated"
        );
        Ok(alignment)
    }
}

fn subset<'a>(planes: &'a [SegmentedPlane], ids: &[usize]) -> Cow<'a, [SegmentedPlane]> {
    if ids.len() == planes.len() {
        Cow::Borrowed(planes)
    } else {
        Cow::Owned(ids.iter().map(|&i| planes[i].clone()).collect())
    }
}
