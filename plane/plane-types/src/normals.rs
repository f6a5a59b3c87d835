//! Normal and curvature estimation for point clouds.
//!
//! For each point the k nearest neighbours are collected and their covariance
//! is decomposed. The eigenvector of the smallest eigenvalue is the normal,
//! and the surface variation `λ₀ / (λ₀ + λ₁ + λ₂)` is stored as curvature.
//! Normals are flipped to face a viewpoint so that coplanar points agree on
//! their sign.
//!
//! # Example
//!
//! ```
//! use plane_types::PointCloud;
//! use nalgebra::Point3;
//!
//! // A slightly irregular grid on the plane z = 1
//! let positions: Vec<_> = (0..15)
//!     .flat_map(|i| (0..15).map(move |j| {
//!         let jitter = ((i * 15 + j) as f64 * 0.37).sin() * 1e-3;
//!         Point3::new(i as f64 * 0.1 + jitter, j as f64 * 0.1 - jitter, 1.0 + jitter * 0.01)
//!     }))
//!     .collect();
//!
//! let mut cloud = PointCloud::from_positions(&positions);
//! cloud.estimate_normals(10).unwrap();
//!
//! assert!(cloud.has_normals());
//! assert!(cloud.has_curvature());
//! ```

use nalgebra::{Matrix3, Point3, SymmetricEigen, Vector3};
use rayon::prelude::*;
use tracing::debug;

use crate::cloud::PointCloud;
use crate::error::{TypesError, TypesResult};
use crate::search::{KdTreeIndex, NeighborSearch};

/// Parameters for normal estimation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NormalParams {
    /// Number of neighbours (including the point itself) per estimate.
    pub k: usize,
    /// Normals are flipped to point towards this location.
    pub viewpoint: Point3<f64>,
}

impl Default for NormalParams {
    fn default() -> Self {
        Self {
            k: 15,
            viewpoint: Point3::origin(),
        }
    }
}

impl NormalParams {
    /// Creates parameters with the given neighbourhood size.
    #[must_use]
    pub fn with_k(k: usize) -> Self {
        Self {
            k,
            ..Self::default()
        }
    }

    /// Sets the viewpoint normals are oriented towards.
    #[must_use]
    pub const fn with_viewpoint(mut self, viewpoint: Point3<f64>) -> Self {
        self.viewpoint = viewpoint;
        self
    }
}

/// Normal and curvature of one neighbourhood.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalSurface {
    /// Unit normal (eigenvector of the smallest eigenvalue).
    pub normal: Vector3<f64>,
    /// Surface variation in `[0, 1/3]`.
    pub curvature: f64,
}

impl PointCloud {
    /// Estimates normals and curvature with `k` neighbours, orienting normals
    /// towards the origin.
    ///
    /// # Errors
    ///
    /// Returns an error if the cloud has fewer than 3 points or `k < 3`.
    pub fn estimate_normals(&mut self, k: usize) -> TypesResult<()> {
        self.estimate_normals_with(&NormalParams::with_k(k))
    }

    /// Estimates normals and curvature with explicit parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the cloud has fewer than 3 points or `k < 3`.
    pub fn estimate_normals_with(&mut self, params: &NormalParams) -> TypesResult<()> {
        if self.points.len() < 3 {
            return Err(TypesError::InsufficientPoints {
                required: 3,
                actual: self.points.len(),
            });
        }
        if params.k < 3 {
            return Err(TypesError::InvalidParameter {
                reason: format!("k must be at least 3, got {}", params.k),
            });
        }

        let index = KdTreeIndex::from_cloud(self);
        let positions = self.positions();

        let surfaces: Vec<LocalSurface> = positions
            .par_iter()
            .map(|p| {
                let ids: Vec<usize> = index
                    .k_nearest(p, params.k)
                    .into_iter()
                    .map(|n| n.index)
                    .collect();
                let mut surface = fit_local_surface(&positions, &ids);
                if surface.normal.dot(&(params.viewpoint - p)) < 0.0 {
                    surface.normal = -surface.normal;
                }
                surface
            })
            .collect();

        for (point, surface) in self.points.iter_mut().zip(surfaces) {
            point.normal = Some(surface.normal);
            point.curvature = Some(surface.curvature);
        }

        debug!(points = self.points.len(), k = params.k, "Normals estimated");
        Ok(())
    }
}

/// Fits normal and curvature to the positions with the given ids.
///
/// Fewer than 3 ids, or a degenerate neighbourhood, yield `+Z` with zero
/// curvature.
#[must_use]
pub fn fit_local_surface(positions: &[Point3<f64>], ids: &[usize]) -> LocalSurface {
    let fallback = LocalSurface {
        normal: Vector3::z(),
        curvature: 0.0,
    };
    if ids.len() < 3 {
        return fallback;
    }

    let centroid: Vector3<f64> =
        ids.iter().map(|&i| positions[i].coords).sum::<Vector3<f64>>() / ids.len() as f64;

    let mut cov = Matrix3::zeros();
    for &i in ids {
        let diff = positions[i].coords - centroid;
        cov += diff * diff.transpose();
    }

    let eigen = SymmetricEigen::new(cov);
    let values = eigen.eigenvalues;
    let min_idx = values.imin();

    let normal: Vector3<f64> = eigen.eigenvectors.column(min_idx).into_owned();
    let norm = normal.norm();
    if norm < 1e-12 {
        return fallback;
    }

    let total = values.iter().map(|v| v.max(0.0)).sum::<f64>();
    let curvature = if total > 0.0 {
        values[min_idx].max(0.0) / total
    } else {
        0.0
    };

    LocalSurface {
        normal: normal / norm,
        curvature,
    }
}
