//! Plane pair weight matrices and the weighted normal covariance.
//!
//! Matrices are `|target| x |source|`: row `i` belongs to target plane `i`,
//! column `j` to source plane `j`.

use nalgebra::{DMatrix, Matrix3, Vector3};
use plane_descriptor::{build_signatures, match_planes};
use plane_types::SegmentedPlane;
use rayon::prelude::*;
use tracing::debug;

/// `M(i,j) = ‖w_i n_target_i − n_source_j‖²`, where `w_i` is the member
/// count of target plane `i`, or 1 when the target comes from a mesh.
///
/// Rows are computed in parallel.
#[must_use]
pub fn normal_distance_weights(
    source: &[SegmentedPlane],
    target: &[SegmentedPlane],
    target_is_mesh: bool,
) -> DMatrix<f64> {
    let rows: Vec<Vec<f64>> = target
        .par_iter()
        .map(|t| {
            let w = if target_is_mesh { 1.0 } else { t.len() as f64 };
            let scaled = t.normal() * w;
            source
                .iter()
                .map(|s| (scaled - s.normal()).norm_squared())
                .collect()
        })
        .collect();

    DMatrix::from_row_iterator(target.len(), source.len(), rows.into_iter().flatten())
}

/// Unit weight for every descriptor-matched pair, zero elsewhere.
///
/// Returns the matrix and the matched `(source, target)` pairs.
#[must_use]
pub fn descriptor_weights(
    source: &[SegmentedPlane],
    target: &[SegmentedPlane],
    k: usize,
) -> (DMatrix<f64>, Vec<(usize, usize)>) {
    let source_signatures = build_signatures(source, k);
    let target_signatures = build_signatures(target, k);
    let pairs = match_planes(&source_signatures, &target_signatures);
    debug!(pairs = pairs.len(), "Matched plane descriptors");

    let mut weights = DMatrix::zeros(target.len(), source.len());
    for &(s, t) in &pairs {
        weights[(t, s)] = 1.0;
    }
    (weights, pairs)
}

/// `H = Σ_i Σ_j M(i,j) n_source_j n_target_iᵀ`.
///
/// `weights` must be `|target| x |source|`.
#[must_use]
pub fn weighted_covariance(
    source_normals: &[Vector3<f64>],
    target_normals: &[Vector3<f64>],
    weights: &DMatrix<f64>,
) -> Matrix3<f64> {
    let mut h = Matrix3::zeros();
    for (i, t) in target_normals.iter().enumerate() {
        for (j, s) in source_normals.iter().enumerate() {
            let w = weights[(i, j)];
            if w != 0.0 {
                h += w * s * t.transpose();
            }
        }
    }
    h
}
