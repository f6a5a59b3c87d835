//! Plane signatures and greedy cross-cloud matching.
//!
//! Each committed plane is reduced to one synthetic oriented point (its
//! centroid and unit normal). A plane's signature is the histogram of its
//! nearest synthetic points, so it describes how the plane sits relative to
//! its neighbours. That arrangement survives a rigid motion of the cloud.

use nalgebra::{Point3, Vector3};
use tracing::debug;

use plane_types::{KdTreeIndex, NeighborSearch, SegmentedPlane};

use crate::histogram::{compute_pfh, PfhSignature};

/// Default neighbourhood size (the plane itself included) for plane
/// signatures.
pub const CENTER_KNN: usize = 6;

/// Computes one signature per plane over its `min(k, planes.len())` nearest
/// plane centroids.
///
/// # Example
///
/// ```
/// use plane_descriptor::{build_signatures, CENTER_KNN};
/// use plane_types::{Plane, SegmentedPlane};
/// use nalgebra::{Point3, Vector3};
///
/// let planes: Vec<SegmentedPlane> = [
///     (Point3::new(0.0, 0.0, 0.0), Vector3::z()),
///     (Point3::new(1.0, 0.2, 0.5), Vector3::x()),
///     (Point3::new(0.3, 1.0, 0.4), Vector3::y()),
/// ]
/// .into_iter()
/// .map(|(c, n)| SegmentedPlane::from_mesh(Plane::from_point_normal(c, n).unwrap(), 1.0))
/// .collect();
///
/// let signatures = build_signatures(&planes, CENTER_KNN);
/// assert_eq!(signatures.len(), 3);
/// assert!((signatures[0].total() - 100.0).abs() < 1e-9);
/// ```
#[must_use]
pub fn build_signatures(planes: &[SegmentedPlane], k: usize) -> Vec<PfhSignature> {
    let centroids: Vec<Point3<f64>> = planes.iter().map(SegmentedPlane::centroid).collect();
    let normals: Vec<Vector3<f64>> = planes.iter().map(SegmentedPlane::normal).collect();
    let index = KdTreeIndex::from_points(&centroids);

    centroids
        .iter()
        .map(|c| {
            let neighbours: Vec<usize> = index
                .k_nearest(c, k.min(planes.len()))
                .into_iter()
                .map(|n| n.index)
                .collect();
            compute_pfh(&centroids, &normals, &neighbours)
        })
        .collect()
}

/// Finds the target signature closest (L1) to source signature `i`,
/// skipping targets listed in `already_matched`.
///
/// When several targets share the minimum distance the lowest target index
/// wins. Returns `None` if every target is already matched.
#[must_use]
pub fn match_nearest(
    i: usize,
    source: &[PfhSignature],
    target: &[PfhSignature],
    already_matched: &[usize],
) -> Option<usize> {
    let query = &source[i];
    let mut best: Option<(usize, f64)> = None;

    for (j, candidate) in target.iter().enumerate() {
        if already_matched.contains(&j) {
            continue;
        }
        let error = query.l1_distance(candidate);
        match best {
            Some((best_j, best_error)) if error == best_error => {
                debug!(source = i, kept = best_j, tied = j, error, "Equal signature distance");
            }
            Some((_, best_error)) if error > best_error => {}
            _ => best = Some((j, error)),
        }
    }

    best.map(|(j, _)| j)
}

/// Greedily pairs every source plane, in order, with its nearest unmatched
/// target plane. Stops early once all targets are taken.
#[must_use]
pub fn match_planes(source: &[PfhSignature], target: &[PfhSignature]) -> Vec<(usize, usize)> {
    let mut matched: Vec<usize> = Vec::with_capacity(source.len().min(target.len()));
    let mut pairs = Vec::with_capacity(matched.capacity());

    for i in 0..source.len() {
        let Some(j) = match_nearest(i, source, target, &matched) else {
            break;
        };
        matched.push(j);
        pairs.push((i, j));
    }
    pairs
}
