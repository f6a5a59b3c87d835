//! Histogram-based planarity test.

use nalgebra::{Point3, Vector3};

use plane_types::PointCloud;

use crate::histogram::{compute_pfh, PfhSignature};

/// Default share of coplanar pairs (percent) above which a neighbourhood is
/// accepted as a plane.
pub const PLANE_THRESHOLD: f64 = 50.0;

/// Histogram of the cloud points with the given ids. Points without a normal
/// are treated as facing +Z.
#[must_use]
pub fn cloud_pfh(cloud: &PointCloud, indices: &[usize]) -> PfhSignature {
    let (positions, normals): (Vec<Point3<f64>>, Vec<Vector3<f64>>) = indices
        .iter()
        .map(|&i| {
            let p = &cloud.points[i];
            (p.position, p.normal_or_z())
        })
        .unzip();
    let local: Vec<usize> = (0..positions.len()).collect();
    compute_pfh(&positions, &normals, &local)
}

/// Returns true if more than `threshold` percent of the neighbourhood's
/// point pairs fall into the coplanar bin.
///
/// Normals must be consistently oriented: a flipped normal turns a coplanar
/// pair into an opposite-facing one.
///
/// # Example
///
/// ```
/// use plane_descriptor::{is_valid_plane, PLANE_THRESHOLD};
/// use plane_types::{CloudPoint, PointCloud};
/// use nalgebra::{Point3, Vector3};
///
/// let cloud: PointCloud = (0..30)
///     .map(|i| {
///         let t = f64::from(i);
///         CloudPoint::with_normal(Point3::new(t.sin(), (t * 0.4).cos(), 1.0), Vector3::z())
///     })
///     .collect();
/// let ids: Vec<usize> = (0..30).collect();
/// assert!(is_valid_plane(&cloud, &ids, PLANE_THRESHOLD));
/// ```
#[must_use]
pub fn is_valid_plane(cloud: &PointCloud, indices: &[usize], threshold: f64) -> bool {
    cloud_pfh(cloud, indices).planar_share() > threshold
}
