//! Darboux-frame pair features.

use nalgebra::{Point3, Vector3};

/// The four PFH features of one point pair.
///
/// With `u = n1`, `v = (p2 - p1) × u` (normalised) and `w = u × v`:
///
/// - `theta = atan2(w · n2, u · n2)` in `[-π, π]`
/// - `alpha = v · n2` in `[-1, 1]`
/// - `phi = u · (p2 - p1) / |p2 - p1|` in `[-1, 1]`
/// - `distance = |p2 - p1|`
///
/// A coplanar pair with parallel normals has all three angular features
/// equal to zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PairFeatures {
    /// Angle of `n2` in the `(u, w)` plane.
    pub theta: f64,
    /// Component of `n2` along `v`.
    pub alpha: f64,
    /// Cosine between the source normal and the pair direction.
    pub phi: f64,
    /// Euclidean distance between the two points.
    pub distance: f64,
}

/// Computes the pair features of `(p1, n1)` and `(p2, n2)`.
///
/// The point whose normal makes the smaller angle with the connecting line
/// is taken as the frame origin, so the result does not depend on argument
/// order. Returns `None` for coincident points, or when the connecting line
/// is parallel to the frame normal (no Darboux frame exists).
///
/// # Example
///
/// ```
/// use plane_descriptor::compute_pair_features;
/// use nalgebra::{Point3, Vector3};
///
/// let f = compute_pair_features(
///     &Point3::origin(), &Vector3::z(),
///     &Point3::new(1.0, 0.0, 0.0), &Vector3::z(),
/// ).unwrap();
/// assert!(f.theta.abs() < 1e-12 && f.alpha.abs() < 1e-12 && f.phi.abs() < 1e-12);
/// assert!((f.distance - 1.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn compute_pair_features(
    p1: &Point3<f64>,
    n1: &Vector3<f64>,
    p2: &Point3<f64>,
    n2: &Vector3<f64>,
) -> Option<PairFeatures> {
    let mut dp = p2 - p1;
    let distance = dp.norm();
    if distance == 0.0 {
        return None;
    }

    let angle1 = n1.dot(&dp) / distance;
    let angle2 = n2.dot(&dp) / distance;

    let (u, n2, phi) = if angle1.abs().acos() > angle2.abs().acos() {
        dp = -dp;
        (*n2, *n1, -angle2)
    } else {
        (*n1, *n2, angle1)
    };

    let v = dp.cross(&u);
    let v_norm = v.norm();
    if v_norm == 0.0 {
        return None;
    }
    let v = v / v_norm;
    let w = u.cross(&v);

    Some(PairFeatures {
        theta: w.dot(&n2).atan2(u.dot(&n2)),
        alpha: v.dot(&n2),
        phi,
        distance,
    })
}
