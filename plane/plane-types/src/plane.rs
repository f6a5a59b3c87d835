//! Plane representation and least-squares fitting.

use nalgebra::{Point3, Vector3};

use crate::cloud::PointCloud;
use crate::normals::fit_local_surface;

/// A plane `n · p + d = 0` with the centroid of the points it was fitted to.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Plane {
    /// Unit normal.
    pub normal: Vector3<f64>,
    /// Signed offset: `d = -n · centroid`.
    pub d: f64,
    /// Centroid of the supporting points (a point on the plane).
    pub centroid: Point3<f64>,
}

impl Plane {
    /// Creates a plane through `point` with the given normal.
    ///
    /// Returns `None` when the normal is zero.
    ///
    /// # Example
    ///
    /// ```
    /// use plane_types::Plane;
    /// use nalgebra::{Point3, Vector3};
    ///
    /// let plane = Plane::from_point_normal(Point3::new(0.0, 0.0, 2.0), Vector3::new(0.0, 0.0, 3.0)).unwrap();
    /// assert!((plane.d + 2.0).abs() < 1e-12);
    /// assert!((plane.signed_distance(&Point3::new(5.0, 5.0, 3.0)) - 1.0).abs() < 1e-12);
    /// ```
    #[must_use]
    pub fn from_point_normal(point: Point3<f64>, normal: Vector3<f64>) -> Option<Self> {
        let norm = normal.norm();
        if norm < f64::EPSILON {
            return None;
        }
        let normal = normal / norm;
        Some(Self {
            normal,
            d: -normal.dot(&point.coords),
            centroid: point,
        })
    }

    /// Least-squares plane through the points with the given ids.
    ///
    /// The normal is the direction of least variance of the points. Its sign
    /// is chosen to agree with the summed point normals when the cloud has
    /// them, so a fitted plane faces the same way as its members.
    ///
    /// Returns `None` with fewer than 3 ids.
    #[must_use]
    pub fn fit(cloud: &PointCloud, ids: &[usize]) -> Option<Self> {
        if ids.len() < 3 {
            return None;
        }
        let centroid = cloud.centroid_of(ids)?;
        let positions: Vec<Point3<f64>> = ids.iter().map(|&i| cloud.points[i].position).collect();
        let local: Vec<usize> = (0..positions.len()).collect();
        let mut normal = fit_local_surface(&positions, &local).normal;

        let orientation: Vector3<f64> = ids
            .iter()
            .filter_map(|&i| cloud.points[i].normal)
            .sum();
        if normal.dot(&orientation) < 0.0 {
            normal = -normal;
        }

        Self::from_point_normal(centroid, normal)
    }

    /// Signed distance from `point` to the plane (positive on the normal side).
    #[must_use]
    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) + self.d
    }

    /// Absolute distance from `point` to the plane.
    #[must_use]
    pub fn distance(&self, point: &Point3<f64>) -> f64 {
        self.signed_distance(point).abs()
    }

    /// Orthogonal projection of `point` onto the plane.
    #[must_use]
    pub fn project(&self, point: &Point3<f64>) -> Point3<f64> {
        point - self.normal * self.signed_distance(point)
    }

    /// Root-mean-square distance of the given cloud points to the plane.
    ///
    /// This is the standard deviation of the point-to-plane residuals of a
    /// least-squares fit (their mean is zero). Returns 0 for no ids.
    #[must_use]
    pub fn rms_distance(&self, cloud: &PointCloud, ids: &[usize]) -> f64 {
        if ids.is_empty() {
            return 0.0;
        }
        let sum_sq: f64 = ids
            .iter()
            .map(|&i| self.signed_distance(&cloud.points[i].position).powi(2))
            .sum();
        (sum_sq / ids.len() as f64).sqrt()
    }

    /// Largest distance of the given cloud points to the plane.
    #[must_use]
    pub fn max_distance(&self, cloud: &PointCloud, ids: &[usize]) -> f64 {
        ids.iter()
            .map(|&i| self.distance(&cloud.points[i].position))
            .fold(0.0, f64::max)
    }

    /// Two unit vectors spanning the plane, orthogonal to each other and to
    /// the normal, forming a right-handed frame `(e1, e2, n)`.
    #[must_use]
    pub fn basis(&self) -> (Vector3<f64>, Vector3<f64>) {
        let n = self.normal;
        // Pick the world axis least aligned with the normal as helper.
        let helper = if n.x.abs() <= n.y.abs() && n.x.abs() <= n.z.abs() {
            Vector3::x()
        } else if n.y.abs() <= n.z.abs() {
            Vector3::y()
        } else {
            Vector3::z()
        };
        let e1 = helper.cross(&n).normalize();
        let e2 = n.cross(&e1);
        (e1, e2)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cloud::CloudPoint;
    use approx::assert_relative_eq;

    fn tilted_cloud() -> PointCloud {
        // Points on z = 0.5 x + 1 with a consistent upward-ish normal.
        let n = Vector3::new(-0.5, 0.0, 1.0).normalize();
        let mut cloud = PointCloud::new();
        for i in 0..6 {
            for j in 0..6 {
                let x = f64::from(i) * 0.2 + f64::from(j) * 0.013;
                let y = f64::from(j) * 0.2 - f64::from(i) * 0.007;
                cloud.push(CloudPoint::with_normal(Point3::new(x, y, 0.5 * x + 1.0), n));
            }
        }
        cloud
    }

    #[test]
    fn test_fit_recovers_tilted_plane() {
        let cloud = tilted_cloud();
        let ids: Vec<usize> = (0..cloud.len()).collect();
        let plane = Plane::fit(&cloud, &ids).unwrap();

        let expected = Vector3::new(-0.5, 0.0, 1.0).normalize();
        assert_relative_eq!(plane.normal, expected, epsilon = 1e-9);
        assert!(plane.max_distance(&cloud, &ids) < 1e-9);
        assert!(plane.rms_distance(&cloud, &ids) < 1e-9);
    }

    #[test]
    fn test_fit_follows_member_normals() {
        let mut cloud = tilted_cloud();
        for p in &mut cloud.points {
            p.normal = p.normal.map(|n| -n);
        }
        let ids: Vec<usize> = (0..cloud.len()).collect();
        let plane = Plane::fit(&cloud, &ids).unwrap();
        assert!(plane.normal.z < 0.0);
    }

    #[test]
    fn test_fit_needs_three_points() {
        let cloud = tilted_cloud();
        assert!(Plane::fit(&cloud, &[0, 1]).is_none());
    }

    #[test]
    fn test_project_and_distance() {
        let plane = Plane::from_point_normal(Point3::origin(), Vector3::z()).unwrap();
        let p = Point3::new(3.0, 4.0, -7.0);
        assert_relative_eq!(plane.signed_distance(&p), -7.0);
        assert_relative_eq!(plane.distance(&p), 7.0);
        assert_relative_eq!(plane.project(&p), Point3::new(3.0, 4.0, 0.0));
    }

    #[test]
    fn test_rms_distance() {
        let plane = Plane::from_point_normal(Point3::origin(), Vector3::z()).unwrap();
        let cloud = PointCloud::from_positions(&[
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, -1.0),
        ]);
        assert_relative_eq!(plane.rms_distance(&cloud, &[0, 1]), 1.0);
        assert_relative_eq!(plane.rms_distance(&cloud, &[]), 0.0);
    }

    #[test]
    fn test_basis_is_orthonormal_frame() {
        for n in [
            Vector3::z(),
            Vector3::x(),
            Vector3::new(1.0, 2.0, -3.0).normalize(),
        ] {
            let plane = Plane::from_point_normal(Point3::origin(), n).unwrap();
            let (e1, e2) = plane.basis();
            assert_relative_eq!(e1.norm(), 1.0, epsilon = 1e-12);
            assert_relative_eq!(e2.norm(), 1.0, epsilon = 1e-12);
            assert_relative_eq!(e1.dot(&e2), 0.0, epsilon = 1e-12);
            assert_relative_eq!(e1.dot(&n), 0.0, epsilon = 1e-12);
            assert_relative_eq!(e1.cross(&e2), n, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_zero_normal_is_rejected() {
        assert!(Plane::from_point_normal(Point3::origin(), Vector3::zeros()).is_none());
    }
}
