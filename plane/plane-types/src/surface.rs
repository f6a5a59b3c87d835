//! Area estimation of segmented planes.
//!
//! Member points are projected onto an orthonormal basis of the plane, centred
//! on their 2D centroid, and the area of their footprint is measured. Mesh
//! planes already carry an exact area and never go through here.

use nalgebra::{Point2, Vector2};
use rayon::prelude::*;

use crate::cloud::PointCloud;
use crate::plane::Plane;
use crate::segmented::SegmentedPlane;

/// How the footprint of projected points is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SurfaceMethod {
    /// Area of the 2D convex hull.
    #[default]
    ConvexHull,
    /// Area of the axis-aligned bounding rectangle in the plane basis.
    BoundingExtent,
}

/// Convex-hull area of a segmented plane's members.
#[must_use]
pub fn estimate_plane_surface(cloud: &PointCloud, plane: &SegmentedPlane) -> f64 {
    projected_area(cloud, &plane.plane, &plane.indices, SurfaceMethod::ConvexHull)
}

/// Surface of every plane, computed in parallel. Mesh planes (no members)
/// keep their stored surface.
#[must_use]
pub fn estimate_planes_surface(
    cloud: &PointCloud,
    planes: &[SegmentedPlane],
    method: SurfaceMethod,
) -> Vec<f64> {
    planes
        .par_iter()
        .map(|p| {
            if p.is_empty() {
                p.surface
            } else {
                projected_area(cloud, &p.plane, &p.indices, method)
            }
        })
        .collect()
}

/// Area covered by the given cloud points once projected onto `plane`.
///
/// Fewer than 3 points cover no area.
///
/// # Example
///
/// ```
/// use plane_types::{projected_area, Plane, PointCloud, SurfaceMethod};
/// use nalgebra::{Point3, Vector3};
///
/// let cloud = PointCloud::from_positions(&[
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(2.0, 0.0, 0.1),
///     Point3::new(2.0, 3.0, -0.1),
///     Point3::new(0.0, 3.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
/// ]);
/// let plane = Plane::from_point_normal(Point3::origin(), Vector3::z()).unwrap();
/// let ids = [0, 1, 2, 3, 4];
///
/// let hull = projected_area(&cloud, &plane, &ids, SurfaceMethod::ConvexHull);
/// assert!((hull - 6.0).abs() < 1e-9);
/// ```
#[must_use]
pub fn projected_area(
    cloud: &PointCloud,
    plane: &Plane,
    ids: &[usize],
    method: SurfaceMethod,
) -> f64 {
    if ids.len() < 3 {
        return 0.0;
    }

    let (e1, e2) = plane.basis();
    let mut projected: Vec<Point2<f64>> = ids
        .iter()
        .map(|&i| {
            let v = cloud.points[i].position - plane.centroid;
            Point2::new(v.dot(&e1), v.dot(&e2))
        })
        .collect();

    let centre = projected.iter().map(|p| p.coords).sum::<Vector2<f64>>()
        / projected.len() as f64;
    for p in &mut projected {
        *p = Point2::from(p.coords - centre);
    }

    match method {
        SurfaceMethod::ConvexHull => polygon_area(&convex_hull(projected)),
        SurfaceMethod::BoundingExtent => bounding_extent_area(&projected),
    }
}

/// Convex hull by Andrew's monotone chain, counter-clockwise, without
/// collinear points.
fn convex_hull(mut points: Vec<Point2<f64>>) -> Vec<Point2<f64>> {
    points.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    points.dedup();
    if points.len() < 3 {
        return points;
    }

    let cross = |o: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>| {
        (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
    };

    let mut hull: Vec<Point2<f64>> = Vec::with_capacity(points.len() + 1);
    for p in &points {
        while hull.len() >= 2 && cross(&hull[hull.len() - 2], &hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(*p);
    }
    // Upper chain must not eat into the lower one.
    let lower_len = hull.len() + 1;
    for p in points.iter().rev().skip(1) {
        while hull.len() >= lower_len
            && cross(&hull[hull.len() - 2], &hull[hull.len() - 1], p) <= 0.0
        {
            hull.pop();
        }
        hull.push(*p);
    }
    hull.pop();
    hull
}

/// Shoelace area of a simple polygon.
fn polygon_area(polygon: &[Point2<f64>]) -> f64 {
    if polygon.len() < 3 {
        return 0.0;
    }
    let twice: f64 = polygon
        .iter()
        .zip(polygon.iter().cycle().skip(1))
        .map(|(a, b)| a.x * b.y - b.x * a.y)
        .sum();
    twice.abs() * 0.5
}

fn bounding_extent_area(points: &[Point2<f64>]) -> f64 {
    let (min, max) = points.iter().fold(
        (Point2::new(f64::MAX, f64::MAX), Point2::new(f64::MIN, f64::MIN)),
        |(lo, hi), p| {
            (
                Point2::new(lo.x.min(p.x), lo.y.min(p.y)),
                Point2::new(hi.x.max(p.x), hi.y.max(p.y)),
            )
        },
    );
    (max.x - min.x) * (max.y - min.y)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Point3, Vector3};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn tilted_square(n: usize, side: f64, seed: u64) -> (PointCloud, Plane) {
        let normal = Vector3::new(0.0, 1.0, 1.0).normalize();
        let plane = Plane::from_point_normal(Point3::new(1.0, 2.0, 3.0), normal).unwrap();
        let (e1, e2) = plane.basis();
        let mut rng = StdRng::seed_from_u64(seed);

        let mut positions = vec![
            plane.centroid,
            plane.centroid + e1 * side,
            plane.centroid + e1 * side + e2 * side,
            plane.centroid + e2 * side,
        ];
        for _ in 0..n {
            let (u, v) = (rng.gen_range(0.0..side), rng.gen_range(0.0..side));
            positions.push(plane.centroid + e1 * u + e2 * v);
        }
        (PointCloud::from_positions(&positions), plane)
    }

    #[test]
    fn test_hull_area_of_square() {
        let (cloud, plane) = tilted_square(200, 2.0, 4);
        let ids: Vec<usize> = (0..cloud.len()).collect();
        let area = projected_area(&cloud, &plane, &ids, SurfaceMethod::ConvexHull);
        assert_relative_eq!(area, 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_bounding_extent_covers_hull() {
        let cloud = PointCloud::from_positions(&[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        ]);
        let plane = Plane::from_point_normal(Point3::origin(), Vector3::z()).unwrap();
        let ids = [0, 1, 2];
        let hull = projected_area(&cloud, &plane, &ids, SurfaceMethod::ConvexHull);
        let extent = projected_area(&cloud, &plane, &ids, SurfaceMethod::BoundingExtent);
        assert_relative_eq!(hull, 2.0, epsilon = 1e-12);
        assert_relative_eq!(extent, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_inputs_have_no_area() {
        let cloud = PointCloud::from_positions(&[
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ]);
        let plane = Plane::from_point_normal(Point3::origin(), Vector3::z()).unwrap();
        assert_relative_eq!(
            projected_area(&cloud, &plane, &[0, 1, 2], SurfaceMethod::ConvexHull),
            0.0
        );
        assert_relative_eq!(
            projected_area(&cloud, &plane, &[0, 1], SurfaceMethod::ConvexHull),
            0.0
        );
    }

    #[test]
    fn test_mesh_planes_keep_their_surface() {
        let (cloud, plane) = tilted_square(50, 1.0, 2);
        let segmented = SegmentedPlane::new(plane, (0..cloud.len()).collect(), 0.0, 0.0);
        let mesh = SegmentedPlane::from_mesh(plane, 7.5);

        let surfaces =
            estimate_planes_surface(&cloud, &[segmented.clone(), mesh], SurfaceMethod::ConvexHull);
        assert_relative_eq!(surfaces[0], 1.0, epsilon = 1e-9);
        assert_relative_eq!(surfaces[1], 7.5);
        assert_relative_eq!(estimate_plane_surface(&cloud, &segmented), 1.0, epsilon = 1e-9);
    }
}
