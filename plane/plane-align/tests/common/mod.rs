//! Synthetic scans shared by the integration tests.

#![allow(dead_code)]

use nalgebra::{Point3, Rotation3, Vector3};
use plane_types::PointCloud;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Noise along the patch normal, in cloud units.
pub const NOISE: f64 = 5e-4;

/// A patch of `n` points spanned by `u` and `v` from `origin`, with uniform
/// noise along the normal.
pub fn patch(
    rng: &mut StdRng,
    origin: Point3<f64>,
    u: Vector3<f64>,
    v: Vector3<f64>,
    n: usize,
) -> Vec<Point3<f64>> {
    let normal = u.cross(&v).normalize();
    (0..n)
        .map(|_| {
            origin
                + u * rng.gen_range(0.0..1.0)
                + v * rng.gen_range(0.0..1.0)
                + normal * rng.gen_range(-NOISE..NOISE)
        })
        .collect()
}

/// Floor and two walls of a room corner, 2 x 2 each, kept apart by small
/// gaps along the corner edges. The corner sits away from the origin, which
/// is where normals are oriented towards.
pub fn room_corner(seed: u64) -> Vec<Point3<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    let c = Point3::new(4.0, 4.0, 4.0);
    let (x, y, z) = (Vector3::x() * 2.0, Vector3::y() * 2.0, Vector3::z() * 2.0);

    let mut points = patch(&mut rng, c + Vector3::new(0.3, 0.3, 0.0), x, y, 800);
    points.extend(patch(&mut rng, c + Vector3::new(0.0, 0.3, 0.3), y, z, 800));
    points.extend(patch(&mut rng, c + Vector3::new(0.3, 0.0, 0.3), x, z, 800));
    points
}

/// One flat 2 x 2 patch of 1000 points on the plane `z = 3`.
pub fn flat_patch(seed: u64) -> Vec<Point3<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    patch(
        &mut rng,
        Point3::new(-1.0, -1.0, 3.0),
        Vector3::x() * 2.0,
        Vector3::y() * 2.0,
        1000,
    )
}

/// A noise-free 32 x 32 grid with 1/16 spacing on the plane `z = 3`. Every
/// point shares its z value, and each x and y value is shared by a column.
pub fn grid_patch() -> Vec<Point3<f64>> {
    (0..1024_u32)
        .map(|i| {
            Point3::new(
                -1.0 + f64::from(i % 32) / 16.0,
                -1.0 + f64::from(i / 32) / 16.0,
                3.0,
            )
        })
        .collect()
}

/// Rotates every point about the origin.
pub fn rotated(points: &[Point3<f64>], rotation: &Rotation3<f64>) -> Vec<Point3<f64>> {
    points.iter().map(|p| rotation * p).collect()
}

/// Cloud without normals.
pub fn cloud(points: &[Point3<f64>]) -> PointCloud {
    PointCloud::from_positions(points)
}

/// Cloud with estimated normals and curvature.
pub fn cloud_with_normals(points: &[Point3<f64>]) -> PointCloud {
    let mut cloud = PointCloud::from_positions(points);
    cloud
        .estimate_normals(15)
        .expect("synthetic cloud is large enough");
    cloud
}
