//! End-to-end tests: segmentation, plane matching and rotation estimation
//! on synthetic scans.

mod common;

use std::borrow::Cow;
use std::collections::HashSet;

use approx::assert_relative_eq;
use nalgebra::{DMatrix, Matrix3, Point3, Rotation3, Vector3};
use plane_align::descriptor::{build_signatures, match_nearest};
use plane_align::prelude::*;
use plane_align::{prepare_cloud, segment_cloud};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use common::{cloud, cloud_with_normals, flat_patch, grid_patch, rotated, room_corner};

fn assert_proper_rotation(m: &Matrix3<f64>) {
    assert_relative_eq!(m.transpose() * m, Matrix3::identity(), epsilon = 1e-9);
    assert_relative_eq!(m.determinant(), 1.0, epsilon = 1e-9);
}

fn rotate_plane(plane: &SegmentedPlane, rotation: &Rotation3<f64>) -> SegmentedPlane {
    let moved = Plane::from_point_normal(rotation * plane.centroid(), rotation * plane.normal())
        .expect("unit normal");
    SegmentedPlane::new(moved, plane.indices.clone(), plane.surface, plane.epsilon)
}

// =============================================================================
// Segmentation
// =============================================================================

#[test]
fn test_segmentation_covers_room_corner() {
    let cloud = cloud_with_normals(&room_corner(7));
    let planes = segment_cloud(&cloud, &SegmentationParams::default()).unwrap();

    let mut seen = HashSet::new();
    for plane in &planes {
        for &id in &plane.indices {
            assert!(seen.insert(id), "point {id} assigned twice");
        }
    }
    assert!(seen.len() as f64 >= 0.8 * cloud.len() as f64);
    assert!(planes.len() >= 3);
}

#[test]
fn test_members_lie_within_epsilon() {
    let cloud = cloud_with_normals(&room_corner(11));
    let planes = segment_cloud(&cloud, &SegmentationParams::default()).unwrap();

    for plane in &planes {
        let max = plane.plane.max_distance(&cloud, &plane.indices);
        assert!(max <= plane.epsilon, "max {max} > epsilon {}", plane.epsilon);
    }
}

#[test]
fn test_prepare_estimates_missing_normals() {
    let raw = cloud(&room_corner(3));
    assert!(!raw.has_normals());

    let prepared = prepare_cloud(&raw, 15).unwrap();
    assert!(matches!(prepared, Cow::Owned(_)));
    assert!(prepared.has_normals() && prepared.has_curvature());

    let ready = cloud_with_normals(&room_corner(3));
    assert!(matches!(prepare_cloud(&ready, 15).unwrap(), Cow::Borrowed(_)));
}

// =============================================================================
// Rotation
// =============================================================================

#[test]
fn test_empty_inputs_give_identity() {
    let room = cloud(&room_corner(5));
    let params = AlignParams::new();

    let report = align_clouds(&PointCloud::new(), &room, &params).unwrap();
    assert_eq!(*report.rotation(), Matrix3::identity());
    assert_eq!(report.alignment.conditioning, Conditioning::Unconstrained);

    let report = align_clouds(&room, &PointCloud::new(), &params).unwrap();
    assert_eq!(*report.rotation(), Matrix3::identity());
    assert!(!report.source_planes.is_empty());
}

#[test]
fn test_rotation_is_proper_in_both_modes() {
    let truth = Rotation3::from_euler_angles(0.3, -0.2, 0.5);
    let points = room_corner(21);
    let source = cloud(&points);
    let target = cloud(&rotated(&points, &truth));

    for descriptor in [false, true] {
        let params = AlignParams::new().with_descriptor(descriptor);
        let report = align_clouds(&source, &target, &params).unwrap();
        assert_proper_rotation(report.rotation());
        assert_eq!(report.alignment.translation, Vector3::zeros());

        if descriptor {
            let expected = report.source_planes.len().min(report.target_planes.len());
            assert_eq!(report.alignment.correspondences.len(), expected);
        }
    }
}

#[test]
fn test_identity_weights_recover_rotation_of_segmented_planes() {
    let truth = Rotation3::from_euler_angles(-0.6, 0.25, 1.2);
    let cloud = cloud_with_normals(&room_corner(13));
    let source = segment_cloud(&cloud, &SegmentationParams::default()).unwrap();
    let target: Vec<SegmentedPlane> = source.iter().map(|p| rotate_plane(p, &truth)).collect();

    let n = source.len();
    let mut solver = RotationSolver::new(RegistrationParams::default()).unwrap();
    solver.set_clouds(source, target, false);

    let alignment = solver
        .find_alignment_with_weights(&DMatrix::identity(n, n))
        .unwrap();
    assert!((alignment.rotation - truth.matrix()).norm() < 1e-4);
    assert_eq!(alignment.conditioning, Conditioning::Full);
}

#[test]
fn test_thirty_degree_tilt_about_x() {
    // Target patch normal is (0, sin 30°, cos 30°) where the source has z
    let tilt = Rotation3::from_axis_angle(&Vector3::x_axis(), -30f64.to_radians());
    let points = flat_patch(17);
    let source = cloud(&points);
    let target = cloud(&rotated(&points, &tilt));

    let params = AlignParams::new()
        .with_registration(RegistrationParams::new().with_max_planes(Some(1)));
    let report = align_clouds(&source, &target, &params).unwrap();
    let alignment = &report.alignment;

    assert_eq!(alignment.conditioning, Conditioning::SingleAxis);
    assert_proper_rotation(&alignment.rotation);
    assert!((alignment.angle().to_degrees() - 30.0).abs() < 0.5);

    let axis = alignment.axis().expect("non-trivial rotation");
    assert!(axis.x.abs() > 0.999, "axis {axis:?}");

    let expected = Vector3::new(0.0, 30f64.to_radians().sin(), 30f64.to_radians().cos());
    assert_relative_eq!(alignment.rotation * Vector3::z(), expected, epsilon = 1e-2);
}

#[test]
fn test_exact_grid_segments_and_aligns() {
    let tilt = Rotation3::from_axis_angle(&Vector3::x_axis(), -30f64.to_radians());
    let points = grid_patch();

    let grid = cloud_with_normals(&points);
    let planes = segment_cloud(&grid, &SegmentationParams::default()).unwrap();
    assert!(!planes.is_empty());
    assert!(planes[0].normal().z.abs() > 0.999);
    for plane in &planes {
        assert!(plane.plane.max_distance(&grid, &plane.indices) <= plane.epsilon);
    }

    let params = AlignParams::new()
        .with_registration(RegistrationParams::new().with_max_planes(Some(1)));
    let report = align_clouds(&cloud(&points), &cloud(&rotated(&points, &tilt)), &params).unwrap();
    let alignment = &report.alignment;

    assert_eq!(alignment.conditioning, Conditioning::SingleAxis);
    assert!((alignment.angle().to_degrees() - 30.0).abs() < 0.5);
    let axis = alignment.axis().expect("non-trivial rotation");
    assert!(axis.x.abs() > 0.999, "axis {axis:?}");
}

// =============================================================================
// Descriptors
// =============================================================================

#[test]
fn test_descriptor_matching_is_symmetric() {
    let mut rng = StdRng::seed_from_u64(99);
    let planes: Vec<SegmentedPlane> = (0..12)
        .map(|_| {
            let centroid = Point3::new(
                rng.gen_range(0.0..10.0),
                rng.gen_range(0.0..10.0),
                rng.gen_range(0.0..10.0),
            );
            let normal = Vector3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(0.2..1.0),
            );
            let plane = Plane::from_point_normal(centroid, normal).expect("non-zero normal");
            SegmentedPlane::from_mesh(plane, 1.0)
        })
        .collect();

    let source = build_signatures(&planes, 4);
    let target = build_signatures(&planes.clone(), 4);

    let mut unambiguous = 0;
    for i in 0..source.len() {
        let Some(j) = match_nearest(i, &source, &target, &[]) else {
            panic!("no match for {i}");
        };
        let best = source[i].l1_distance(&target[j]);
        let unique = (0..target.len())
            .filter(|&k| k != j)
            .all(|k| source[i].l1_distance(&target[k]) > best + 1e-9);
        if unique {
            unambiguous += 1;
            assert_eq!(match_nearest(j, &target, &source, &[]), Some(i));
        }
    }
    assert!(unambiguous > 0);
}

// =============================================================================
// Files
// =============================================================================

#[test]
fn test_align_clouds_loaded_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let source_path = dir.path().join("source.xyz");
    let target_path = dir.path().join("target.xyz");

    let tilt = Rotation3::from_axis_angle(&Vector3::y_axis(), 0.2);
    let points = room_corner(31);
    cloud(&points).save(&source_path).unwrap();
    cloud(&rotated(&points, &tilt)).save(&target_path).unwrap();

    let source = PointCloud::load(&source_path).unwrap();
    let target = PointCloud::load(&target_path).unwrap();
    assert_eq!(source.len(), points.len());

    let report = align_clouds(&source, &target, &AlignParams::new()).unwrap();
    assert!(!report.source_planes.is_empty());
    assert_proper_rotation(report.rotation());
}
