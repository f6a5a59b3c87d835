//! Plane-based rotation estimation between two scans.
//!
//! Given the planes segmented from a source and a target scan, the
//! [`RotationSolver`] finds the rotation that best maps source plane
//! normals onto target plane normals:
//!
//! 1. Planes are optionally [selected by surface](select_planes)
//! 2. Every (target, source) pair gets a weight, either from the distance
//!    between their normals or from point feature histogram matching
//! 3. The weighted normal covariance `H` is decomposed by SVD and
//!    `R = V Uᵀ`, corrected so that `det(R) = +1`
//!
//! Plane normals carry no information about translation, which is reported
//! as zero. When every normal is parallel the rotation about them is
//! unconstrained; the result is then flagged [`Conditioning::SingleAxis`].
//!
//! # Example
//!
//! ```
//! use plane_registration::{CorrespondenceMode, RegistrationParams, RotationSolver};
//! use plane_types::{Plane, SegmentedPlane};
//! use nalgebra::{Point3, Rotation3, Vector3};
//!
//! let tilt = Rotation3::from_axis_angle(&Vector3::x_axis(), 0.5);
//! let floor = |r: &Rotation3<f64>| {
//!     let plane = Plane::from_point_normal(r * Point3::new(1.0, 2.0, 0.0), r * Vector3::z());
//!     vec![SegmentedPlane::from_mesh(plane.unwrap(), 50.0)]
//! };
//!
//! let params = RegistrationParams::new().with_mode(CorrespondenceMode::Descriptor);
//! let mut solver = RotationSolver::new(params).unwrap();
//! solver.set_clouds(floor(&Rotation3::identity()), floor(&tilt), true);
//!
//! let alignment = solver.find_alignment().unwrap();
//! assert!((alignment.angle() - 0.5).abs() < 1e-9);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod alignment;
mod error;
mod events;
mod filter;
mod params;
mod rotation;
mod solver;
mod weights;

pub use alignment::{Alignment, Conditioning};
pub use error::{RegistrationError, RegistrationResult};
pub use events::{pair_color, RegistrationEvent};
pub use filter::select_planes;
pub use params::{CorrespondenceMode, RegistrationParams, MIN_SURFACE};
pub use rotation::{minimal_rotation, rotation_from_covariance, RotationEstimate};
pub use solver::RotationSolver;
pub use weights::{descriptor_weights, normal_distance_weights, weighted_covariance};

// Surface estimation is part of the registration surface-selection step.
pub use plane_types::{estimate_plane_surface, estimate_planes_surface, SurfaceMethod};
