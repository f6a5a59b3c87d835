//! Point cloud alignment through planar structures.
//!
//! This umbrella crate re-exports the `plane-*` crates and adds the
//! end-to-end pipeline: normals are estimated where missing, both clouds
//! are segmented into planes by region growing, and the rotation between
//! the two plane sets is estimated from their normals.
//!
//! # Quick Start
//!
//! ```no_run
//! use plane_align::prelude::*;
//!
//! let source = PointCloud::load("scan_a.xyz").unwrap();
//! let target = PointCloud::load("scan_b.xyz").unwrap();
//!
//! let params = AlignParams::new().with_descriptor(true);
//! let report = align_clouds(&source, &target, &params).unwrap();
//! println!("{} / {} planes", report.source_planes.len(), report.target_planes.len());
//! println!("{}", report.rotation());
//! ```
//!
//! # Module Organization
//!
//! - [`types`] - Point clouds, planes, neighbour search, surfaces
//! - [`descriptor`] - Point feature histograms and plane matching
//! - [`segment`] - Region-growing plane segmentation
//! - [`registration`] - Rotation estimation from plane normals

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod error;
mod pipeline;

/// Point clouds, planes, neighbour search, surfaces.
pub use plane_types as types;
/// Point feature histograms and plane matching.
pub use plane_descriptor as descriptor;
/// Region-growing plane segmentation.
pub use plane_segment as segment;
/// Rotation estimation from plane normals.
pub use plane_registration as registration;

pub use error::{AlignError, AlignResult};
pub use pipeline::{align_clouds, prepare_cloud, segment_cloud, AlignParams, AlignmentReport};

/// Common imports for cloud alignment.
pub mod prelude {
    pub use crate::{align_clouds, AlignError, AlignParams, AlignmentReport};
    pub use plane_registration::{
        Alignment, Conditioning, CorrespondenceMode, RegistrationParams, RotationSolver,
    };
    pub use plane_segment::{segment, RegionGrowthSegmenter, SegmentationParams};
    pub use plane_types::{KdTreeIndex, NeighborSearch, Plane, PointCloud, SegmentedPlane};
}
