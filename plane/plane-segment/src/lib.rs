//! Region-growing plane segmentation.
//!
//! [`RegionGrowthSegmenter`] turns a point cloud with normals and curvature
//! into a list of [`SegmentedPlane`](plane_types::SegmentedPlane)s, no point
//! belonging to two planes.
//!
//! # Algorithm
//!
//! 1. **Seed** - the unprocessed point with the smallest curvature
//! 2. **Initialise** - its `k` nearest available neighbours form the first
//!    region; twice their mean spacing is the search radius. Seeds whose
//!    neighbourhood is far wider than those of earlier regions are rejected
//!    as leftovers of already segmented areas
//! 3. **Grow** - every iteration searches around the newest members and
//!    admits points within epsilon of the current plane. While the region is
//!    small the plane is refitted and epsilon tracks the RMS distance of the
//!    members
//! 4. **Validate** - after a few iterations a point feature histogram must
//!    show the region is planar; radius and epsilon then double
//! 5. **Commit** - once nothing more is admitted, outliers are pruned and the
//!    region becomes a plane
//!
//! The run stops when 80% of the cloud is assigned, no seed is left, or it
//! is stopped through its [`SegmentationControl`].
//!
//! # Example
//!
//! ```no_run
//! use plane_segment::{segment, SegmentationParams};
//! use plane_types::PointCloud;
//!
//! let mut cloud = PointCloud::load("room.xyz").unwrap();
//! cloud.estimate_normals(15).unwrap();
//!
//! let planes = segment(&cloud, SegmentationParams::default()).unwrap();
//! for plane in &planes {
//!     println!("{} points, {:.2} m²", plane.len(), plane.surface);
//! }
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod control;
mod error;
mod events;
mod params;
mod segmenter;
mod state;

pub use control::SegmentationControl;
pub use error::{SegmentError, SegmentResult};
pub use events::{FinishReason, GrowthOutcome, RejectionReason, SegmentationEvent, StepOutcome};
pub use params::{RejectionPolicy, SegmentationParams, SAFETY_FACTOR, SAFETY_WARMUP_PLANES};
pub use segmenter::{segment, RegionGrowthSegmenter};
pub use state::{GrowthPhase, RegionGrowthState};
