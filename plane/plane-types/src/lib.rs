//! Core types for plane-based point cloud registration.
//!
//! This crate holds everything the segmentation and registration engines
//! share:
//!
//! - **Point cloud** - [`CloudPoint`] and [`PointCloud`], with XYZ/PCD loading
//!   and PCA normal/curvature estimation
//! - **Neighbour search** - the [`NeighborSearch`] trait and its KD-tree
//!   implementation [`KdTreeIndex`]
//! - **Planes** - least-squares [`Plane`] fits, committed [`SegmentedPlane`]s
//!   and their surface estimation
//! - **Bookkeeping** - [`IndexSet`] of unprocessed/excluded point ids
//! - **Notifications** - the [`Observer`] hook used for progress events
//!
//! # Example
//!
//! ```
//! use plane_types::{KdTreeIndex, NeighborSearch, Plane, PointCloud};
//! use nalgebra::Point3;
//!
//! let positions: Vec<_> = (0..100)
//!     .map(|i| {
//!         let t = f64::from(i);
//!         Point3::new((t * 0.37).sin(), (t * 0.71).cos(), 2.0 + 1e-4 * (t * 1.3).sin())
//!     })
//!     .collect();
//! let mut cloud = PointCloud::from_positions(&positions);
//! cloud.estimate_normals(10).unwrap();
//!
//! let index = KdTreeIndex::from_cloud(&cloud);
//! let ids: Vec<usize> = index
//!     .k_nearest(&positions[0], 20)
//!     .into_iter()
//!     .map(|n| n.index)
//!     .collect();
//!
//! let plane = Plane::fit(&cloud, &ids).unwrap();
//! assert!(plane.normal.z.abs() > 0.99);
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod cloud;
mod error;
mod index_set;
pub mod io;
mod normals;
mod observer;
mod plane;
mod search;
mod segmented;
mod surface;

pub use cloud::{CloudPoint, PointCloud};
pub use error::{TypesError, TypesResult};
pub use index_set::IndexSet;
pub use io::PointCloudFormat;
pub use normals::{fit_local_surface, LocalSurface, NormalParams};
pub use observer::{NoopObserver, Observer, SharedObserver};
pub use plane::Plane;
pub use search::{KdTreeIndex, LinearIndex, Neighbor, NeighborSearch};
pub use segmented::SegmentedPlane;
pub use surface::{estimate_plane_surface, estimate_planes_surface, projected_area, SurfaceMethod};
