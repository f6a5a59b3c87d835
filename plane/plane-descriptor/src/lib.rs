//! Point feature histograms (PFH) for planes.
//!
//! The same 125-bin histogram serves two purposes:
//!
//! - **Planarity test** - [`is_valid_plane`] checks that most point pairs of a
//!   growing region are coplanar with parallel normals (bin
//!   [`PLANE_BIN`])
//! - **Plane matching** - [`build_signatures`] describes every segmented
//!   plane by the arrangement of its neighbouring planes, and
//!   [`match_planes`] pairs source and target planes greedily by L1
//!   histogram distance
//!
//! # Histogram layout
//!
//! Each unordered pair yields three angular features (see [`PairFeatures`]),
//! each split into [`PFH_SPLITS`] intervals. The bin is
//! `f_theta + 5·f_alpha + 25·f_phi` and every pair adds
//! `100 / (n(n-1)/2)`, so a histogram is a percentage distribution.

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod features;
mod histogram;
mod matching;
mod planarity;

pub use features::{compute_pair_features, PairFeatures};
pub use histogram::{bin_index, compute_pfh, PfhSignature, PFH_BINS, PFH_SPLITS, PLANE_BIN};
pub use matching::{build_signatures, match_nearest, match_planes, CENTER_KNN};
pub use planarity::{cloud_pfh, is_valid_plane, PLANE_THRESHOLD};
