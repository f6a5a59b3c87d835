//! Outcomes and progress events of a segmentation run.

use plane_types::SegmentedPlane;

/// Why a region was not committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RejectionReason {
    /// The seed neighbourhood is much wider than those of earlier regions;
    /// the seed sits among leftovers of already segmented areas.
    SparseRegion,
    /// The planarity check failed.
    NotPlanar,
    /// Too few points to support a plane.
    TooSmall,
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FinishReason {
    /// Enough of the cloud was assigned to planes.
    Coverage,
    /// No unprocessed point is left to seed from.
    Exhausted,
    /// Stopped through the control handle.
    Stopped,
}

/// Result of growing one region.
#[derive(Debug, Clone, PartialEq)]
pub enum GrowthOutcome {
    /// The region became a plane.
    Committed(SegmentedPlane),
    /// The region was discarded.
    Rejected(RejectionReason),
    /// The run was stopped mid-growth.
    Cancelled,
}

/// Result of one engine step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// A plane was committed at this position of the plane list.
    Committed(usize),
    /// The region grown from `seed` was rejected.
    Rejected {
        /// Seed of the rejected region.
        seed: usize,
        /// Why it was rejected.
        reason: RejectionReason,
    },
    /// Paused; nothing was done.
    Paused,
    /// The run is over.
    Finished(FinishReason),
}

/// Notification sent to the segmentation observer.
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentationEvent {
    /// A plane was committed.
    PlaneSegmented {
        /// Position in the plane list.
        index: usize,
        /// The committed plane.
        plane: SegmentedPlane,
    },
    /// A region was discarded.
    RegionRejected {
        /// Seed of the region.
        seed: usize,
        /// Why it was discarded.
        reason: RejectionReason,
    },
    /// The run ended.
    Finished {
        /// Why it ended.
        reason: FinishReason,
        /// Number of committed planes.
        planes: usize,
        /// Number of points assigned to planes.
        assigned: usize,
    },
}
