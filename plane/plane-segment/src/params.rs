//! Segmentation parameters.

use std::time::Duration;

use plane_descriptor::PLANE_THRESHOLD;

use crate::error::{SegmentError, SegmentResult};

/// Number of committed-or-growing planes after which the sparse-region
/// check becomes active.
pub const SAFETY_WARMUP_PLANES: usize = 10;

/// A seed neighbourhood wider than this factor times the mean k-th
/// neighbour distance of earlier regions is considered sparse.
pub const SAFETY_FACTOR: f64 = 3.0;

/// What happens to the points of a rejected region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RejectionPolicy {
    /// Only the seed is excluded; the rest stays available for later seeds.
    #[default]
    ExcludeSeed,
    /// As `ExcludeSeed`, and a region rejected as sparse also excludes its
    /// whole initial neighbourhood.
    ExcludeNeighborhood,
}

/// Parameters for region-growing segmentation.
///
/// # Example
///
/// ```
/// use plane_segment::SegmentationParams;
///
/// let params = SegmentationParams::new()
///     .with_k(30)
///     .with_coverage_ratio(0.9)
///     .with_max_normal_angle(None);
/// assert!(params.validate().is_ok());
///
/// assert!(SegmentationParams::new().with_k(2).validate().is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SegmentationParams {
    /// Size of the initial seed neighbourhood, seed included (default: 20).
    pub k: usize,
    /// Growth iteration at which the region's planarity is checked
    /// (default: 3).
    pub phase1_iterations: usize,
    /// Below this member count the plane and epsilon are refitted every
    /// iteration (default: 500).
    pub min_stable_size: usize,
    /// Growth iterations after which a region is considered converged
    /// (default: 1000).
    pub max_iterations: usize,
    /// Fraction of the cloud that must be assigned for the run to finish
    /// successfully (default: 0.8).
    pub coverage_ratio: f64,
    /// Minimum coplanar-pair share, in percent, of the planarity test
    /// (default: 50).
    pub plane_threshold: f64,
    /// Maximum number of members the planarity test looks at; larger
    /// regions are subsampled with a fixed stride (default: 128).
    pub validation_sample: usize,
    /// Candidates whose normal deviates more than this angle (radians) from
    /// the plane normal are refused. `None` disables the check
    /// (default: 30°).
    pub max_normal_angle: Option<f64>,
    /// Lower bound of epsilon as a fraction of the local point spacing, so
    /// noise-free regions still admit neighbours (default: 0.05).
    pub epsilon_floor_ratio: f64,
    /// Regions with fewer members after refinement are rejected
    /// (default: 30).
    pub min_plane_points: usize,
    /// Fate of rejected regions (default: [`RejectionPolicy::ExcludeSeed`]).
    pub rejection_policy: RejectionPolicy,
    /// Sleep between control polls while paused (default: 10 ms).
    pub pause_poll: Duration,
}

impl Default for SegmentationParams {
    fn default() -> Self {
        Self {
            k: 20,
            phase1_iterations: 3,
            min_stable_size: 500,
            max_iterations: 1000,
            coverage_ratio: 0.8,
            plane_threshold: PLANE_THRESHOLD,
            validation_sample: 128,
            max_normal_angle: Some(30f64.to_radians()),
            epsilon_floor_ratio: 0.05,
            min_plane_points: 30,
            rejection_policy: RejectionPolicy::ExcludeSeed,
            pause_poll: Duration::from_millis(10),
        }
    }
}

impl SegmentationParams {
    /// Creates parameters with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset for noisy scans: larger neighbourhoods, a looser normal check
    /// and a higher epsilon floor.
    #[must_use]
    pub fn for_noisy_scans() -> Self {
        Self {
            k: 40,
            max_normal_angle: Some(45f64.to_radians()),
            epsilon_floor_ratio: 0.25,
            rejection_policy: RejectionPolicy::ExcludeNeighborhood,
            ..Self::default()
        }
    }

    /// Preset for synthetic or very clean data: small seeds and a strict
    /// normal check.
    #[must_use]
    pub fn for_clean_scans() -> Self {
        Self {
            k: 12,
            max_normal_angle: Some(15f64.to_radians()),
            epsilon_floor_ratio: 0.02,
            ..Self::default()
        }
    }

    /// Sets the initial neighbourhood size.
    #[must_use]
    pub const fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Sets the iteration of the planarity check.
    #[must_use]
    pub const fn with_phase1_iterations(mut self, iterations: usize) -> Self {
        self.phase1_iterations = iterations;
        self
    }

    /// Sets the refit size limit.
    #[must_use]
    pub const fn with_min_stable_size(mut self, size: usize) -> Self {
        self.min_stable_size = size;
        self
    }

    /// Sets the growth iteration cap.
    #[must_use]
    pub const fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Sets the coverage at which the run stops.
    #[must_use]
    pub const fn with_coverage_ratio(mut self, ratio: f64) -> Self {
        self.coverage_ratio = ratio;
        self
    }

    /// Sets the planarity threshold (percent).
    #[must_use]
    pub const fn with_plane_threshold(mut self, threshold: f64) -> Self {
        self.plane_threshold = threshold;
        self
    }

    /// Sets the maximum normal deviation (radians), or disables the check.
    #[must_use]
    pub const fn with_max_normal_angle(mut self, angle: Option<f64>) -> Self {
        self.max_normal_angle = angle;
        self
    }

    /// Sets the epsilon floor ratio.
    #[must_use]
    pub const fn with_epsilon_floor_ratio(mut self, ratio: f64) -> Self {
        self.epsilon_floor_ratio = ratio;
        self
    }

    /// Sets the minimum number of points of a committed plane.
    #[must_use]
    pub const fn with_min_plane_points(mut self, points: usize) -> Self {
        self.min_plane_points = points;
        self
    }

    /// Sets the rejection policy.
    #[must_use]
    pub const fn with_rejection_policy(mut self, policy: RejectionPolicy) -> Self {
        self.rejection_policy = policy;
        self
    }

    /// Sets the pause poll interval.
    #[must_use]
    pub const fn with_pause_poll(mut self, poll: Duration) -> Self {
        self.pause_poll = poll;
        self
    }

    /// Checks that every parameter is in range.
    ///
    /// # Errors
    ///
    /// Returns [`SegmentError::Configuration`] naming the first invalid
    /// parameter.
    pub fn validate(&self) -> SegmentResult<()> {
        let invalid = |reason: String| Err(SegmentError::Configuration(reason));

        if self.k < 3 {
            return invalid(format!("k must be at least 3, got {}", self.k));
        }
        if self.phase1_iterations == 0 {
            return invalid("phase1_iterations must be positive".to_string());
        }
        if self.max_iterations == 0 {
            return invalid("max_iterations must be positive".to_string());
        }
        if !(self.coverage_ratio > 0.0 && self.coverage_ratio <= 1.0) {
            return invalid(format!(
                "coverage_ratio must be in (0, 1], got {}",
                self.coverage_ratio
            ));
        }
        if !(0.0..=100.0).contains(&self.plane_threshold) {
            return invalid(format!(
                "plane_threshold must be a percentage, got {}",
                self.plane_threshold
            ));
        }
        if self.validation_sample < 2 {
            return invalid("validation_sample must be at least 2".to_string());
        }
        if let Some(angle) = self.max_normal_angle {
            if !(angle > 0.0 && angle <= std::f64::consts::FRAC_PI_2) {
                return invalid(format!("max_normal_angle must be in (0, π/2], got {angle}"));
            }
        }
        if !(self.epsilon_floor_ratio >= 0.0 && self.epsilon_floor_ratio.is_finite()) {
            return invalid(format!(
                "epsilon_floor_ratio must be non-negative, got {}",
                self.epsilon_floor_ratio
            ));
        }
        if self.min_plane_points < 3 {
            return invalid(format!(
                "min_plane_points must be at least 3, got {}",
                self.min_plane_points
            ));
        }
        Ok(())
    }
}
