//! 125-bin point feature histograms.

use std::f64::consts::PI;

use nalgebra::{Point3, Vector3};

use crate::features::{compute_pair_features, PairFeatures};

/// Subdivisions per angular feature.
pub const PFH_SPLITS: usize = 5;

/// Number of histogram bins (`PFH_SPLITS³`).
pub const PFH_BINS: usize = PFH_SPLITS * PFH_SPLITS * PFH_SPLITS;

/// Bin holding pairs whose three angular features are all centred, i.e.
/// coplanar points with parallel normals.
pub const PLANE_BIN: usize = 62;

/// A point feature histogram. Bins sum to 100 (percent of pairs) for any
/// neighbourhood of at least two points.
#[derive(Debug, Clone, PartialEq)]
pub struct PfhSignature {
    /// Per-bin share of pairs, in percent.
    pub histogram: [f64; PFH_BINS],
}

impl Default for PfhSignature {
    fn default() -> Self {
        Self {
            histogram: [0.0; PFH_BINS],
        }
    }
}

impl PfhSignature {
    /// Value of one bin.
    #[must_use]
    pub fn bin(&self, index: usize) -> f64 {
        self.histogram[index]
    }

    /// Percentage of pairs that look coplanar.
    #[must_use]
    pub fn planar_share(&self) -> f64 {
        self.histogram[PLANE_BIN]
    }

    /// Sum of all bins.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.histogram.iter().sum()
    }

    /// L1 distance between two histograms.
    #[must_use]
    pub fn l1_distance(&self, other: &Self) -> f64 {
        self.histogram
            .iter()
            .zip(&other.histogram)
            .map(|(a, b)| (a - b).abs())
            .sum()
    }
}

fn split_index(value: f64, lower: f64, range: f64) -> usize {
    let raw = (PFH_SPLITS as f64 * (value - lower) / range).floor();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let index = raw.clamp(0.0, (PFH_SPLITS - 1) as f64) as usize;
    index
}

/// Histogram bin of one pair: `theta + 5·alpha + 25·phi` over the split
/// indices.
#[must_use]
pub fn bin_index(features: &PairFeatures) -> usize {
    let f_theta = split_index(features.theta, -PI, 2.0 * PI);
    let f_alpha = split_index(features.alpha, -1.0, 2.0);
    let f_phi = split_index(features.phi, -1.0, 2.0);
    f_theta + PFH_SPLITS * f_alpha + PFH_SPLITS * PFH_SPLITS * f_phi
}

/// Computes the histogram of the neighbourhood `indices` of a point set.
///
/// Every unordered pair contributes `100 / (n(n-1)/2)`. Pairs without a
/// Darboux frame (coincident points, line along the normal) are skipped, so
/// their share is left out of every bin. Fewer than two indices give an
/// empty histogram.
#[must_use]
pub fn compute_pfh(
    positions: &[Point3<f64>],
    normals: &[Vector3<f64>],
    indices: &[usize],
) -> PfhSignature {
    let mut signature = PfhSignature::default();
    let n = indices.len();
    if n < 2 {
        return signature;
    }

    let increment = 100.0 / (n * (n - 1) / 2) as f64;
    for (i_idx, &i) in indices.iter().enumerate() {
        for &j in &indices[..i_idx] {
            let Some(features) =
                compute_pair_features(&positions[i], &normals[i], &positions[j], &normals[j])
            else {
                continue;
            };
            signature.histogram[bin_index(&features)] += increment;
        }
    }
    signature
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_features_land_in_plane_bin() {
        assert_eq!(bin_index(&PairFeatures::default()), PLANE_BIN);
    }

    #[test]
    fn test_extremes_are_clamped() {
        let f = PairFeatures {
            theta: PI,
            alpha: 1.0,
            phi: 1.0,
            distance: 1.0,
        };
        assert_eq!(bin_index(&f), PFH_BINS - 1);

        let f = PairFeatures {
            theta: -PI,
            alpha: -1.0,
            phi: -1.0,
            distance: 1.0,
        };
        assert_eq!(bin_index(&f), 0);
    }

    #[test]
    fn test_flat_patch_fills_plane_bin() {
        let positions: Vec<_> = (0..20)
            .map(|i| {
                let t = f64::from(i);
                Point3::new((t * 0.7).sin(), (t * 1.3).cos(), 0.0)
            })
            .collect();
        let normals = vec![Vector3::z(); positions.len()];
        let ids: Vec<usize> = (0..positions.len()).collect();

        let sig = compute_pfh(&positions, &normals, &ids);
        assert_relative_eq!(sig.total(), 100.0, epsilon = 1e-9);
        assert_relative_eq!(sig.planar_share(), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_points_along_normal_are_skipped() {
        let positions: Vec<_> = (0..20)
            .map(|i| Point3::new(0.0, 0.0, f64::from(i) * 0.01))
            .collect();
        let normals = vec![Vector3::z(); positions.len()];
        let ids: Vec<usize> = (0..positions.len()).collect();

        let sig = compute_pfh(&positions, &normals, &ids);
        assert_relative_eq!(sig.total(), 0.0);
        assert_relative_eq!(sig.planar_share(), 0.0);
    }

    #[test]
    fn test_coincident_points_are_skipped() {
        let positions = vec![Point3::new(1.0, 2.0, 3.0); 20];
        let normals: Vec<_> = (0..20)
            .map(|i| if i % 2 == 0 { Vector3::z() } else { Vector3::x() })
            .collect();
        let ids: Vec<usize> = (0..positions.len()).collect();

        let sig = compute_pfh(&positions, &normals, &ids);
        assert_relative_eq!(sig.planar_share(), 0.0);
    }

    #[test]
    fn test_tiny_neighbourhood_is_empty() {
        let positions = vec![Point3::origin()];
        let normals = vec![Vector3::z()];
        let sig = compute_pfh(&positions, &normals, &[0]);
        assert_relative_eq!(sig.total(), 0.0);
    }

    #[test]
    fn test_l1_distance() {
        let mut a = PfhSignature::default();
        let mut b = PfhSignature::default();
        a.histogram[3] = 10.0;
        b.histogram[3] = 4.0;
        b.histogram[100] = 2.0;
        assert_relative_eq!(a.l1_distance(&b), 8.0);
        assert_relative_eq!(b.l1_distance(&a), 8.0);
        assert_relative_eq!(a.l1_distance(&a), 0.0);
    }
}
