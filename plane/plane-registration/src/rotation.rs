//! Rotation from a weighted normal covariance (Kabsch with conditioning).

use std::f64::consts::PI;

use nalgebra::{Matrix3, Rotation3, Unit, Vector3};
use tracing::warn;

use crate::alignment::Conditioning;
use crate::error::{RegistrationError, RegistrationResult};

/// Rotation recovered from a covariance, with its singular values sorted
/// in decreasing order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationEstimate {
    /// Proper rotation matrix.
    pub rotation: Matrix3<f64>,
    /// `σ₁ ≥ σ₂ ≥ σ₃`.
    pub singular_values: Vector3<f64>,
    /// How well the singular values pin the rotation down.
    pub conditioning: Conditioning,
}

/// Finds the rotation `R` maximising `tr(R H)` for `H = Σ w s tᵀ`, so that
/// `R s ≈ t`.
///
/// Singular values below `tolerance · σ₁` count as zero. With a single
/// non-zero singular value the rotation is under-determined and the minimal
/// rotation between the dominant singular vectors is returned.
///
/// # Errors
///
/// - [`RegistrationError::SvdFailed`] if the decomposition fails
/// - [`RegistrationError::DegenerateGeometry`] if `H` vanishes
///
/// # Example
///
/// ```
/// use plane_registration::{rotation_from_covariance, Conditioning};
/// use nalgebra::{Matrix3, Rotation3, Vector3};
///
/// let truth = Rotation3::from_euler_angles(0.1, -0.4, 0.7);
/// let normals = [Vector3::x(), Vector3::y(), Vector3::z()];
///
/// let mut h = Matrix3::zeros();
/// for n in &normals {
///     h += n * (truth * n).transpose();
/// }
///
/// let estimate = rotation_from_covariance(&h, 1e-9).unwrap();
/// assert_eq!(estimate.conditioning, Conditioning::Full);
/// assert!((estimate.rotation - truth.matrix()).norm() < 1e-9);
/// ```
pub fn rotation_from_covariance(
    h: &Matrix3<f64>,
    tolerance: f64,
) -> RegistrationResult<RotationEstimate> {
    let svd = h.svd(true, true);
    let u = svd.u.ok_or(RegistrationError::SvdFailed)?;
    let v_t = svd.v_t.ok_or(RegistrationError::SvdFailed)?;
    let sigma = svd.singular_values;

    let mut order = [0, 1, 2];
    order.sort_by(|&a, &b| sigma[b].total_cmp(&sigma[a]));
    let sorted = Vector3::new(sigma[order[0]], sigma[order[1]], sigma[order[2]]);

    if !sorted[0].is_finite() || sorted[0] <= f64::EPSILON {
        return Err(RegistrationError::DegenerateGeometry {
            reason: format!("covariance vanishes (largest singular value {:.3e})", sorted[0]),
        });
    }

    let cutoff = tolerance * sorted[0];
    if sorted[1] < cutoff {
        let from = u.column(order[0]).into_owned();
        let to = v_t.row(order[0]).transpose();
        warn!(
            sigma1 = sorted[0],
            sigma2 = sorted[1],
            "All plane normals are parallel; rotation about them is unconstrained"
        );
        return Ok(RotationEstimate {
            rotation: minimal_rotation(&from, &to),
            singular_values: sorted,
            conditioning: Conditioning::SingleAxis,
        });
    }

    let mut v = v_t.transpose();
    let mut rotation = v * u.transpose();

    // Reflection: flip the singular vector that carries the least weight
    if rotation.determinant() < 0.0 {
        for i in 0..3 {
            v[(i, order[2])] = -v[(i, order[2])];
        }
        rotation = v * u.transpose();
    }

    let conditioning = if sorted[2] < cutoff {
        Conditioning::Planar
    } else {
        Conditioning::Full
    };

    Ok(RotationEstimate {
        rotation,
        singular_values: sorted,
        conditioning,
    })
}

/// Smallest rotation taking direction `from` onto direction `to`.
///
/// Opposite directions are related by a half turn about an axis
/// perpendicular to `from`.
#[must_use]
pub fn minimal_rotation(from: &Vector3<f64>, to: &Vector3<f64>) -> Matrix3<f64> {
    if let Some(rotation) = Rotation3::rotation_between(from, to) {
        return rotation.into_inner();
    }

    let from = from.normalize();
    let helper = if from.x.abs() <= from.y.abs() && from.x.abs() <= from.z.abs() {
        Vector3::x()
    } else if from.y.abs() <= from.z.abs() {
        Vector3::y()
    } else {
        Vector3::z()
    };
    let axis = Unit::new_normalize(from.cross(&helper));
    Rotation3::from_axis_angle(&axis, PI).into_inner()
}
