//! Result of a plane-based alignment.

use nalgebra::{Matrix3, Matrix4, Point3, Rotation3, Unit, Vector3};

/// How well the plane normals constrained the rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Conditioning {
    /// Normals span all three directions.
    Full,
    /// Normals span a plane; the third axis follows from orientation.
    Planar,
    /// All normals are parallel. Rotation about them is unconstrained and
    /// the smallest rotation consistent with them is reported.
    SingleAxis,
    /// No plane survived selection; the identity is reported.
    Unconstrained,
}

/// Rigid transform mapping the source scan onto the target scan.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Alignment {
    /// Proper rotation (orthonormal, determinant +1).
    pub rotation: Matrix3<f64>,
    /// Translation. Plane normals say nothing about it; always zero.
    pub translation: Vector3<f64>,
    /// Singular values of the weighted normal covariance, decreasing.
    pub singular_values: Vector3<f64>,
    /// How well the rotation is determined.
    pub conditioning: Conditioning,
    /// Source planes that took part.
    pub source_planes: usize,
    /// Target planes that took part.
    pub target_planes: usize,
    /// Descriptor-matched `(source, target)` plane pairs, indexed into the
    /// full plane lists. Empty unless descriptors were used.
    pub correspondences: Vec<(usize, usize)>,
}

impl Alignment {
    /// The identity, reported when there is nothing to align.
    #[must_use]
    pub fn identity() -> Self {
        Self {
            rotation: Matrix3::identity(),
            translation: Vector3::zeros(),
            singular_values: Vector3::zeros(),
            conditioning: Conditioning::Unconstrained,
            source_planes: 0,
            target_planes: 0,
            correspondences: Vec::new(),
        }
    }

    /// The rotation as a typed rotation.
    #[must_use]
    pub fn rotation3(&self) -> Rotation3<f64> {
        Rotation3::from_matrix_unchecked(self.rotation)
    }

    /// Rotation angle in radians, in `[0, π]`.
    #[must_use]
    pub fn angle(&self) -> f64 {
        self.rotation3().angle()
    }

    /// Rotation axis, `None` for the identity.
    #[must_use]
    pub fn axis(&self) -> Option<Unit<Vector3<f64>>> {
        self.rotation3().axis()
    }

    /// Applies the transform to a point.
    #[must_use]
    pub fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.rotation * point.coords + self.translation)
    }

    /// Applies the rotation to a direction.
    #[must_use]
    pub fn transform_vector(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        self.rotation * vector
    }

    /// Converts to a 4x4 homogeneous transformation matrix.
    #[must_use]
    pub fn to_matrix4(&self) -> Matrix4<f64> {
        let mut mat = Matrix4::identity();
        mat.fixed_view_mut::<3, 3>(0, 0).copy_from(&self.rotation);
        mat.fixed_view_mut::<3, 1>(0, 3).copy_from(&self.translation);
        mat
    }

    /// Returns true if this transform is approximately the identity.
    #[must_use]
    pub fn is_identity(&self, epsilon: f64) -> bool {
        (self.rotation - Matrix3::identity()).norm() < epsilon && self.translation.norm() < epsilon
    }
}

impl Default for Alignment {
    fn default() -> Self {
        Self::identity()
    }
}
