//! Committed planar regions.

use nalgebra::{Point3, Vector3};

use crate::plane::Plane;

/// A plane together with the cloud points that support it.
///
/// Produced once by segmentation and never modified afterwards. Planes taken
/// from a mesh have no member points; their `surface` is the exact polygon
/// area instead of an estimate.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SegmentedPlane {
    /// Fitted plane parameters.
    pub plane: Plane,
    /// Ids of member points, in admission order.
    pub indices: Vec<usize>,
    /// Estimated area of the region (≥ 0).
    pub surface: f64,
    /// Inlier threshold the region was committed with. Every member lies
    /// within this distance of `plane`.
    pub epsilon: f64,
}

impl SegmentedPlane {
    /// Creates a segmented plane from its parts.
    #[must_use]
    pub fn new(plane: Plane, indices: Vec<usize>, surface: f64, epsilon: f64) -> Self {
        Self {
            plane,
            indices,
            surface: surface.max(0.0),
            epsilon,
        }
    }

    /// Creates a plane taken from a mesh face, with a known exact area.
    ///
    /// # Example
    ///
    /// ```
    /// use plane_types::{Plane, SegmentedPlane};
    /// use nalgebra::{Point3, Vector3};
    ///
    /// let plane = Plane::from_point_normal(Point3::origin(), Vector3::z()).unwrap();
    /// let face = SegmentedPlane::from_mesh(plane, 12.5);
    /// assert!(face.is_empty());
    /// assert_eq!(face.surface, 12.5);
    /// ```
    #[must_use]
    pub fn from_mesh(plane: Plane, surface: f64) -> Self {
        Self::new(plane, Vec::new(), surface, 0.0)
    }

    /// Unit normal of the plane.
    #[must_use]
    pub fn normal(&self) -> Vector3<f64> {
        self.plane.normal
    }

    /// Centroid of the plane.
    #[must_use]
    pub fn centroid(&self) -> Point3<f64> {
        self.plane.centroid
    }

    /// Number of member points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns true if the plane has no member points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}
