//! Point cloud data structures.
//!
//! A [`PointCloud`] owns an ordered list of [`CloudPoint`]s. The position of a
//! point in that list is its id: every index set, neighbour query and
//! segmented plane refers to points by this id.
//!
//! # Example
//!
//! ```
//! use plane_types::{CloudPoint, PointCloud};
//! use nalgebra::{Point3, Vector3};
//!
//! let mut cloud = PointCloud::new();
//! cloud.push(CloudPoint::with_normal(Point3::new(0.0, 0.0, 1.0), Vector3::z()));
//! cloud.push(CloudPoint::with_normal(Point3::new(1.0, 0.0, 1.0), Vector3::z()));
//!
//! assert_eq!(cloud.len(), 2);
//! assert!(cloud.has_normals());
//! ```

use nalgebra::{Point3, Vector3};

/// A point of a scanned cloud with its local surface attributes.
///
/// Normal and curvature are filled in by normal estimation
/// ([`PointCloud::estimate_normals`]) or read from the input file.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CloudPoint {
    /// The 3D position of the point.
    pub position: Point3<f64>,

    /// Unit surface normal at this point.
    pub normal: Option<Vector3<f64>>,

    /// Surface variation `λ₀ / (λ₀ + λ₁ + λ₂)` of the local neighbourhood.
    /// Zero on a perfect plane.
    pub curvature: Option<f64>,
}

impl CloudPoint {
    /// Creates a point with just a position.
    #[must_use]
    pub const fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            normal: None,
            curvature: None,
        }
    }

    /// Creates a point from x, y, z coordinates.
    ///
    /// # Example
    ///
    /// ```
    /// use plane_types::CloudPoint;
    ///
    /// let point = CloudPoint::from_coords(1.0, 2.0, 3.0);
    /// assert_eq!(point.position.y, 2.0);
    /// ```
    #[must_use]
    pub const fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self::new(Point3::new(x, y, z))
    }

    /// Creates a point with position and normal.
    #[must_use]
    pub const fn with_normal(position: Point3<f64>, normal: Vector3<f64>) -> Self {
        Self {
            position,
            normal: Some(normal),
            curvature: None,
        }
    }

    /// Sets the curvature of this point.
    #[must_use]
    pub const fn with_curvature(mut self, curvature: f64) -> Self {
        self.curvature = Some(curvature);
        self
    }

    /// Returns true if this point has a normal.
    #[must_use]
    pub const fn has_normal(&self) -> bool {
        self.normal.is_some()
    }

    /// The normal, or +Z when none was estimated.
    #[must_use]
    pub fn normal_or_z(&self) -> Vector3<f64> {
        self.normal.unwrap_or_else(Vector3::z)
    }

    /// The curvature, treating an unknown value as perfectly flat.
    #[must_use]
    pub fn curvature_or_flat(&self) -> f64 {
        self.curvature.unwrap_or(0.0)
    }
}

impl Default for CloudPoint {
    fn default() -> Self {
        Self::new(Point3::origin())
    }
}

/// An ordered collection of 3D points.
///
/// # Example
///
/// ```
/// use plane_types::PointCloud;
///
/// let mut cloud = PointCloud::new();
/// cloud.push_coords(0.0, 0.0, 0.0);
/// cloud.push_coords(1.0, 0.0, 0.0);
/// cloud.push_coords(0.0, 1.0, 0.0);
///
/// assert_eq!(cloud.len(), 3);
/// ```
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PointCloud {
    /// The points in this cloud; a point's index is its id.
    pub points: Vec<CloudPoint>,
}

impl PointCloud {
    /// Creates an empty point cloud.
    #[must_use]
    pub const fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Creates a point cloud with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    /// Creates a point cloud from a slice of 3D positions.
    ///
    /// # Example
    ///
    /// ```
    /// use plane_types::PointCloud;
    /// use nalgebra::Point3;
    ///
    /// let cloud = PointCloud::from_positions(&[
    ///     Point3::new(0.0, 0.0, 0.0),
    ///     Point3::new(1.0, 0.0, 0.0),
    /// ]);
    /// assert_eq!(cloud.len(), 2);
    /// assert!(!cloud.has_normals());
    /// ```
    #[must_use]
    pub fn from_positions(positions: &[Point3<f64>]) -> Self {
        let points = positions.iter().map(|p| CloudPoint::new(*p)).collect();
        Self { points }
    }

    /// Creates a point cloud from paired positions and normals.
    ///
    /// Extra entries of the longer slice are ignored.
    #[must_use]
    pub fn from_positions_and_normals(positions: &[Point3<f64>], normals: &[Vector3<f64>]) -> Self {
        let points = positions
            .iter()
            .zip(normals)
            .map(|(p, n)| CloudPoint::with_normal(*p, *n))
            .collect();
        Self { points }
    }

    /// Returns the number of points in the cloud.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if the cloud has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns true if all points have normals.
    #[must_use]
    pub fn has_normals(&self) -> bool {
        !self.points.is_empty() && self.points.iter().all(CloudPoint::has_normal)
    }

    /// Returns true if all points have a curvature value.
    #[must_use]
    pub fn has_curvature(&self) -> bool {
        !self.points.is_empty() && self.points.iter().all(|p| p.curvature.is_some())
    }

    /// Adds a point to the cloud.
    pub fn push(&mut self, point: CloudPoint) {
        self.points.push(point);
    }

    /// Adds a point with the given coordinates.
    pub fn push_coords(&mut self, x: f64, y: f64, z: f64) {
        self.points.push(CloudPoint::from_coords(x, y, z));
    }

    /// Position of the point with the given id.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of bounds.
    #[must_use]
    pub fn position(&self, id: usize) -> Point3<f64> {
        self.points[id].position
    }

    /// Copies all positions out of the cloud.
    #[must_use]
    pub fn positions(&self) -> Vec<Point3<f64>> {
        self.points.iter().map(|p| p.position).collect()
    }

    /// Returns the axis-aligned bounds as `(min, max)`, or `None` if empty.
    #[must_use]
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.points.first()?.position;
        let mut min = first;
        let mut max = first;

        for point in &self.points[1..] {
            let p = &point.position;
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }

        Some((min, max))
    }

    /// Returns the centroid of the point cloud, or `None` if empty.
    #[must_use]
    pub fn centroid(&self) -> Option<Point3<f64>> {
        if self.points.is_empty() {
            return None;
        }

        let sum: Vector3<f64> = self.points.iter().map(|p| p.position.coords).sum();
        Some(Point3::from(sum / self.points.len() as f64))
    }

    /// Centroid of the points with the given ids, or `None` if `ids` is empty.
    #[must_use]
    pub fn centroid_of(&self, ids: &[usize]) -> Option<Point3<f64>> {
        if ids.is_empty() {
            return None;
        }
        let sum: Vector3<f64> = ids.iter().map(|&i| self.points[i].position.coords).sum();
        Some(Point3::from(sum / ids.len() as f64))
    }
}

impl FromIterator<CloudPoint> for PointCloud {
    fn from_iter<I: IntoIterator<Item = CloudPoint>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}
