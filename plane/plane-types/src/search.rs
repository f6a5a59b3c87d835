//! Nearest-neighbour search over a fixed point set.
//!
//! The segmentation engine only needs two queries, k-nearest and
//! fixed-radius, so it talks to the index through [`NeighborSearch`]. The
//! default implementation, [`KdTreeIndex`], wraps an immutable kiddo KD-tree
//! built once over the whole cloud. The immutable layout accepts any number
//! of points sharing a coordinate, which grids and mesh samples produce.
//!
//! Results are always ordered by `(squared distance, index)` so that repeated
//! runs over the same input produce the same segmentation.

use std::cmp::Ordering;

use kiddo::{ImmutableKdTree, SquaredEuclidean};
use nalgebra::Point3;

use crate::cloud::PointCloud;

/// One result of a neighbour query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Id of the neighbouring point.
    pub index: usize,
    /// Squared Euclidean distance to the query.
    pub distance_sq: f64,
}

impl Neighbor {
    /// Euclidean distance to the query.
    #[must_use]
    pub fn distance(&self) -> f64 {
        self.distance_sq.sqrt()
    }
}

/// A nearest-neighbour index over a fixed point set.
///
/// Implementations must be deterministic and return results sorted by
/// increasing distance, ties by increasing index.
pub trait NeighborSearch: Send + Sync {
    /// Number of indexed points.
    fn len(&self) -> usize;

    /// Returns true if nothing is indexed.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `k` points closest to `query` (fewer if the index is smaller).
    /// A query located on an indexed point returns that point first.
    fn k_nearest(&self, query: &Point3<f64>, k: usize) -> Vec<Neighbor>;

    /// All points within `radius` of `query`.
    fn radius_search(&self, query: &Point3<f64>, radius: f64) -> Vec<usize>;
}

fn by_distance_then_index(a: &Neighbor, b: &Neighbor) -> Ordering {
    a.distance_sq
        .partial_cmp(&b.distance_sq)
        .unwrap_or(Ordering::Equal)
        .then(a.index.cmp(&b.index))
}

/// KD-tree backed [`NeighborSearch`].
///
/// # Example
///
/// ```
/// use plane_types::{KdTreeIndex, NeighborSearch};
/// use nalgebra::Point3;
///
/// let points = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.1, 0.0),
///     Point3::new(5.0, 0.2, 0.3),
/// ];
/// let index = KdTreeIndex::from_points(&points);
///
/// let nearest = index.k_nearest(&Point3::new(0.9, 0.0, 0.0), 1);
/// assert_eq!(nearest[0].index, 1);
/// assert_eq!(index.radius_search(&Point3::origin(), 2.0), vec![0, 1]);
/// ```
pub struct KdTreeIndex {
    tree: Option<ImmutableKdTree<f64, 3>>,
    len: usize,
}

impl KdTreeIndex {
    /// Builds an index over the given positions; ids are slice positions.
    #[must_use]
    pub fn from_points(points: &[Point3<f64>]) -> Self {
        let coords: Vec<[f64; 3]> = points.iter().map(|p| [p.x, p.y, p.z]).collect();
        let tree = (!coords.is_empty()).then(|| ImmutableKdTree::new_from_slice(&coords));
        Self {
            tree,
            len: points.len(),
        }
    }

    /// Builds an index over every point of a cloud.
    #[must_use]
    pub fn from_cloud(cloud: &PointCloud) -> Self {
        Self::from_points(&cloud.positions())
    }
}

impl std::fmt::Debug for KdTreeIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KdTreeIndex").field("len", &self.len).finish()
    }
}

impl NeighborSearch for KdTreeIndex {
    fn len(&self) -> usize {
        self.len
    }

    #[allow(clippy::cast_possible_truncation)]
    fn k_nearest(&self, query: &Point3<f64>, k: usize) -> Vec<Neighbor> {
        let k = k.min(self.len);
        let (Some(tree), Some(k)) = (self.tree.as_ref(), std::num::NonZeroUsize::new(k)) else {
            return Vec::new();
        };

        let mut found: Vec<Neighbor> = tree
            .nearest_n::<SquaredEuclidean>(&[query.x, query.y, query.z], k)
            .into_iter()
            .map(|n| Neighbor {
                index: n.item as usize,
                distance_sq: n.distance,
            })
            .collect();
        found.sort_by(by_distance_then_index);
        found
    }

    #[allow(clippy::cast_possible_truncation)]
    fn radius_search(&self, query: &Point3<f64>, radius: f64) -> Vec<usize> {
        let Some(tree) = self.tree.as_ref().filter(|_| radius >= 0.0) else {
            return Vec::new();
        };

        let mut found: Vec<Neighbor> = tree
            .within::<SquaredEuclidean>(&[query.x, query.y, query.z], radius * radius)
            .into_iter()
            .map(|n| Neighbor {
                index: n.item as usize,
                distance_sq: n.distance,
            })
            .collect();
        found.sort_by(by_distance_then_index);
        found.into_iter().map(|n| n.index).collect()
    }
}

/// Brute-force [`NeighborSearch`] for tiny point sets and tests.
#[derive(Debug, Clone, Default)]
pub struct LinearIndex {
    points: Vec<Point3<f64>>,
}

impl LinearIndex {
    /// Indexes the given positions.
    #[must_use]
    pub fn from_points(points: &[Point3<f64>]) -> Self {
        Self {
            points: points.to_vec(),
        }
    }

    fn all_sorted(&self, query: &Point3<f64>) -> Vec<Neighbor> {
        let mut all: Vec<Neighbor> = self
            .points
            .iter()
            .enumerate()
            .map(|(index, p)| Neighbor {
                index,
                distance_sq: (p - query).norm_squared(),
            })
            .collect();
        all.sort_by(by_distance_then_index);
        all
    }
}

impl NeighborSearch for LinearIndex {
    fn len(&self) -> usize {
        self.points.len()
    }

    fn k_nearest(&self, query: &Point3<f64>, k: usize) -> Vec<Neighbor> {
        let mut all = self.all_sorted(query);
        all.truncate(k);
        all
    }

    fn radius_search(&self, query: &Point3<f64>, radius: f64) -> Vec<usize> {
        let r2 = radius * radius;
        self.all_sorted(query)
            .into_iter()
            .take_while(|n| n.distance_sq <= r2)
            .map(|n| n.index)
            .collect()
    }
}
