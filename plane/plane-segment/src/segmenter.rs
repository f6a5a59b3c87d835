//! The region-growing segmentation engine.

use rayon::prelude::*;
use tracing::{debug, info};

use plane_descriptor::is_valid_plane;
use plane_types::{
    projected_area, IndexSet, KdTreeIndex, Neighbor, NeighborSearch, Observer, Plane, PointCloud,
    SegmentedPlane, SharedObserver, SurfaceMethod,
};

use crate::control::SegmentationControl;
use crate::error::{SegmentError, SegmentResult};
use crate::events::{
    FinishReason, GrowthOutcome, RejectionReason, SegmentationEvent, StepOutcome,
};
use crate::params::{RejectionPolicy, SegmentationParams, SAFETY_FACTOR, SAFETY_WARMUP_PLANES};
use crate::state::{GrowthPhase, RegionGrowthState};

/// Turns an indexed point cloud into planar regions.
///
/// Seeds are picked flattest-first. Each seed's neighbourhood is grown
/// outwards, admitting points close to the current plane estimate, until no
/// more points qualify. Converged regions that pass the planarity and size
/// checks become [`SegmentedPlane`]s and their points are claimed; the run
/// ends once enough of the cloud is claimed or no seed is left.
///
/// # Example
///
/// ```
/// use plane_segment::{RegionGrowthSegmenter, SegmentationParams};
/// use plane_types::{KdTreeIndex, PointCloud};
/// use nalgebra::Point3;
///
/// let positions: Vec<_> = (0..600)
///     .map(|i| {
///         let t = f64::from(i);
///         Point3::new((t * 0.618_034).fract(), (t * 0.414_214).fract(), 1.0 + 1e-4 * (t * 7.1).sin())
///     })
///     .collect();
/// let mut cloud = PointCloud::from_positions(&positions);
/// cloud.estimate_normals(12).unwrap();
///
/// let index = KdTreeIndex::from_cloud(&cloud);
/// let mut segmenter =
///     RegionGrowthSegmenter::new(&cloud, &index, SegmentationParams::default()).unwrap();
/// let planes = segmenter.run();
///
/// assert!(!planes.is_empty());
/// assert!(planes[0].normal().z.abs() > 0.99);
/// ```
#[derive(Debug)]
pub struct RegionGrowthSegmenter<'a, S: NeighborSearch = KdTreeIndex> {
    cloud: &'a PointCloud,
    index: &'a S,
    params: SegmentationParams,
    indices: IndexSet,
    planes: Vec<SegmentedPlane>,
    plane_nb: usize,
    safety_distance: f64,
    assigned: usize,
    phase: GrowthPhase,
    finished: Option<FinishReason>,
    control: SegmentationControl,
    observer: SharedObserver<SegmentationEvent>,
}

impl<'a, S: NeighborSearch> RegionGrowthSegmenter<'a, S> {
    /// Creates an engine over `cloud`, searched through `index`.
    ///
    /// # Errors
    ///
    /// Returns [`SegmentError::Configuration`] if the parameters are invalid,
    /// the index does not cover exactly the cloud, or the cloud has no
    /// normals.
    pub fn new(cloud: &'a PointCloud, index: &'a S, params: SegmentationParams) -> SegmentResult<Self> {
        params.validate()?;
        if index.len() != cloud.len() {
            return Err(SegmentError::Configuration(format!(
                "index covers {} points but the cloud has {}",
                index.len(),
                cloud.len()
            )));
        }
        if !cloud.is_empty() && !cloud.has_normals() {
            return Err(SegmentError::Configuration(
                "cloud has no normals; estimate them before segmenting".to_string(),
            ));
        }

        Ok(Self {
            cloud,
            index,
            params,
            indices: IndexSet::new(cloud.len()),
            planes: Vec::new(),
            plane_nb: 0,
            safety_distance: 0.0,
            assigned: 0,
            phase: GrowthPhase::Idle,
            finished: None,
            control: SegmentationControl::new(),
            observer: SharedObserver::default(),
        })
    }

    /// Replaces the observer receiving [`SegmentationEvent`]s.
    pub fn set_observer<O>(&mut self, observer: O)
    where
        O: Observer<SegmentationEvent> + 'static,
    {
        self.observer = SharedObserver::new(observer);
    }

    /// Builder form of [`set_observer`](Self::set_observer).
    #[must_use]
    pub fn with_observer<O>(mut self, observer: O) -> Self
    where
        O: Observer<SegmentationEvent> + 'static,
    {
        self.set_observer(observer);
        self
    }

    /// Handle for pausing, resuming or stopping the run from elsewhere.
    #[must_use]
    pub fn control(&self) -> SegmentationControl {
        self.control.clone()
    }

    /// Committed planes so far.
    #[must_use]
    pub fn planes(&self) -> &[SegmentedPlane] {
        &self.planes
    }

    /// Unprocessed and excluded point ids.
    #[must_use]
    pub const fn indices(&self) -> &IndexSet {
        &self.indices
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> GrowthPhase {
        self.phase
    }

    /// The parameters in use.
    #[must_use]
    pub const fn params(&self) -> &SegmentationParams {
        &self.params
    }

    /// Number of regions that passed initialisation.
    #[must_use]
    pub const fn plane_nb(&self) -> usize {
        self.plane_nb
    }

    /// Number of points assigned to committed planes.
    #[must_use]
    pub const fn assigned(&self) -> usize {
        self.assigned
    }

    /// Fraction of the cloud assigned to committed planes.
    #[must_use]
    pub fn coverage(&self) -> f64 {
        if self.cloud.is_empty() {
            0.0
        } else {
            self.assigned as f64 / self.cloud.len() as f64
        }
    }

    /// Id of the unprocessed point with the smallest curvature, lowest id
    /// first on ties. `None` when nothing is left.
    #[must_use]
    pub fn select_seed(&self) -> Option<usize> {
        let points = &self.cloud.points;
        self.indices.par_unprocessed().min_by(|&a, &b| {
            points[a]
                .curvature_or_flat()
                .total_cmp(&points[b].curvature_or_flat())
                .then(a.cmp(&b))
        })
    }

    /// Runs one step: picks a seed and grows it to a committed or rejected
    /// region, or reports why nothing was done.
    pub fn step(&mut self) -> StepOutcome {
        if let Some(reason) = self.finished {
            return StepOutcome::Finished(reason);
        }
        if self.control.is_stopped() {
            return self.finish(FinishReason::Stopped);
        }
        if self.control.is_paused() {
            return StepOutcome::Paused;
        }
        if self.coverage_reached() {
            return self.finish(FinishReason::Coverage);
        }

        self.phase = GrowthPhase::Seeding;
        let Some(seed) = self.select_seed() else {
            return self.finish(FinishReason::Exhausted);
        };

        match self.grow_region(seed) {
            GrowthOutcome::Committed(_) => StepOutcome::Committed(self.planes.len() - 1),
            GrowthOutcome::Rejected(reason) => StepOutcome::Rejected { seed, reason },
            GrowthOutcome::Cancelled => self.finish(FinishReason::Stopped),
        }
    }

    /// Steps until the run finishes, sleeping while paused, and returns the
    /// committed planes.
    pub fn run(&mut self) -> Vec<SegmentedPlane> {
        info!(
            points = self.cloud.len(),
            k = self.params.k,
            "Segmentation started"
        );
        loop {
            match self.step() {
                StepOutcome::Finished(_) => break,
                StepOutcome::Paused => std::thread::sleep(self.params.pause_poll),
                StepOutcome::Committed(_) | StepOutcome::Rejected { .. } => {}
            }
        }
        self.planes.clone()
    }

    /// Grows a region from `seed` and commits or rejects it.
    pub fn grow_region(&mut self, seed: usize) -> GrowthOutcome {
        self.phase = GrowthPhase::Growing;

        let mut state = match self.init_region(seed) {
            Ok(state) => state,
            Err((reason, neighbourhood)) => return self.reject(seed, reason, &neighbourhood),
        };

        loop {
            if !self.control.wait_while_paused(self.params.pause_poll) {
                return GrowthOutcome::Cancelled;
            }
            if state.iteration >= self.params.max_iterations {
                debug!(seed, iteration = state.iteration, "Growth iteration cap reached");
                break;
            }

            if state.iteration == self.params.phase1_iterations && !state.validated {
                if !self.validate(&state) {
                    return self.reject(seed, RejectionReason::NotPlanar, &[]);
                }
                state.mark_validated();
            }

            if state.members.len() < 3 {
                return self.reject(seed, RejectionReason::TooSmall, &[]);
            }

            if state.members.len() < self.params.min_stable_size {
                self.refit(&mut state);
            }

            let admitted = self.expand(&mut state);
            debug!(
                seed,
                iteration = state.iteration,
                members = state.members.len(),
                admitted,
                epsilon = state.epsilon,
                radius = state.max_search_distance,
                "Region grown"
            );
            state.iteration += 1;

            if admitted == 0 {
                break;
            }
        }

        if !state.validated && !self.validate(&state) {
            return self.reject(seed, RejectionReason::NotPlanar, &[]);
        }

        match self.refine(&mut state) {
            Some(plane) if state.members.len() >= self.params.min_plane_points => {
                self.commit(state, plane)
            }
            _ => self.reject(seed, RejectionReason::TooSmall, &[]),
        }
    }

    /// The `k` nearest unprocessed points of the seed (seed included),
    /// widening the query until enough are found or the index is exhausted.
    fn available_neighbours(&self, seed: usize) -> Vec<Neighbor> {
        let query = self.cloud.position(seed);
        let k = self.params.k;
        let mut wanted = k;

        loop {
            let available: Vec<Neighbor> = self
                .index
                .k_nearest(&query, wanted)
                .into_iter()
                .filter(|n| self.indices.is_unprocessed(n.index))
                .take(k)
                .collect();
            if available.len() >= k || wanted >= self.index.len() {
                return available;
            }
            wanted = (wanted * 2).min(self.index.len());
        }
    }

    /// Mean distance of each point to its own nearest neighbour.
    fn mean_spacing(&self, ids: &[usize]) -> f64 {
        if ids.is_empty() {
            return 0.0;
        }
        let (cloud, index) = (self.cloud, self.index);
        let total: f64 = ids
            .par_iter()
            .map(|&id| {
                index
                    .k_nearest(&cloud.position(id), 2)
                    .get(1)
                    .map_or(0.0, Neighbor::distance)
            })
            .sum();
        total / ids.len() as f64
    }

    fn init_region(
        &mut self,
        seed: usize,
    ) -> Result<RegionGrowthState, (RejectionReason, Vec<usize>)> {
        let neighbours = self.available_neighbours(seed);
        let ids: Vec<usize> = neighbours.iter().map(|n| n.index).collect();
        let Some(kth_distance) = neighbours.last().map(Neighbor::distance) else {
            return Err((RejectionReason::TooSmall, ids));
        };
        if ids.len() < 3 {
            return Err((RejectionReason::TooSmall, ids));
        }

        if self.plane_nb > SAFETY_WARMUP_PLANES
            && kth_distance > SAFETY_FACTOR * self.safety_distance / self.plane_nb as f64
        {
            debug!(seed, kth_distance, "Seed neighbourhood too sparse");
            return Err((RejectionReason::SparseRegion, ids));
        }
        self.safety_distance += kth_distance;
        self.plane_nb += 1;

        let spacing = self.mean_spacing(&ids);
        let Some(plane) = Plane::fit(self.cloud, &ids) else {
            return Err((RejectionReason::TooSmall, ids));
        };

        let mut state = RegionGrowthState::new(seed, ids, plane, spacing);
        state.epsilon = self.epsilon_for(&state);
        Ok(state)
    }

    fn epsilon_for(&self, state: &RegionGrowthState) -> f64 {
        let rms = state.plane.rms_distance(self.cloud, &state.members);
        state.epsilon_scale * rms.max(self.params.epsilon_floor_ratio * state.spacing)
    }

    fn refit(&self, state: &mut RegionGrowthState) {
        if let Some(plane) = Plane::fit(self.cloud, &state.members) {
            state.plane = plane;
        }
        state.epsilon = self.epsilon_for(state);
    }

    fn validate(&self, state: &RegionGrowthState) -> bool {
        let sample = state.sample(self.params.validation_sample);
        let valid = is_valid_plane(self.cloud, &sample, self.params.plane_threshold);
        debug!(seed = state.seed, members = state.members.len(), valid, "Planarity check");
        valid
    }

    fn accepts(&self, state: &RegionGrowthState, id: usize) -> bool {
        let point = &self.cloud.points[id];
        if state.plane.distance(&point.position) > state.epsilon {
            return false;
        }
        self.params.max_normal_angle.map_or(true, |max_angle| {
            point.normal_or_z().dot(&state.plane.normal).abs() >= max_angle.cos()
        })
    }

    /// Searches around the frontier and admits qualifying points. Returns
    /// the number admitted; they form the next frontier.
    fn expand(&self, state: &mut RegionGrowthState) -> usize {
        let frontier = std::mem::take(&mut state.frontier);
        let mut next = Vec::new();

        for &f in &frontier {
            let centre = self.cloud.position(f);
            for id in self.index.radius_search(&centre, state.max_search_distance) {
                if state.contains(id) || !self.indices.is_unprocessed(id) {
                    continue;
                }
                if self.accepts(state, id) && state.admit(id) {
                    next.push(id);
                }
            }
        }

        let admitted = next.len();
        state.frontier = next;
        admitted
    }

    /// Refits and drops members farther than epsilon until none is dropped,
    /// so every member lies within epsilon of the returned plane.
    fn refine(&self, state: &mut RegionGrowthState) -> Option<Plane> {
        loop {
            let plane = Plane::fit(self.cloud, &state.members)?;
            let epsilon = state.epsilon;
            let cloud = self.cloud;
            let pruned = state.retain(|id| plane.distance(&cloud.points[id].position) <= epsilon);
            if pruned == 0 {
                return Some(plane);
            }
            debug!(seed = state.seed, pruned, "Pruned outliers");
        }
    }

    fn commit(&mut self, state: RegionGrowthState, plane: Plane) -> GrowthOutcome {
        let surface = projected_area(self.cloud, &plane, &state.members, SurfaceMethod::ConvexHull);
        self.assigned += self.indices.claim(&state.members);

        let segmented = SegmentedPlane::new(plane, state.members, surface, state.epsilon);
        let index = self.planes.len();
        self.planes.push(segmented.clone());
        self.phase = GrowthPhase::Committed;

        info!(
            plane = index,
            points = segmented.len(),
            surface,
            epsilon = segmented.epsilon,
            iterations = state.iteration,
            coverage = self.coverage(),
            "Plane segmented"
        );
        self.observer.notify(&SegmentationEvent::PlaneSegmented {
            index,
            plane: segmented.clone(),
        });
        GrowthOutcome::Committed(segmented)
    }

    fn reject(&mut self, seed: usize, reason: RejectionReason, neighbourhood: &[usize]) -> GrowthOutcome {
        self.indices.exclude(seed);
        if self.params.rejection_policy == RejectionPolicy::ExcludeNeighborhood
            && reason == RejectionReason::SparseRegion
        {
            for &id in neighbourhood {
                self.indices.exclude(id);
            }
        }
        self.phase = GrowthPhase::Rejected;

        debug!(seed, ?reason, "Region rejected");
        self.observer
            .notify(&SegmentationEvent::RegionRejected { seed, reason });
        GrowthOutcome::Rejected(reason)
    }

    fn coverage_reached(&self) -> bool {
        !self.cloud.is_empty()
            && self.assigned as f64 >= self.params.coverage_ratio * self.cloud.len() as f64
    }

    fn finish(&mut self, reason: FinishReason) -> StepOutcome {
        self.phase = GrowthPhase::Finished;
        self.finished = Some(reason);

        info!(
            ?reason,
            planes = self.planes.len(),
            assigned = self.assigned,
            excluded = self.indices.excluded_len(),
            coverage = self.coverage(),
            "Segmentation finished"
        );
        self.observer.notify(&SegmentationEvent::Finished {
            reason,
            planes: self.planes.len(),
            assigned: self.assigned,
        });
        StepOutcome::Finished(reason)
    }
}

/// Segments a cloud that already has normals, using a KD-tree index.
///
/// # Errors
///
/// Returns an error if the parameters are invalid or the cloud has no
/// normals.
pub fn segment(cloud: &PointCloud, params: SegmentationParams) -> SegmentResult<Vec<SegmentedPlane>> {
    let index = KdTreeIndex::from_cloud(cloud);
    let mut segmenter = RegionGrowthSegmenter::new(cloud, &index, params)?;
    Ok(segmenter.run())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use hashbrown::HashSet;
    use nalgebra::{Point3, Vector3};
    use plane_types::{CloudPoint, LinearIndex};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::sync::{Arc, Mutex};

    /// A square patch of `n` points spanned by `u` and `v` around `origin`,
    /// with uniform noise along the normal.
    fn patch(
        rng: &mut StdRng,
        origin: Point3<f64>,
        u: Vector3<f64>,
        v: Vector3<f64>,
        n: usize,
        noise: f64,
    ) -> Vec<Point3<f64>> {
        let normal = u.cross(&v).normalize();
        (0..n)
            .map(|_| {
                origin
                    + u * rng.gen_range(0.0..1.0)
                    + v * rng.gen_range(0.0..1.0)
                    + normal * rng.gen_range(-noise..noise)
            })
            .collect()
    }

    fn two_patches() -> PointCloud {
        let mut rng = StdRng::seed_from_u64(42);
        let mut positions = patch(
            &mut rng,
            Point3::new(-0.5, -0.5, 3.0),
            Vector3::x(),
            Vector3::y(),
            700,
            5e-4,
        );
        positions.extend(patch(
            &mut rng,
            Point3::new(3.0, -0.5, 0.5),
            Vector3::y(),
            Vector3::z(),
            600,
            5e-4,
        ));
        let mut cloud = PointCloud::from_positions(&positions);
        cloud.estimate_normals(15).unwrap();
        cloud
    }

    #[test]
    fn test_segments_two_patches_without_overlap() {
        let cloud = two_patches();
        let planes = segment(&cloud, SegmentationParams::default()).unwrap();

        assert!(planes.len() >= 2);
        let mut seen = HashSet::new();
        for plane in &planes {
            for &id in &plane.indices {
                assert!(seen.insert(id), "point {id} assigned twice");
            }
        }
        assert!(seen.len() as f64 >= 0.8 * cloud.len() as f64);
    }

    #[test]
    fn test_members_within_epsilon() {
        let cloud = two_patches();
        let planes = segment(&cloud, SegmentationParams::default()).unwrap();

        for plane in &planes {
            let max = plane.plane.max_distance(&cloud, &plane.indices);
            assert!(max <= plane.epsilon, "max {max} > epsilon {}", plane.epsilon);
            assert!(plane.surface > 0.0);
        }
    }

    /// A dense 1 m patch of 400 points followed by a 6x5 grid with 2 m
    /// spacing, all facing +Z. The sparse points start at id 400.
    fn dense_then_sparse() -> PointCloud {
        let mut rng = StdRng::seed_from_u64(5);
        let mut positions = patch(
            &mut rng,
            Point3::origin(),
            Vector3::x(),
            Vector3::y(),
            400,
            1e-4,
        );
        positions.extend((0..30_u32).map(|i| {
            Point3::new(20.0 + 2.0 * f64::from(i % 6), 2.0 * f64::from(i / 6), 0.0)
        }));
        let normals = vec![Vector3::z(); positions.len()];
        PointCloud::from_positions_and_normals(&positions, &normals)
    }

    /// Sets the running k-th distance statistics as if one more than the
    /// warm-up count of regions had been initialised with `mean_kth`.
    fn warm_up<S: NeighborSearch>(segmenter: &mut RegionGrowthSegmenter<'_, S>, mean_kth: f64) {
        segmenter.plane_nb = SAFETY_WARMUP_PLANES + 1;
        segmenter.safety_distance = mean_kth * segmenter.plane_nb as f64;
    }

    #[test]
    fn test_sparse_seed_excludes_neighbourhood() {
        let cloud = dense_then_sparse();
        let index = KdTreeIndex::from_cloud(&cloud);
        let params = SegmentationParams::default()
            .with_rejection_policy(RejectionPolicy::ExcludeNeighborhood);
        let k = params.k;
        let mut segmenter = RegionGrowthSegmenter::new(&cloud, &index, params).unwrap();
        warm_up(&mut segmenter, 0.2);

        let seed = 400;
        let neighbourhood: Vec<usize> = index
            .k_nearest(&cloud.position(seed), k)
            .iter()
            .map(|n| n.index)
            .collect();

        assert_eq!(
            segmenter.grow_region(seed),
            GrowthOutcome::Rejected(RejectionReason::SparseRegion)
        );
        assert_eq!(segmenter.plane_nb(), SAFETY_WARMUP_PLANES + 1);
        assert_eq!(segmenter.indices().excluded_len(), k);
        for id in neighbourhood {
            assert!(segmenter.indices().is_excluded(id), "point {id} still available");
        }

        // A dense seed under the same statistics still grows.
        assert!(matches!(segmenter.grow_region(0), GrowthOutcome::Committed(_)));
    }

    #[test]
    fn test_sparse_seed_excludes_only_seed_by_default() {
        let cloud = dense_then_sparse();
        let index = KdTreeIndex::from_cloud(&cloud);
        let mut segmenter =
            RegionGrowthSegmenter::new(&cloud, &index, SegmentationParams::default()).unwrap();
        warm_up(&mut segmenter, 0.2);

        assert_eq!(
            segmenter.grow_region(401),
            GrowthOutcome::Rejected(RejectionReason::SparseRegion)
        );
        assert_eq!(segmenter.indices().excluded_len(), 1);
        assert!(segmenter.indices().is_excluded(401));
        assert!(segmenter.indices().is_unprocessed(400));
    }

    #[test]
    fn test_sparse_check_waits_for_warm_up() {
        let cloud = dense_then_sparse();
        let index = KdTreeIndex::from_cloud(&cloud);
        let mut segmenter =
            RegionGrowthSegmenter::new(&cloud, &index, SegmentationParams::default()).unwrap();
        segmenter.plane_nb = SAFETY_WARMUP_PLANES;
        segmenter.safety_distance = 0.1 * SAFETY_WARMUP_PLANES as f64;

        let outcome = segmenter.grow_region(400);
        assert_ne!(outcome, GrowthOutcome::Rejected(RejectionReason::SparseRegion));
        assert_eq!(segmenter.plane_nb(), SAFETY_WARMUP_PLANES + 1);
    }

    #[test]
    fn test_scattered_normals_are_not_planar() {
        let mut rng = StdRng::seed_from_u64(17);
        let positions = patch(
            &mut rng,
            Point3::origin(),
            Vector3::x(),
            Vector3::y(),
            300,
            1e-4,
        );
        let normals: Vec<Vector3<f64>> = (0..positions.len())
            .map(|_| {
                Vector3::new(
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(-1.0..1.0),
                    rng.gen_range(0.1..1.0),
                )
                .normalize()
            })
            .collect();
        let cloud = PointCloud::from_positions_and_normals(&positions, &normals);
        let index = KdTreeIndex::from_cloud(&cloud);
        let params = SegmentationParams::default()
            .with_rejection_policy(RejectionPolicy::ExcludeNeighborhood);
        let mut segmenter = RegionGrowthSegmenter::new(&cloud, &index, params).unwrap();

        let seed = segmenter.select_seed().unwrap();
        assert_eq!(
            segmenter.step(),
            StepOutcome::Rejected {
                seed,
                reason: RejectionReason::NotPlanar,
            }
        );
        // Only sparse rejections take the neighbourhood along.
        assert_eq!(segmenter.indices().excluded_len(), 1);
        assert!(segmenter.planes().is_empty());
    }

    #[test]
    fn test_select_seed_prefers_flat_then_low_id() {
        let cloud: PointCloud = [0.3, 0.1, 0.1, 0.5]
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                CloudPoint::with_normal(Point3::new(i as f64, 0.5 * i as f64, 0.0), Vector3::z())
                    .with_curvature(c)
            })
            .collect();
        let index = KdTreeIndex::from_cloud(&cloud);
        let mut segmenter =
            RegionGrowthSegmenter::new(&cloud, &index, SegmentationParams::default()).unwrap();

        assert_eq!(segmenter.select_seed(), Some(1));
        segmenter.indices.exclude(1);
        assert_eq!(segmenter.select_seed(), Some(2));
    }

    #[test]
    fn test_rejects_cloud_without_normals() {
        let cloud = PointCloud::from_positions(&[Point3::origin(), Point3::new(1.0, 0.0, 0.0)]);
        let index = LinearIndex::from_points(&cloud.positions());
        let err = RegionGrowthSegmenter::new(&cloud, &index, SegmentationParams::default());
        assert!(matches!(err, Err(SegmentError::Configuration(_))));
    }

    #[test]
    fn test_rejects_mismatched_index() {
        let cloud = two_patches();
        let index = LinearIndex::from_points(&cloud.positions()[..10]);
        let err = RegionGrowthSegmenter::new(&cloud, &index, SegmentationParams::default());
        assert!(matches!(err, Err(SegmentError::Configuration(_))));
    }

    #[test]
    fn test_empty_cloud_finishes_exhausted() {
        let cloud = PointCloud::new();
        let index = KdTreeIndex::from_cloud(&cloud);
        let mut segmenter =
            RegionGrowthSegmenter::new(&cloud, &index, SegmentationParams::default()).unwrap();
        assert_eq!(segmenter.step(), StepOutcome::Finished(FinishReason::Exhausted));
        assert_eq!(segmenter.phase(), GrowthPhase::Finished);
        assert!(segmenter.run().is_empty());
    }

    #[test]
    fn test_tiny_cloud_rejects_every_seed() {
        let cloud = PointCloud::from_positions_and_normals(
            &[Point3::origin(), Point3::new(1.0, 0.2, 0.0)],
            &[Vector3::z(), Vector3::z()],
        );
        let index = KdTreeIndex::from_cloud(&cloud);
        let mut segmenter =
            RegionGrowthSegmenter::new(&cloud, &index, SegmentationParams::default()).unwrap();

        assert!(matches!(
            segmenter.step(),
            StepOutcome::Rejected {
                reason: RejectionReason::TooSmall,
                ..
            }
        ));
        assert!(segmenter.run().is_empty());
        assert_eq!(segmenter.indices().excluded_len(), 2);
        let indices = segmenter.indices();
        assert!(indices.unprocessed().all(|id| !indices.is_excluded(id)));
    }

    #[test]
    fn test_stop_before_run() {
        let cloud = two_patches();
        let index = KdTreeIndex::from_cloud(&cloud);
        let mut segmenter =
            RegionGrowthSegmenter::new(&cloud, &index, SegmentationParams::default()).unwrap();
        segmenter.control().stop();

        assert!(segmenter.run().is_empty());
        assert_eq!(segmenter.step(), StepOutcome::Finished(FinishReason::Stopped));
    }

    #[test]
    fn test_pause_then_resume() {
        let cloud = two_patches();
        let index = KdTreeIndex::from_cloud(&cloud);
        let mut segmenter =
            RegionGrowthSegmenter::new(&cloud, &index, SegmentationParams::default()).unwrap();
        let control = segmenter.control();

        control.pause();
        assert_eq!(segmenter.step(), StepOutcome::Paused);
        assert_eq!(segmenter.phase(), GrowthPhase::Idle);

        control.resume();
        assert_ne!(segmenter.step(), StepOutcome::Paused);
    }

    #[test]
    fn test_observer_can_stop_after_first_plane() {
        let cloud = two_patches();
        let index = KdTreeIndex::from_cloud(&cloud);
        let events = Arc::new(Mutex::new(Vec::new()));

        let mut segmenter =
            RegionGrowthSegmenter::new(&cloud, &index, SegmentationParams::default()).unwrap();
        let control = segmenter.control();
        let sink = Arc::clone(&events);
        segmenter.set_observer(move |event: &SegmentationEvent| {
            if matches!(event, SegmentationEvent::PlaneSegmented { .. }) {
                control.stop();
            }
            sink.lock().unwrap().push(event.clone());
        });

        let planes = segmenter.run();
        assert_eq!(planes.len(), 1);

        let events = events.lock().unwrap();
        assert!(matches!(
            events.last(),
            Some(SegmentationEvent::Finished {
                reason: FinishReason::Stopped,
                planes: 1,
                ..
            })
        ));
    }
}
