//! Engine phase and per-region scratch state.

use hashbrown::HashSet;

use plane_types::Plane;

/// Where the engine currently is.
///
/// ```text
/// Idle -> Seeding -> Growing -> Committed --+
///            ^                  Rejected  --+--> Seeding ... -> Finished
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GrowthPhase {
    /// Created, no step taken yet.
    #[default]
    Idle,
    /// Picking the next seed.
    Seeding,
    /// Growing a region.
    Growing,
    /// The last region was committed as a plane.
    Committed,
    /// The last region was rejected.
    Rejected,
    /// The run is over; further steps do nothing.
    Finished,
}

/// Scratch state of one region growth, created per seed and consumed on
/// commit or rejection.
#[derive(Debug, Clone)]
pub struct RegionGrowthState {
    /// Id of the seed point.
    pub seed: usize,
    /// Member ids in admission order.
    pub members: Vec<usize>,
    /// Ids admitted in the last iteration; the next search starts there.
    pub frontier: Vec<usize>,
    /// Completed growth iterations.
    pub iteration: usize,
    /// Current inlier distance threshold.
    pub epsilon: f64,
    /// Multiplier applied to the RMS distance when refitting epsilon:
    /// 1 before the planarity check, 2 after.
    pub epsilon_scale: f64,
    /// Radius of the frontier search.
    pub max_search_distance: f64,
    /// Mean nearest-neighbour distance around the seed.
    pub spacing: f64,
    /// Current plane estimate.
    pub plane: Plane,
    /// Whether the planarity check has passed.
    pub validated: bool,
    member_set: HashSet<usize>,
}

impl RegionGrowthState {
    /// Starts a region from its initial neighbourhood.
    #[must_use]
    pub fn new(seed: usize, members: Vec<usize>, plane: Plane, spacing: f64) -> Self {
        let member_set = members.iter().copied().collect();
        Self {
            seed,
            frontier: members.clone(),
            members,
            iteration: 0,
            epsilon: 0.0,
            epsilon_scale: 1.0,
            max_search_distance: 2.0 * spacing,
            spacing,
            plane,
            validated: false,
            member_set,
        }
    }

    /// Returns true if `id` is already a member.
    #[must_use]
    pub fn contains(&self, id: usize) -> bool {
        self.member_set.contains(&id)
    }

    /// Adds a member. Returns false if it already was one.
    pub fn admit(&mut self, id: usize) -> bool {
        if self.member_set.insert(id) {
            self.members.push(id);
            true
        } else {
            false
        }
    }

    /// Keeps only members for which `keep` holds. Returns how many were
    /// removed.
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(usize) -> bool,
    {
        let before = self.members.len();
        let member_set = &mut self.member_set;
        self.members.retain(|&id| {
            let kept = keep(id);
            if !kept {
                member_set.remove(&id);
            }
            kept
        });
        before - self.members.len()
    }

    /// Records a passed planarity check: the search radius and epsilon
    /// double for the rest of the growth.
    pub fn mark_validated(&mut self) {
        self.validated = true;
        self.epsilon_scale = 2.0;
        self.max_search_distance *= 2.0;
        self.epsilon *= 2.0;
    }

    /// Members picked with a fixed stride so that at most `max` remain.
    #[must_use]
    pub fn sample(&self, max: usize) -> Vec<usize> {
        let stride = self.members.len().div_ceil(max.max(1)).max(1);
        self.members.iter().step_by(stride).copied().collect()
    }
}
