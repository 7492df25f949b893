//! Per-tick spatial index over live agents.
//!
//! Rebuilt once per tick from the kinematic snapshot (bulk load, O(N log N))
//! and then shared read-only by every agent's neighborhood queries.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use sk_core::{AgentId, KinematicState, Vec2};

// ── R-tree agent entry ────────────────────────────────────────────────────────

#[derive(Clone)]
struct AgentEntry {
    point: [f32; 2],
    id: AgentId,
}

impl RTreeObject for AgentEntry {
    type Envelope = AABB<[f32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for AgentEntry {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── AgentIndex ────────────────────────────────────────────────────────────────

/// Nearest-neighbor and radius queries over agent positions.
pub struct AgentIndex {
    tree: RTree<AgentEntry>,
}

impl AgentIndex {
    /// An index with no agents.
    pub fn empty() -> Self {
        Self { tree: RTree::new() }
    }

    /// Index every agent whose `alive` flag is set.  `states[i]` belongs to
    /// `AgentId(i)`; a short `alive` slice treats missing entries as alive.
    pub fn build(states: &[KinematicState], alive: &[bool]) -> Self {
        let entries: Vec<AgentEntry> = states
            .iter()
            .enumerate()
            .filter(|(i, _)| alive.get(*i).copied().unwrap_or(true))
            .map(|(i, s)| AgentEntry {
                point: [s.position.x, s.position.y],
                id:    AgentId(i as u32),
            })
            .collect();
        Self { tree: RTree::bulk_load(entries) }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Agents within `radius` of `pos` (inclusive), sorted by `AgentId`.
    pub fn within(&self, pos: Vec2, radius: f32) -> Vec<AgentId> {
        let mut ids: Vec<AgentId> = self
            .tree
            .locate_within_distance([pos.x, pos.y], radius * radius)
            .map(|e| e.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Up to `k` agents nearest to `pos`, by ascending distance.
    pub fn nearest(&self, pos: Vec2, k: usize) -> Vec<AgentId> {
        self.tree
            .nearest_neighbor_iter(&[pos.x, pos.y])
            .take(k)
            .map(|e| e.id)
            .collect()
    }
}

impl Default for AgentIndex {
    fn default() -> Self {
        Self::empty()
    }
}
