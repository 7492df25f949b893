//! Agent storage: `AgentStore` (states and behaviors) and `AgentRngs`.
//!
//! # Why two structs?
//!
//! The steering pass needs `&mut AgentRngs` (one RNG per agent, exclusive)
//! alongside `&AgentStore::states` (shared read access to the snapshot).
//! Keeping RNGs in their own struct lets both borrows coexist without
//! splitting the store by hand at every call site.

use sk_behavior::{BoxedBehavior, SteeringArgs};
use sk_core::{AgentId, AgentRng, KinematicState, Vec2};

// ── AgentRngs ─────────────────────────────────────────────────────────────────

/// Per-agent deterministic RNG state, indexed by `AgentId`.
pub struct AgentRngs {
    seed: u64,
    pub inner: Vec<AgentRng>,
}

impl AgentRngs {
    pub(crate) fn new(seed: u64) -> Self {
        Self { seed, inner: Vec::new() }
    }

    /// Seed the RNG for a newly added agent.
    pub(crate) fn push(&mut self, agent: AgentId) {
        debug_assert_eq!(agent.index(), self.inner.len());
        self.inner.push(AgentRng::new(self.seed, agent));
    }

    #[inline]
    pub fn get_mut(&mut self, agent: AgentId) -> &mut AgentRng {
        &mut self.inner[agent.index()]
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

// ── AgentStore ────────────────────────────────────────────────────────────────

/// Structure-of-Arrays storage for all agents.
///
/// Every `Vec` has one element per agent ever added; the `AgentId` value is
/// the index into all of them.  Despawned agents keep their slot (ids are
/// never reused) with `alive[i] == false` and no behavior.
pub struct AgentStore {
    pub states: Vec<KinematicState>,
    pub alive: Vec<bool>,
    pub(crate) behaviors: Vec<Option<BoxedBehavior>>,
    /// Per-agent steering arguments, refreshed in place every tick.
    pub(crate) args: Vec<SteeringArgs>,
}

impl AgentStore {
    pub(crate) fn new() -> Self {
        Self { states: Vec::new(), alive: Vec::new(), behaviors: Vec::new(), args: Vec::new() }
    }

    /// Number of agents ever added, live or not.
    #[inline]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn live_count(&self) -> usize {
        self.alive.iter().filter(|&&a| a).count()
    }

    #[inline]
    pub fn is_alive(&self, agent: AgentId) -> bool {
        self.alive.get(agent.index()).copied().unwrap_or(false)
    }

    pub fn state(&self, agent: AgentId) -> Option<&KinematicState> {
        if self.is_alive(agent) { self.states.get(agent.index()) } else { None }
    }

    /// Live agents in ascending id order.
    pub fn live_ids(&self) -> impl Iterator<Item = AgentId> + '_ {
        self.alive
            .iter()
            .enumerate()
            .filter(|(_, alive)| **alive)
            .map(|(i, _)| AgentId(i as u32))
    }

    pub(crate) fn push(&mut self, state: KinematicState, behavior: BoxedBehavior, delta_secs: f32) -> AgentId {
        let id = AgentId(self.states.len() as u32);
        self.args.push(SteeringArgs::new(id, &state, delta_secs));
        self.states.push(state);
        self.alive.push(true);
        self.behaviors.push(Some(behavior));
        id
    }

    /// Mark `agent` dead and drop its behavior.  Unknown ids are ignored.
    pub(crate) fn despawn(&mut self, agent: AgentId) -> bool {
        let i = agent.index();
        if !self.is_alive(agent) {
            return false;
        }
        self.alive[i] = false;
        self.behaviors[i] = None;
        self.states[i].velocity = Vec2::ZERO;
        self.states[i].angular_velocity = 0.0;
        true
    }
}
