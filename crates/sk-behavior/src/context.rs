//! Read-only world state passed to every steering call.

use std::collections::BTreeMap;

use sk_core::{AgentId, GroupId, KinematicState, MarkerId, Tick, Vec2};
use sk_sense::{AgentIndex, RayOracle, ShapeOracle};

use crate::{Marker, Target};

// ── MarkerBoard ───────────────────────────────────────────────────────────────

/// One formation slot as seen by behaviors: the slot's marker, the member
/// assigned to it, and whether the slot currently overlaps an obstacle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SlotBinding {
    pub marker: MarkerId,
    pub member: Option<AgentId>,
    pub obstructed: bool,
}

/// Named proxy points published by the host before the steering pass.
///
/// Formations publish one marker per slot every tick and a roster per
/// group; members steer toward `Target::Marker(id)` and ushers read the
/// roster to measure lag.
#[derive(Clone, Debug, Default)]
pub struct MarkerBoard {
    markers: Vec<Option<Marker>>,
    allocated: Vec<bool>,
    free: Vec<MarkerId>,
    rosters: BTreeMap<GroupId, Vec<SlotBinding>>,
}

impl MarkerBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a new marker id.  The marker resolves to `None` until set.
    pub fn allocate(&mut self) -> MarkerId {
        if let Some(id) = self.free.pop() {
            self.allocated[id.index()] = true;
            return id;
        }
        self.markers.push(None);
        self.allocated.push(true);
        MarkerId((self.markers.len() - 1) as u32)
    }

    /// Allocate and immediately place a marker.
    pub fn insert(&mut self, marker: Marker) -> MarkerId {
        let id = self.allocate();
        self.set(id, marker);
        id
    }

    /// Place `id`.  Unknown or released ids are ignored.
    pub fn set(&mut self, id: MarkerId, marker: Marker) {
        if self.allocated.get(id.index()).copied().unwrap_or(false) {
            self.markers[id.index()] = Some(marker);
        }
    }

    pub fn get(&self, id: MarkerId) -> Option<&Marker> {
        self.markers.get(id.index()).and_then(Option::as_ref)
    }

    /// Release `id` for reuse.
    pub fn release(&mut self, id: MarkerId) {
        if self.allocated.get(id.index()).copied().unwrap_or(false) {
            self.allocated[id.index()] = false;
            self.markers[id.index()] = None;
            self.free.push(id);
        }
    }

    /// Number of placed markers.
    pub fn len(&self) -> usize {
        self.markers.iter().filter(|m| m.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn set_roster(&mut self, group: GroupId, slots: Vec<SlotBinding>) {
        self.rosters.insert(group, slots);
    }

    /// Slots of `group`; empty if the group never published.
    pub fn roster(&self, group: GroupId) -> &[SlotBinding] {
        self.rosters.get(&group).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn remove_roster(&mut self, group: GroupId) {
        self.rosters.remove(&group);
    }
}

// ── AgentSet ──────────────────────────────────────────────────────────────────

/// Which agents a group behavior reacts to.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AgentSet {
    /// Every live agent other than the caller.
    All,
    /// An explicit list; dead or unknown ids are skipped.
    List(Vec<AgentId>),
}

impl Default for AgentSet {
    fn default() -> Self {
        AgentSet::All
    }
}

// ── SteeringContext ───────────────────────────────────────────────────────────

/// A read-only snapshot of the world shared by every steering call of one
/// tick.
///
/// Built by the host after copying all kinematic states, so no behavior can
/// observe another agent's output from the same tick.
pub struct SteeringContext<'a> {
    pub tick: Tick,
    pub delta_secs: f32,

    /// Kinematic state of every agent at the start of the tick, indexed by
    /// `AgentId`.
    pub agents: &'a [KinematicState],
    /// `alive[i]` is `false` for despawned agents.  Shorter than `agents`
    /// means the missing tail is alive.
    pub alive: &'a [bool],
    /// Spatial index over live agents, built from `agents`.
    pub index: &'a AgentIndex,
    pub markers: &'a MarkerBoard,
    pub rays: &'a dyn RayOracle,
    pub shapes: &'a dyn ShapeOracle,
}

impl<'a> SteeringContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tick:       Tick,
        delta_secs: f32,
        agents:     &'a [KinematicState],
        alive:      &'a [bool],
        index:      &'a AgentIndex,
        markers:    &'a MarkerBoard,
        rays:       &'a dyn RayOracle,
        shapes:     &'a dyn ShapeOracle,
    ) -> Self {
        Self { tick, delta_secs, agents, alive, index, markers, rays, shapes }
    }

    #[inline]
    pub fn is_alive(&self, id: AgentId) -> bool {
        id.index() < self.agents.len() && self.alive.get(id.index()).copied().unwrap_or(true)
    }

    /// State of a live agent.
    pub fn agent(&self, id: AgentId) -> Option<&'a KinematicState> {
        if self.is_alive(id) { self.agents.get(id.index()) } else { None }
    }

    /// Resolve a target to a marker for this tick.
    pub fn resolve(&self, target: &Target) -> Option<Marker> {
        match *target {
            Target::Point(p) => Some(Marker::at(p)),
            Target::Pose { position, orientation } => Some(Marker::posed(position, orientation)),
            Target::Agent(id) => self.agent(id).map(Marker::of_agent),
            Target::Marker(id) => self.markers.get(id).copied(),
        }
    }

    /// Live members of `set` other than `me` within `radius` of `center`,
    /// in ascending id order.  An infinite radius disables the distance
    /// filter.
    pub fn agents_near(
        &self,
        set:    &AgentSet,
        me:     AgentId,
        center: Vec2,
        radius: f32,
    ) -> Vec<(AgentId, &'a KinematicState)> {
        let in_range = |s: &KinematicState| !radius.is_finite() || s.position.distance(center) <= radius;
        match set {
            AgentSet::All if radius.is_finite() => self
                .index
                .within(center, radius)
                .into_iter()
                .filter(|&id| id != me)
                .filter_map(|id| self.agent(id).map(|s| (id, s)))
                .collect(),
            AgentSet::All => (0..self.agents.len())
                .map(|i| AgentId(i as u32))
                .filter(|&id| id != me)
                .filter_map(|id| self.agent(id).map(|s| (id, s)))
                .collect(),
            AgentSet::List(ids) => {
                let mut out: Vec<_> = ids
                    .iter()
                    .copied()
                    .filter(|&id| id != me)
                    .filter_map(|id| self.agent(id).map(|s| (id, s)))
                    .filter(|(_, s)| in_range(s))
                    .collect();
                out.sort_by_key(|(id, _)| *id);
                out.dedup_by_key(|(id, _)| *id);
                out
            }
        }
    }
}
