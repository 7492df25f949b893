//! Formations: slot layout, member sync, and per-tick marker publishing.

use log::debug;

use sk_behavior::{Marker, MarkerBoard, SlotBinding};
use sk_core::{AgentId, GroupId, KinematicState, MarkerId, Vec2};
use sk_sense::{LayerMask, Shape, ShapeOracle};

use crate::{
    FormationError, FormationMember, FormationResult, Pattern, ScalableLayout, SpawnRequest,
    Spawner, Transform2,
};

// ── Layout ────────────────────────────────────────────────────────────────────

/// How a formation's slots are arranged.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Layout {
    /// A fixed pattern with an explicit member count.
    Fixed { pattern: Pattern, members: usize },
    /// A grid solved from two of quantity, dimensions and density.
    Scalable(ScalableLayout),
}

impl Layout {
    pub fn fixed(pattern: Pattern, members: usize) -> Self {
        Layout::Fixed { pattern, members }
    }

    /// Slot offsets in the usher frame.
    pub fn offsets(&self) -> FormationResult<Vec<Vec2>> {
        match self {
            Layout::Fixed { pattern, members } => pattern.offsets(*members),
            Layout::Scalable(layout) => Ok(layout.solve()?.offsets()),
        }
    }
}

// ── Events ────────────────────────────────────────────────────────────────────

/// Notifications drained by the host after each formation phase.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FormationEvent {
    /// The layout changed; members are re-synced on the next sync pass.
    DimensionsChanged { group: GroupId, slots: usize },
    MemberSpawned { group: GroupId, slot: usize, agent: AgentId },
    MemberDespawned { group: GroupId, slot: usize, agent: AgentId },
    /// The slot's spot started overlapping an obstacle.
    SlotObstructed { group: GroupId, slot: usize },
    SlotCleared { group: GroupId, slot: usize },
}

// ── FormationWorld ────────────────────────────────────────────────────────────

/// Read-only view of the world handed to formations.
pub struct FormationWorld<'a> {
    pub agents: &'a [KinematicState],
    /// `alive[i]` is `false` for despawned agents; a short slice means the
    /// missing tail is alive.
    pub alive: &'a [bool],
    pub shapes: &'a dyn ShapeOracle,
}

impl<'a> FormationWorld<'a> {
    pub fn new(agents: &'a [KinematicState], alive: &'a [bool], shapes: &'a dyn ShapeOracle) -> Self {
        Self { agents, alive, shapes }
    }

    pub fn agent(&self, id: AgentId) -> Option<&'a KinematicState> {
        let alive = self.alive.get(id.index()).copied().unwrap_or(true);
        if alive { self.agents.get(id.index()) } else { None }
    }
}

// ── Choreography ──────────────────────────────────────────────────────────────

/// A formation-like controller driven by the host every tick.
///
/// 1. `sync_members` (only does work after a layout change) spawns and
///    despawns members through the [`Spawner`] so the member count matches
///    the slot count.
/// 2. `publish` writes every slot marker and the group roster onto the
///    [`MarkerBoard`] from the usher's current pose.
///
/// Both run before the steering pass, against the tick's snapshot.
pub trait Choreography: Send {
    fn sync_members(
        &mut self,
        world:   &FormationWorld<'_>,
        markers: &mut MarkerBoard,
        spawner: &mut dyn Spawner,
    ) -> FormationResult<()>;

    fn publish(&mut self, world: &FormationWorld<'_>, markers: &mut MarkerBoard);

    fn drain_events(&mut self) -> Vec<FormationEvent>;

    /// Swap the (top-level) layout; members follow on the next sync.
    fn relayout(&mut self, layout: Layout) -> FormationResult<()>;

    /// Despawn every member and release every marker.
    fn dissolve(&mut self, markers: &mut MarkerBoard, spawner: &mut dyn Spawner);
}

// ── Formation ─────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq)]
struct Slot {
    marker: MarkerId,
    member: AgentId,
    obstructed: bool,
}

/// A member spawned during a sync pass.
#[derive(Clone, Debug)]
pub struct Spawned {
    pub slot: usize,
    pub agent: AgentId,
    pub state: KinematicState,
}

/// An usher agent plus one member agent per slot.
///
/// The usher is any agent the host steers (typically with
/// [`UsherHinge`](crate::UsherHinge), optionally wrapped in an
/// [`UsherWaiter`](crate::UsherWaiter)).  Members are spawned by the
/// formation and steer with [`FormationMember`].
pub struct Formation {
    group: GroupId,
    usher: AgentId,
    layout: Layout,
    offsets: Vec<Vec2>,
    slots: Vec<Slot>,

    /// Steering settings for spawned members.
    pub member_template: FormationMember,
    /// Kinematic limits for spawned members.
    pub member_state: KinematicState,
    /// Obstacle layers that block or obstruct a slot.
    pub layers: LayerMask,

    events: Vec<FormationEvent>,
    dirty: bool,
}

impl Formation {
    pub fn new(group: GroupId, usher: AgentId, layout: Layout) -> FormationResult<Self> {
        let offsets = layout.offsets()?;
        Ok(Self {
            group,
            usher,
            layout,
            offsets,
            slots: Vec::new(),
            member_template: FormationMember::default(),
            member_state: KinematicState::default(),
            layers: LayerMask::ALL,
            events: Vec::new(),
            dirty: true,
        })
    }

    pub fn with_member_template(mut self, template: FormationMember) -> Self {
        self.member_template = template;
        self
    }

    pub fn with_member_state(mut self, state: KinematicState) -> Self {
        self.member_state = state;
        self
    }

    pub fn with_layers(mut self, layers: LayerMask) -> Self {
        self.layers = layers;
        self
    }

    pub fn group(&self) -> GroupId {
        self.group
    }

    pub fn usher(&self) -> AgentId {
        self.usher
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn offsets(&self) -> &[Vec2] {
        &self.offsets
    }

    /// Number of slots currently backed by a member.
    pub fn member_count(&self) -> usize {
        self.slots.len()
    }

    /// Members in slot order.
    pub fn members(&self) -> Vec<AgentId> {
        self.slots.iter().map(|s| s.member).collect()
    }

    pub fn slot_marker(&self, slot: usize) -> Option<MarkerId> {
        self.slots.get(slot).map(|s| s.marker)
    }

    pub fn slot_of(&self, agent: AgentId) -> Option<usize> {
        self.slots.iter().position(|s| s.member == agent)
    }

    pub fn is_obstructed(&self, slot: usize) -> bool {
        self.slots.get(slot).is_some_and(|s| s.obstructed)
    }

    /// `true` until the next sync after a layout change.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Swap the layout.  Members follow on the next sync pass.
    pub fn set_layout(&mut self, layout: Layout) -> FormationResult<()> {
        self.offsets = layout.offsets()?;
        self.layout = layout;
        self.dirty = true;
        self.events.push(FormationEvent::DimensionsChanged { group: self.group, slots: self.offsets.len() });
        Ok(())
    }

    /// World pose of every slot for an usher at `usher`.
    pub fn slot_poses(&self, usher: &Transform2) -> Vec<Vec2> {
        self.offsets.iter().map(|&o| usher.transform_point(o)).collect()
    }

    /// First slot in `from..` whose spot overlaps an obstacle.
    pub(crate) fn first_blocked(
        &self,
        usher:  &Transform2,
        from:   usize,
        shapes: &dyn ShapeOracle,
    ) -> Option<(usize, Vec2)> {
        self.offsets
            .iter()
            .enumerate()
            .skip(from)
            .map(|(slot, &o)| (slot, usher.transform_point(o)))
            .find(|&(_, spot)| self.overlaps(spot, shapes))
    }

    fn overlaps(&self, spot: Vec2, shapes: &dyn ShapeOracle) -> bool {
        shapes.overlaps(Shape::Circle { center: spot, radius: self.member_state.radius }, self.layers)
    }

    /// Bring the member count in line with the slot count, with the usher
    /// at `usher`.
    ///
    /// Existing members keep their slots.  Surplus members are despawned;
    /// missing ones are spawned on their slot after every new spot has been
    /// checked against `shapes`.  A blocked spot fails the whole pass before
    /// anything is spawned or despawned.
    pub fn sync_with(
        &mut self,
        usher:   &KinematicState,
        shapes:  &dyn ShapeOracle,
        markers: &mut MarkerBoard,
        spawner: &mut dyn Spawner,
    ) -> FormationResult<Vec<Spawned>> {
        if !self.dirty {
            return Ok(Vec::new());
        }
        let pose = Transform2::of(usher);
        let kept = self.slots.len().min(self.offsets.len());
        if let Some((slot, position)) = self.first_blocked(&pose, kept, shapes) {
            return Err(FormationError::SlotBlocked { slot, position });
        }

        while self.slots.len() > self.offsets.len() {
            let Some(slot) = self.slots.pop() else { break };
            spawner.despawn(slot.member);
            markers.release(slot.marker);
            self.events.push(FormationEvent::MemberDespawned {
                group: self.group,
                slot:  self.slots.len(),
                agent: slot.member,
            });
        }

        let mut spawned = Vec::new();
        for slot in kept..self.offsets.len() {
            let spot = pose.transform_point(self.offsets[slot]);
            let marker = markers.insert(Marker::posed(spot, pose.orientation).with_velocity(usher.velocity));
            let state = KinematicState {
                position: spot,
                orientation: pose.orientation,
                velocity: usher.velocity,
                angular_velocity: 0.0,
                ..self.member_state.clone()
            };
            let request = SpawnRequest {
                group: self.group,
                slot,
                state: state.clone(),
                member: self.member_template.for_marker(marker),
            };
            let agent = match spawner.spawn(request) {
                Ok(agent) => agent,
                Err(e) => {
                    markers.release(marker);
                    return Err(e);
                }
            };
            self.slots.push(Slot { marker, member: agent, obstructed: false });
            self.events.push(FormationEvent::MemberSpawned { group: self.group, slot, agent });
            spawned.push(Spawned { slot, agent, state });
        }

        self.dirty = false;
        debug!(
            "formation {}: synced {} slots ({} spawned)",
            self.group,
            self.slots.len(),
            spawned.len()
        );
        self.publish_at(usher, shapes, markers);
        Ok(spawned)
    }

    /// Place every slot marker around an usher at `usher` and refresh the
    /// roster.
    pub fn publish_at(&mut self, usher: &KinematicState, shapes: &dyn ShapeOracle, markers: &mut MarkerBoard) {
        let pose = Transform2::of(usher);
        let spin = usher.angular_velocity.to_radians();
        let mut roster = Vec::with_capacity(self.slots.len());

        for i in 0..self.slots.len() {
            let arm = pose.transform_vector(self.offsets[i]);
            let spot = pose.position + arm;
            let velocity = usher.velocity + arm.perp() * spin;
            markers.set(self.slots[i].marker, Marker::posed(spot, pose.orientation).with_velocity(velocity));

            let obstructed = self.overlaps(spot, shapes);
            let slot = &mut self.slots[i];
            if obstructed != slot.obstructed {
                slot.obstructed = obstructed;
                self.events.push(if obstructed {
                    FormationEvent::SlotObstructed { group: self.group, slot: i }
                } else {
                    FormationEvent::SlotCleared { group: self.group, slot: i }
                });
            }
            roster.push(SlotBinding { marker: slot.marker, member: Some(slot.member), obstructed });
        }
        markers.set_roster(self.group, roster);
    }
}

impl Choreography for Formation {
    fn sync_members(
        &mut self,
        world:   &FormationWorld<'_>,
        markers: &mut MarkerBoard,
        spawner: &mut dyn Spawner,
    ) -> FormationResult<()> {
        if !self.dirty {
            return Ok(());
        }
        let usher = world.agent(self.usher).ok_or(FormationError::MissingUsher)?;
        self.sync_with(usher, world.shapes, markers, spawner).map(|_| ())
    }

    fn publish(&mut self, world: &FormationWorld<'_>, markers: &mut MarkerBoard) {
        if let Some(usher) = world.agent(self.usher) {
            self.publish_at(usher, world.shapes, markers);
        }
    }

    fn drain_events(&mut self) -> Vec<FormationEvent> {
        std::mem::take(&mut self.events)
    }

    fn relayout(&mut self, layout: Layout) -> FormationResult<()> {
        self.set_layout(layout)
    }

    fn dissolve(&mut self, markers: &mut MarkerBoard, spawner: &mut dyn Spawner) {
        for (slot, s) in self.slots.drain(..).enumerate() {
            spawner.despawn(s.member);
            markers.release(s.marker);
            self.events.push(FormationEvent::MemberDespawned { group: self.group, slot, agent: s.member });
        }
        markers.remove_roster(self.group);
        self.dirty = true;
        debug!("formation {}: dissolved", self.group);
    }
}
