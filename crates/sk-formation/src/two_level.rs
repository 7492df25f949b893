//! Formations of formations.

use log::debug;

use sk_behavior::MarkerBoard;
use sk_core::{AgentId, GroupId, KinematicState};

use crate::{
    Choreography, Formation, FormationError, FormationEvent, FormationMember, FormationResult,
    FormationWorld, Layout, Spawner, Transform2,
};

/// A top-level formation whose slots are held by squad ushers, each leading
/// its own squad formation.
///
/// Squad `i` uses group `GroupId(squad_group_base + i)`; a layout whose
/// squads would run past `u16::MAX` fails to sync before anything spawns.  Squad ushers steer
/// to their top-level slot with the top formation's member template; squad
/// members use `squad_member`.
pub struct TwoLevelFormation {
    top: Formation,
    squad_layout: Layout,
    squads: Vec<Formation>,
    squad_group_base: u16,
    pub squad_member: FormationMember,
    pub squad_member_state: KinematicState,
    events: Vec<FormationEvent>,
}

impl TwoLevelFormation {
    pub fn new(top: Formation, squad_layout: Layout, squad_group_base: u16) -> FormationResult<Self> {
        squad_layout.offsets()?;
        if squad_group_base <= top.group().0 {
            return Err(FormationError::InvalidLayout(format!(
                "squad groups must start above the top-level group {}",
                top.group()
            )));
        }
        Ok(Self {
            top,
            squad_layout,
            squads: Vec::new(),
            squad_group_base,
            squad_member: FormationMember::default(),
            squad_member_state: KinematicState::default(),
            events: Vec::new(),
        })
    }

    pub fn with_squad_member(mut self, member: FormationMember, state: KinematicState) -> Self {
        self.squad_member = member;
        self.squad_member_state = state;
        self
    }

    pub fn top(&self) -> &Formation {
        &self.top
    }

    pub fn squads(&self) -> &[Formation] {
        &self.squads
    }

    pub fn squad_usher(&self, squad: usize) -> Option<AgentId> {
        self.squads.get(squad).map(Formation::usher)
    }

    /// Change the top-level arrangement (and with it the squad count).
    pub fn set_top_layout(&mut self, layout: Layout) -> FormationResult<()> {
        self.top.set_layout(layout)
    }

    /// Change every squad's arrangement.
    pub fn set_squad_layout(&mut self, layout: Layout) -> FormationResult<()> {
        layout.offsets()?;
        for squad in &mut self.squads {
            squad.set_layout(layout.clone())?;
        }
        self.squad_layout = layout;
        Ok(())
    }

    fn squad_group(&self, index: usize) -> FormationResult<GroupId> {
        u16::try_from(index)
            .ok()
            .and_then(|i| self.squad_group_base.checked_add(i))
            .map(GroupId)
            .ok_or_else(|| {
                FormationError::InvalidLayout(format!(
                    "squad {index} has no group id above base {}",
                    self.squad_group_base
                ))
            })
    }

    fn new_squad(&self, index: usize, usher: AgentId) -> FormationResult<Formation> {
        let group = self.squad_group(index)?;
        Ok(Formation::new(group, usher, self.squad_layout.clone())?
            .with_member_template(self.squad_member.clone())
            .with_member_state(self.squad_member_state.clone())
            .with_layers(self.top.layers))
    }

    /// Check every spot a new squad would occupy around its spawn pose.
    fn check_new_squads(&self, usher: &KinematicState, world: &FormationWorld<'_>) -> FormationResult<()> {
        let pose = Transform2::of(usher);
        let probe = self.new_squad(0, AgentId::INVALID)?;
        for &offset in self.top.offsets().iter().skip(self.squads.len()) {
            let squad_pose = Transform2::new(pose.transform_point(offset), pose.orientation);
            if let Some((slot, position)) = probe.first_blocked(&squad_pose, 0, world.shapes) {
                return Err(FormationError::SlotBlocked { slot, position });
            }
        }
        Ok(())
    }
}

impl Choreography for TwoLevelFormation {
    fn sync_members(
        &mut self,
        world:   &FormationWorld<'_>,
        markers: &mut MarkerBoard,
        spawner: &mut dyn Spawner,
    ) -> FormationResult<()> {
        if self.top.is_dirty() {
            let usher = world.agent(self.top.usher()).ok_or(FormationError::MissingUsher)?;
            if let Some(last) = self.top.offsets().len().checked_sub(1) {
                self.squad_group(last)?;
            }
            self.check_new_squads(usher, world)?;
            let spawned = self.top.sync_with(usher, world.shapes, markers, spawner)?;

            let slots = self.top.member_count();
            while self.squads.len() > slots {
                if let Some(mut squad) = self.squads.pop() {
                    squad.dissolve(markers, spawner);
                    self.events.extend(squad.drain_events());
                }
            }
            for s in spawned {
                let mut squad = self.new_squad(s.slot, s.agent)?;
                squad.sync_with(&s.state, world.shapes, markers, spawner)?;
                self.squads.push(squad);
            }
            debug!("two-level formation {}: {} squads", self.top.group(), self.squads.len());
        }

        for squad in &mut self.squads {
            squad.sync_members(world, markers, spawner)?;
        }
        Ok(())
    }

    fn publish(&mut self, world: &FormationWorld<'_>, markers: &mut MarkerBoard) {
        self.top.publish(world, markers);
        for squad in &mut self.squads {
            squad.publish(world, markers);
        }
    }

    fn drain_events(&mut self) -> Vec<FormationEvent> {
        let mut events = std::mem::take(&mut self.events);
        events.extend(self.top.drain_events());
        for squad in &mut self.squads {
            events.extend(squad.drain_events());
        }
        events
    }

    fn relayout(&mut self, layout: Layout) -> FormationResult<()> {
        self.set_top_layout(layout)
    }

    fn dissolve(&mut self, markers: &mut MarkerBoard, spawner: &mut dyn Spawner) {
        for mut squad in self.squads.drain(..) {
            squad.dissolve(markers, spawner);
            self.events.extend(squad.drain_events());
        }
        self.top.dissolve(markers, spawner);
    }
}
