//! The spawn oracle formations create and remove members through.

use sk_core::{AgentId, GroupId, KinematicState};

use crate::{FormationMember, FormationResult};

/// Everything a host needs to create one member.
#[derive(Clone, Debug)]
pub struct SpawnRequest {
    pub group: GroupId,
    pub slot: usize,
    /// Initial pose and movement limits, placed on the slot.
    pub state: KinematicState,
    /// The member's root behavior, already bound to its slot marker.
    pub member: FormationMember,
}

/// Creates and removes agents on behalf of formations.
///
/// The id returned by `spawn` must stay valid until `despawn` is called for
/// it.  Hosts may defer inserting the agent into their store until the end
/// of the formation phase.
pub trait Spawner {
    fn spawn(&mut self, request: SpawnRequest) -> FormationResult<AgentId>;

    fn despawn(&mut self, agent: AgentId);
}
