//! Deferred member spawning for formations.

use sk_core::AgentId;
use sk_formation::{FormationResult, SpawnRequest, Spawner};

/// Collects spawn and despawn requests during the formation phase.
///
/// Ids are handed out in request order after the agents already in the
/// store, so the host can insert the queued agents afterwards and every
/// returned id matches its final slot.
pub(crate) struct MemberSpawner {
    first_id: u32,
    pub spawns: Vec<SpawnRequest>,
    pub despawns: Vec<AgentId>,
}

impl MemberSpawner {
    pub fn new(next_id: usize) -> Self {
        Self { first_id: next_id as u32, spawns: Vec::new(), despawns: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.spawns.is_empty() && self.despawns.is_empty()
    }
}

impl Spawner for MemberSpawner {
    fn spawn(&mut self, request: SpawnRequest) -> FormationResult<AgentId> {
        let id = AgentId(self.first_id + self.spawns.len() as u32);
        self.spawns.push(request);
        Ok(id)
    }

    fn despawn(&mut self, agent: AgentId) {
        self.despawns.push(agent);
    }
}
