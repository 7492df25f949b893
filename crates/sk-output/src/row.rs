//! Plain data row types written by output backends.

/// One live agent's kinematic state at a given tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryRow {
    pub agent_id:    u32,
    pub tick:        u64,
    pub x:           f32,
    pub y:           f32,
    /// Degrees, counter-clockwise from +X.
    pub orientation: f32,
    pub vx:          f32,
    pub vy:          f32,
}

/// Summary statistics for one simulation tick.
///
/// `elapsed_secs` is the simulated time at the end of the tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSummaryRow {
    pub tick:          u64,
    pub elapsed_secs:  f64,
    pub active_agents: u64,
}

/// One formation event, flattened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormationEventRow {
    pub tick:  u64,
    pub group: u16,
    pub kind:  &'static str,
    /// Slot index, or the new slot count for `dimensions_changed`.
    pub slot:  u64,
    /// `u32::MAX` when the event has no agent.
    pub agent: u32,
}
