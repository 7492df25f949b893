//! `SimOutputObserver<W>` — bridges `SimObserver` to an `OutputWriter`.

use sk_core::{AgentId, SimConfig, Tick};
use sk_formation::FormationEvent;
use sk_sim::{AgentStore, SimObserver};

use crate::row::{FormationEventRow, TickSummaryRow, TrajectoryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes trajectories, tick summaries and formation
/// events to any [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:     W,
    delta_secs: f32,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    /// Create an observer backed by `writer`, using `config` for the
    /// tick-to-seconds conversion.
    pub fn new(writer: W, config: &SimConfig) -> Self {
        Self {
            writer,
            delta_secs: config.delta_secs,
            last_error: None,
        }
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

/// Flatten one event into a row.
pub fn event_row(tick: Tick, event: &FormationEvent) -> FormationEventRow {
    let none = AgentId::INVALID.0;
    let (group, kind, slot, agent) = match *event {
        FormationEvent::DimensionsChanged { group, slots } => (group, "dimensions_changed", slots, none),
        FormationEvent::MemberSpawned { group, slot, agent } => (group, "member_spawned", slot, agent.0),
        FormationEvent::MemberDespawned { group, slot, agent } => (group, "member_despawned", slot, agent.0),
        FormationEvent::SlotObstructed { group, slot } => (group, "slot_obstructed", slot, none),
        FormationEvent::SlotCleared { group, slot } => (group, "slot_cleared", slot, none),
    };
    FormationEventRow { tick: tick.0, group: group.0, kind, slot: slot as u64, agent }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_tick_end(&mut self, tick: Tick, active: usize) {
        let row = TickSummaryRow {
            tick:          tick.0,
            elapsed_secs:  (tick.0 + 1) as f64 * self.delta_secs as f64,
            active_agents: active as u64,
        };
        let result = self.writer.write_tick_summary(&row);
        self.store_err(result);
    }

    fn on_snapshot(&mut self, tick: Tick, agents: &AgentStore) {
        let rows: Vec<TrajectoryRow> = agents
            .live_ids()
            .map(|id| {
                let s = &agents.states[id.index()];
                TrajectoryRow {
                    agent_id:    id.0,
                    tick:        tick.0,
                    x:           s.position.x,
                    y:           s.position.y,
                    orientation: s.orientation,
                    vx:          s.velocity.x,
                    vy:          s.velocity.y,
                }
            })
            .collect();

        if !rows.is_empty() {
            let result = self.writer.write_trajectories(&rows);
            self.store_err(result);
        }
    }

    fn on_formation_events(&mut self, tick: Tick, events: &[FormationEvent]) {
        let rows: Vec<FormationEventRow> = events.iter().map(|e| event_row(tick, e)).collect();
        let result = self.writer.write_events(&rows);
        self.store_err(result);
    }

    fn on_sim_end(&mut self, _final_tick: Tick) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
