//! The `Sim` struct and its tick loop.

use std::sync::Arc;

use log::{debug, trace};

use sk_behavior::{BoxedBehavior, ConfigIssue, MarkerBoard, SteeringContext};
use sk_core::{AgentId, KinematicState, SimClock, SimConfig, Steering, Tick};
use sk_formation::{Choreography, FormationEvent, FormationWorld, Layout};
use sk_sense::{AgentIndex, RayOracle, ShapeOracle};

use crate::spawner::MemberSpawner;
use crate::{AgentRngs, AgentStore, SimError, SimObserver, SimResult};

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The main simulation runner.
///
/// `Sim` holds all simulation state and drives the tick loop:
///
/// 1. **Formation sync**: formations whose layout changed spawn or despawn
///    members through a deferred spawner; new agents join the store.
/// 2. **Index**: rebuild the spatial index over live agents.
/// 3. **Publish**: every formation moves its slot markers to follow its
///    usher.
/// 4. **Steering pass** (optionally parallel with the `parallel` feature):
///    poll each live agent's root behavior against the start-of-tick
///    snapshot.
/// 5. **Apply phase** (sequential, ascending `AgentId`): integrate each
///    agent's steering into its kinematic state.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim {
    /// Global configuration (tick duration, total ticks, seed, …).
    pub config: SimConfig,

    /// Simulation clock: tracks the current tick and maps to elapsed time.
    pub clock: SimClock,

    /// Kinematic states, liveness flags and behaviors (SoA arrays).
    pub agents: AgentStore,

    /// Per-agent deterministic RNGs, separated for the split-borrow pattern.
    pub rngs: AgentRngs,

    /// Markers published by formations and by the application.
    pub markers: MarkerBoard,

    pub(crate) formations: Vec<Box<dyn Choreography>>,
    pub(crate) rays:       Arc<dyn RayOracle>,
    pub(crate) shapes:     Arc<dyn ShapeOracle>,
    pub(crate) index:      AgentIndex,
    pub(crate) issues:     Vec<(AgentId, ConfigIssue)>,
}

impl Sim {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run the simulation from the current tick to `config.end_tick()`.
    ///
    /// Calls observer hooks at every tick boundary.  Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        while self.clock.current_tick < self.config.end_tick() {
            self.step(observer)?;
        }
        observer.on_sim_end(self.clock.current_tick);
        Ok(())
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`).
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.step(observer)?;
        }
        Ok(())
    }

    /// Issues reported by `validate()` at build time.
    pub fn config_issues(&self) -> &[(AgentId, ConfigIssue)] {
        &self.issues
    }

    /// Current kinematic state of every agent, indexed by `AgentId`.
    pub fn states(&self) -> &[KinematicState] {
        &self.agents.states
    }

    /// Add an agent mid-run.  It is steered from the next tick on.
    pub fn spawn(&mut self, state: KinematicState, behavior: BoxedBehavior) -> AgentId {
        let id = self.agents.push(state, behavior, self.config.delta_secs);
        self.rngs.push(id);
        id
    }

    /// Remove an agent.  Returns `false` if it was not alive.
    pub fn despawn(&mut self, agent: AgentId) -> bool {
        self.agents.despawn(agent)
    }

    /// Replace the layout of the formation registered as `handle`.  Members
    /// are spawned or despawned at the start of the next tick.
    pub fn set_formation_layout(&mut self, handle: usize, layout: Layout) -> SimResult<()> {
        let formation = self.formations.get_mut(handle).ok_or(SimError::UnknownFormation(handle))?;
        formation.relayout(layout)?;
        Ok(())
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        let now = self.clock.current_tick;
        observer.on_tick_start(now);
        let (active, events) = self.process_tick(now)?;
        if !events.is_empty() {
            observer.on_formation_events(now, &events);
        }
        observer.on_tick_end(now, active);
        if self.config.output_interval_ticks > 0
            && now.0.is_multiple_of(self.config.output_interval_ticks)
        {
            observer.on_snapshot(now, &self.agents);
        }
        self.clock.advance();
        Ok(())
    }

    fn process_tick(&mut self, now: Tick) -> SimResult<(usize, Vec<FormationEvent>)> {
        // ── Phase 1: formation membership ─────────────────────────────────
        self.sync_formations()?;

        // ── Phase 2: spatial index over the start-of-tick snapshot ────────
        self.index = AgentIndex::build(&self.agents.states, &self.agents.alive);

        // ── Phase 3: slot markers follow their ushers ─────────────────────
        let events = self.publish_formations();
        if !events.is_empty() {
            debug!("{now}: {} formation event(s)", events.len());
        }

        // ── Phase 4: steering pass (produce) ──────────────────────────────
        let steerings = self.compute_steering(now)?;

        // ── Phase 5: apply phase (consume) ────────────────────────────────
        //
        // Sequential in ascending AgentId order, so results are identical
        // whether or not the steering pass ran in parallel.
        let delta_secs = self.config.delta_secs;
        let mut active = 0;
        for (i, steering) in steerings.into_iter().enumerate() {
            if self.agents.alive[i] {
                self.agents.states[i].apply(steering, delta_secs);
                active += 1;
            }
        }
        trace!("{now}: steered {active} agents");

        Ok((active, events))
    }

    fn sync_formations(&mut self) -> SimResult<()> {
        if self.formations.is_empty() {
            return Ok(());
        }
        let mut spawner = MemberSpawner::new(self.agents.len());
        let synced = {
            let world = FormationWorld::new(&self.agents.states, &self.agents.alive, self.shapes.as_ref());
            self.formations
                .iter_mut()
                .try_for_each(|f| f.sync_members(&world, &mut self.markers, &mut spawner))
        };
        // Ids already handed out must exist even if a later formation failed.
        self.flush_spawner(spawner);
        synced?;
        Ok(())
    }

    fn flush_spawner(&mut self, spawner: MemberSpawner) {
        if spawner.is_empty() {
            return;
        }
        for request in spawner.spawns {
            let id = self.spawn(request.state, Box::new(request.member));
            debug!("spawned {id} for slot {} of group {}", request.slot, request.group);
        }
        for agent in spawner.despawns {
            if self.agents.despawn(agent) {
                debug!("despawned {agent}");
            }
        }
    }

    fn publish_formations(&mut self) -> Vec<FormationEvent> {
        let world = FormationWorld::new(&self.agents.states, &self.agents.alive, self.shapes.as_ref());
        let mut events = Vec::new();
        for formation in &mut self.formations {
            formation.publish(&world, &mut self.markers);
            events.extend(formation.drain_events());
        }
        events
    }

    /// Poll every live agent's root behavior.
    ///
    /// With the `parallel` Cargo feature the calls run on Rayon's thread
    /// pool and every live agent is polled before errors are inspected.
    /// Either way the error of the lowest failing agent id is returned.
    fn compute_steering(&mut self, now: Tick) -> SimResult<Vec<Steering>> {
        let delta_secs = self.config.delta_secs;

        // Explicit field borrows so the borrow checker sees disjoint access.
        let states    = self.agents.states.as_slice();
        let alive     = self.agents.alive.as_slice();
        let behaviors = &mut self.agents.behaviors;
        let args      = &mut self.agents.args;
        let rngs      = &mut self.rngs.inner;

        for (a, state) in args.iter_mut().zip(states) {
            a.refresh(state, delta_secs);
        }

        let ctx = SteeringContext::new(
            now,
            delta_secs,
            states,
            alive,
            &self.index,
            &self.markers,
            self.rays.as_ref(),
            self.shapes.as_ref(),
        );

        #[cfg(not(feature = "parallel"))]
        {
            behaviors
                .iter_mut()
                .zip(args.iter())
                .zip(rngs.iter_mut())
                .zip(alive.iter())
                .map(|(((behavior, a), rng), &live)| match behavior {
                    Some(b) if live => b
                        .steering(a, &ctx, rng)
                        .map_err(|source| SimError::Behavior { agent: a.agent, source }),
                    _ => Ok(None),
                })
                .collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;

            behaviors
                .par_iter_mut()
                .zip(args.par_iter())
                .zip(rngs.par_iter_mut())
                .zip(alive.par_iter())
                .map(|(((behavior, a), rng), &live)| match behavior {
                    Some(b) if live => b
                        .steering(a, &ctx, rng)
                        .map_err(|source| SimError::Behavior { agent: a.agent, source }),
                    _ => Ok(None),
                })
                .collect::<Vec<SimResult<Steering>>>()
                .into_iter()
                .collect()
        }
    }
}
