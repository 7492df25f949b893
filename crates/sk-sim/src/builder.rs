//! Fluent builder for constructing a [`Sim`].

use std::sync::Arc;

use log::warn;

use sk_behavior::{BoxedBehavior, ConfigIssue, Marker, MarkerBoard};
use sk_core::{AgentId, KinematicState, MarkerId, SimConfig};
use sk_formation::Choreography;
use sk_sense::{AgentIndex, NoObstacles, ObstacleSet, RayOracle, ShapeOracle};

use crate::{AgentRngs, AgentStore, Sim, SimError, SimResult};

/// Fluent builder for [`Sim`].
///
/// # Required inputs
///
/// - [`SimConfig`]: tick duration, total ticks, seed, …
///
/// # Optional inputs (have defaults)
///
/// | Method                  | Default                              |
/// |-------------------------|--------------------------------------|
/// | `.add_agent(s, b)`      | no agents                            |
/// | `.add_marker(m)`        | empty `MarkerBoard`                  |
/// | `.obstacles(set)`       | `NoObstacles` for rays and shapes    |
/// | `.oracles(rays, shapes)`| `NoObstacles` for rays and shapes    |
/// | `.add_formation(f)`     | no formations                        |
///
/// # Example
///
/// ```rust,ignore
/// let mut builder = SimBuilder::new(config).obstacles(walls);
/// let usher = builder.add_agent(KinematicState::at(start, 0.0), Box::new(UsherHinge::new(goal)));
/// builder.add_formation(Box::new(Formation::new(GroupId(1), usher, layout)?));
/// let mut sim = builder.build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder {
    config:     SimConfig,
    agents:     Vec<(KinematicState, BoxedBehavior)>,
    markers:    MarkerBoard,
    rays:       Arc<dyn RayOracle>,
    shapes:     Arc<dyn ShapeOracle>,
    formations: Vec<Box<dyn Choreography>>,
}

impl SimBuilder {
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            agents:     Vec::new(),
            markers:    MarkerBoard::new(),
            rays:       Arc::new(NoObstacles),
            shapes:     Arc::new(NoObstacles),
            formations: Vec::new(),
        }
    }

    /// Add an agent with its root behavior.  Ids are assigned in call order
    /// starting at 0.
    pub fn add_agent(&mut self, state: KinematicState, behavior: BoxedBehavior) -> AgentId {
        self.agents.push((state, behavior));
        AgentId((self.agents.len() - 1) as u32)
    }

    /// Publish a static marker that behaviors can target by id.
    pub fn add_marker(&mut self, marker: Marker) -> MarkerId {
        self.markers.insert(marker)
    }

    /// Use `set` for both ray casts and shape overlap queries.
    pub fn obstacles(mut self, set: ObstacleSet) -> Self {
        let set = Arc::new(set);
        self.rays = set.clone();
        self.shapes = set;
        self
    }

    /// Supply the geometry oracles directly.
    pub fn oracles(mut self, rays: Arc<dyn RayOracle>, shapes: Arc<dyn ShapeOracle>) -> Self {
        self.rays = rays;
        self.shapes = shapes;
        self
    }

    /// Register a formation.  Returns the handle used by
    /// [`Sim::set_formation_layout`].
    pub fn add_formation(&mut self, formation: Box<dyn Choreography>) -> usize {
        self.formations.push(formation);
        self.formations.len() - 1
    }

    /// Validate the configuration and every behavior tree, and return a
    /// ready-to-run [`Sim`].
    ///
    /// Behavior issues are logged as warnings.  With
    /// `config.strict_validation` they abort the build instead.
    pub fn build(self) -> SimResult<Sim> {
        if !(self.config.delta_secs > 0.0) {
            return Err(SimError::Config(format!(
                "tick duration must be positive, got {}",
                self.config.delta_secs
            )));
        }

        // ── Validate behavior trees ───────────────────────────────────────
        let issues: Vec<(AgentId, ConfigIssue)> = self
            .agents
            .iter()
            .enumerate()
            .flat_map(|(i, (_, behavior))| {
                behavior.validate().into_iter().map(move |issue| (AgentId(i as u32), issue))
            })
            .collect();
        for (agent, issue) in &issues {
            warn!("agent {agent}: {issue}");
        }
        if self.config.strict_validation {
            if let Some((agent, issue)) = issues.first() {
                return Err(SimError::InvalidConfiguration {
                    count: issues.len(),
                    first: format!("agent {agent}: {issue}"),
                });
            }
        }

        // ── Fill the agent store ──────────────────────────────────────────
        let mut agents = AgentStore::new();
        let mut rngs = AgentRngs::new(self.config.seed);
        for (state, behavior) in self.agents {
            let id = agents.push(state, behavior, self.config.delta_secs);
            rngs.push(id);
        }

        Ok(Sim {
            clock:      self.config.make_clock(),
            config:     self.config,
            agents,
            rngs,
            markers:    self.markers,
            formations: self.formations,
            rays:       self.rays,
            shapes:     self.shapes,
            index:      AgentIndex::empty(),
            issues,
        })
    }
}
