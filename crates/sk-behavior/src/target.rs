//! Steering destinations.

use sk_core::{AgentId, KinematicState, MarkerId, Vec2};

/// A resolved destination: where to go, which way to face, how it moves.
///
/// Composite behaviors build these on the fly (predicted positions,
/// centroids, look-at poses) and hand them to their inner primitives.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Marker {
    pub position: Vec2,
    /// Facing to align with, in degrees.  `None` for bare points.
    pub orientation: Option<f32>,
    pub velocity: Vec2,
}

impl Marker {
    /// A motionless point with no facing.
    pub fn at(position: Vec2) -> Self {
        Self { position, orientation: None, velocity: Vec2::ZERO }
    }

    /// A motionless pose.
    pub fn posed(position: Vec2, orientation: f32) -> Self {
        Self { position, orientation: Some(orientation), velocity: Vec2::ZERO }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// The current pose and velocity of an agent.
    pub fn of_agent(state: &KinematicState) -> Self {
        Self {
            position:    state.position,
            orientation: Some(state.orientation),
            velocity:    state.velocity,
        }
    }
}

/// What a behavior steers relative to.
///
/// Resolved against the tick's [`SteeringContext`](crate::SteeringContext):
/// agents and markers that no longer exist resolve to `None` and the
/// behavior declines to act.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Target {
    Point(Vec2),
    Pose { position: Vec2, orientation: f32 },
    Agent(AgentId),
    Marker(MarkerId),
}

impl From<Vec2> for Target {
    fn from(p: Vec2) -> Self {
        Target::Point(p)
    }
}

impl From<AgentId> for Target {
    fn from(id: AgentId) -> Self {
        Target::Agent(id)
    }
}

impl From<MarkerId> for Target {
    fn from(id: MarkerId) -> Self {
        Target::Marker(id)
    }
}
