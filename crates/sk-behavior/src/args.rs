//! Per-agent, per-tick steering inputs.

use sk_core::{AgentId, KinematicState, Vec2};
use sk_core::math::heading;

/// The bundle handed down a behavior tree every tick.
///
/// Owned by the host, one per agent, and refreshed in place from the agent's
/// [`KinematicState`] before the root behavior is polled, so no allocation
/// happens between ticks.
#[derive(Clone, Debug, PartialEq)]
pub struct SteeringArgs {
    pub agent: AgentId,

    pub position: Vec2,
    /// Degrees, counter-clockwise from +X.
    pub orientation: f32,
    pub velocity: Vec2,
    pub angular_velocity: f32,

    pub max_speed: f32,
    pub stop_speed: f32,
    pub max_rotation: f32,
    pub stop_rotation_threshold: f32,
    pub max_acceleration: f32,
    pub max_deceleration: f32,
    pub radius: f32,

    /// Seconds covered by this tick.
    pub delta_secs: f32,
}

impl SteeringArgs {
    pub fn new(agent: AgentId, state: &KinematicState, delta_secs: f32) -> Self {
        Self {
            agent,
            position:                state.position,
            orientation:             state.orientation,
            velocity:                state.velocity,
            angular_velocity:        state.angular_velocity,
            max_speed:               state.max_speed,
            stop_speed:              state.stop_speed,
            max_rotation:            state.max_rotation,
            stop_rotation_threshold: state.stop_rotation_threshold,
            max_acceleration:        state.max_acceleration,
            max_deceleration:        state.max_deceleration,
            radius:                  state.radius,
            delta_secs,
        }
    }

    /// Copy the latest kinematic state into `self`.
    pub fn refresh(&mut self, state: &KinematicState, delta_secs: f32) {
        self.position = state.position;
        self.orientation = state.orientation;
        self.velocity = state.velocity;
        self.angular_velocity = state.angular_velocity;
        self.max_speed = state.max_speed;
        self.stop_speed = state.stop_speed;
        self.max_rotation = state.max_rotation;
        self.stop_rotation_threshold = state.stop_rotation_threshold;
        self.max_acceleration = state.max_acceleration;
        self.max_deceleration = state.max_deceleration;
        self.radius = state.radius;
        self.delta_secs = delta_secs;
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Unit vector along the current orientation.
    #[inline]
    pub fn forward(&self) -> Vec2 {
        heading(self.orientation)
    }

    /// Unit direction of travel, falling back to `forward()` when stopped.
    pub fn travel_direction(&self) -> Vec2 {
        if self.speed() > self.stop_speed {
            self.velocity / self.speed()
        } else {
            self.forward()
        }
    }
}
