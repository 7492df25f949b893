//! Per-agent kinematic state and the once-per-tick integrator.

use glam::Vec2;

use crate::math::{heading, orientation_of, shortest_angle, wrap_degrees};
use crate::{Steering, SteeringOutput};

/// Pose, motion and movement limits of one agent.
///
/// Owned by the host's agent store and mutated exactly once per tick by
/// [`apply`](Self::apply) after every behavior has been evaluated against
/// the tick's snapshot.  `velocity.length() <= max_speed` is a target the
/// behaviors respect; `apply` additionally clamps the commanded velocity.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KinematicState {
    pub position: Vec2,
    /// Degrees, counter-clockwise from +X.
    pub orientation: f32,
    pub velocity: Vec2,
    /// Current rotation speed in degrees per second.
    pub angular_velocity: f32,

    /// Units per second.
    pub max_speed: f32,
    /// Below this speed the agent is considered stopped.
    pub stop_speed: f32,
    /// Degrees per second.
    pub max_rotation: f32,
    /// Below this rotation speed (degrees per second) the agent is considered
    /// not to be turning.
    pub stop_rotation_threshold: f32,
    /// Units per second squared.
    pub max_acceleration: f32,
    /// Units per second squared.
    pub max_deceleration: f32,

    /// Body radius, used by sensing and spawn placement.
    pub radius: f32,

    /// When `true` and the commanded output has no angular component, the
    /// agent turns toward its direction of travel (bounded by `max_rotation`).
    pub auto_orient: bool,
}

impl Default for KinematicState {
    fn default() -> Self {
        Self {
            position:                Vec2::ZERO,
            orientation:             0.0,
            velocity:                Vec2::ZERO,
            angular_velocity:        0.0,
            max_speed:               100.0,
            stop_speed:              1.0,
            max_rotation:            180.0,
            stop_rotation_threshold: 1.0,
            max_acceleration:        200.0,
            max_deceleration:        200.0,
            radius:                  8.0,
            auto_orient:             true,
        }
    }
}

impl KinematicState {
    /// Default limits, placed at `position` facing `orientation`.
    pub fn at(position: Vec2, orientation: f32) -> Self {
        Self { position, orientation, ..Self::default() }
    }

    pub fn with_max_speed(mut self, max_speed: f32) -> Self {
        self.max_speed = max_speed;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_acceleration(mut self, max_acceleration: f32, max_deceleration: f32) -> Self {
        self.max_acceleration = max_acceleration;
        self.max_deceleration = max_deceleration;
        self
    }

    pub fn with_rotation(mut self, max_rotation: f32) -> Self {
        self.max_rotation = max_rotation;
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_auto_orient(mut self, auto_orient: bool) -> Self {
        self.auto_orient = auto_orient;
        self
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

    /// `true` when both linear and rotation speeds are below their stop
    /// thresholds.
    pub fn is_stopped(&self) -> bool {
        self.speed() < self.stop_speed && self.angular_velocity.abs() < self.stop_rotation_threshold
    }

    /// Integrate one tick of `steering`.
    ///
    /// `None` brings the agent to rest.  The linear part is taken as the new
    /// velocity (clamped to `max_speed`) and the angular part as the new
    /// rotation speed (clamped to `max_rotation`).
    pub fn apply(&mut self, steering: Steering, delta_secs: f32) {
        let output = steering.unwrap_or(SteeringOutput::ZERO);

        self.velocity = output.linear.clamp_length_max(self.max_speed.max(0.0));
        self.angular_velocity = output.angular.clamp(-self.max_rotation, self.max_rotation);

        self.position += self.velocity * delta_secs;
        self.orientation = wrap_degrees(self.orientation + self.angular_velocity * delta_secs);

        if self.auto_orient
            && self.angular_velocity.abs() < self.stop_rotation_threshold
            && self.velocity.length() > self.stop_speed
        {
            let wanted = orientation_of(self.velocity);
            let max_step = self.max_rotation * delta_secs;
            let step = shortest_angle(self.orientation, wanted).clamp(-max_step, max_step);
            self.orientation = wrap_degrees(self.orientation + step);
        }
    }
}
