use sk_core::math::shortest_angle;
use sk_core::{AgentRng, Curve, Steering, SteeringOutput};

use super::approach_floor;
use crate::{ConfigIssue, Marker, MarkerSteering, SteeringArgs, Target, Targeted};

/// Rotate to match a target orientation.
///
/// Same three phases as [`Arrive`](crate::Arrive), over angles: speed up
/// while within `acceleration_angle` of the starting orientation, cruise at
/// `max_rotation`, slow down inside `deceleration_angle` of the target, and
/// stop within `alignment_tolerance`.  Always turns the short way round.
///
/// Declines when the marker carries no orientation.
#[derive(Clone, Debug, PartialEq)]
pub struct Align {
    /// Degrees.
    pub alignment_tolerance: f32,
    /// Degrees.
    pub acceleration_angle: f32,
    /// Degrees.
    pub deceleration_angle: f32,
    pub acceleration_curve: Curve,
    pub deceleration_curve: Curve,
    idle: bool,
    start_orientation: f32,
}

impl Align {
    pub fn new(alignment_tolerance: f32, acceleration_angle: f32, deceleration_angle: f32) -> Self {
        Self {
            alignment_tolerance,
            acceleration_angle,
            deceleration_angle,
            acceleration_curve: Curve::default(),
            deceleration_curve: Curve::ramp(0.0),
            idle: true,
            start_orientation: 0.0,
        }
    }

    pub fn with_curves(mut self, acceleration: Curve, deceleration: Curve) -> Self {
        self.acceleration_curve = acceleration;
        self.deceleration_curve = deceleration;
        self
    }

    pub fn targeting(self, target: impl Into<Target>) -> Targeted<Self> {
        Targeted::new(target, self)
    }

    pub fn is_idle(&self) -> bool {
        self.idle
    }

    /// Angular output that turns from `args.orientation` to `orientation`.
    pub fn rotate_to(&mut self, args: &SteeringArgs, orientation: f32) -> SteeringOutput {
        let diff = shortest_angle(args.orientation, orientation);
        let remaining = diff.abs();
        if remaining <= self.alignment_tolerance {
            self.idle = true;
            return SteeringOutput::ZERO;
        }
        if self.idle {
            self.start_orientation = args.orientation;
            self.idle = false;
        }

        let turned = shortest_angle(self.start_orientation, args.orientation).abs();
        let accelerating = if turned < self.acceleration_angle && self.acceleration_angle > 0.0 {
            self.acceleration_curve.sample(turned / self.acceleration_angle)
        } else {
            1.0
        };
        let braking = if remaining < self.deceleration_angle && self.deceleration_angle > 0.0 {
            self.deceleration_curve.sample(remaining / self.deceleration_angle)
        } else {
            1.0
        };

        let floor = approach_floor(args.max_rotation, args.stop_rotation_threshold);
        let mut rate = (args.max_rotation * accelerating.min(braking)).clamp(floor, args.max_rotation);
        if args.delta_secs > 0.0 {
            rate = rate.min(remaining / args.delta_secs);
        }
        SteeringOutput::angular(rate * diff.signum())
    }
}

impl Default for Align {
    fn default() -> Self {
        Self::new(1.0, 15.0, 45.0)
    }
}

impl MarkerSteering for Align {
    fn steer_to(&mut self, args: &SteeringArgs, marker: &Marker, _rng: &mut AgentRng) -> Steering {
        marker.orientation.map(|o| self.rotate_to(args, o))
    }

    fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.alignment_tolerance < 0.0 {
            issues.push(ConfigIssue::new("align", "alignment tolerance must not be negative"));
        }
        if self.deceleration_angle < self.alignment_tolerance {
            issues.push(ConfigIssue::new("align", "deceleration angle is inside the alignment tolerance"));
        }
        issues
    }

    fn name(&self) -> &'static str {
        "align"
    }
}
