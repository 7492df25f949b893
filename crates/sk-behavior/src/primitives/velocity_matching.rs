use sk_core::{AgentRng, Steering, SteeringOutput, Vec2};

use crate::{ConfigIssue, Marker, MarkerSteering, SteeringArgs, Target, Targeted};

/// Match the target's velocity within `time_to_match` seconds.
///
/// The acceleration `(target − current) / time_to_match` is clamped to
/// `max_deceleration` when it opposes the current velocity and to
/// `max_acceleration` otherwise.  It is computed once per change of the
/// target velocity and then applied unchanged, so the agent reaches the
/// target velocity in finite time instead of approaching it asymptotically.
/// It is also recomputed when the stored acceleration no longer points
/// toward the target velocity.  The final step lands exactly on the target
/// velocity.
#[derive(Clone, Debug, PartialEq)]
pub struct VelocityMatching {
    pub time_to_match: f32,
    matched_target: Option<Vec2>,
    acceleration: Vec2,
}

impl VelocityMatching {
    pub fn new(time_to_match: f32) -> Self {
        Self { time_to_match, matched_target: None, acceleration: Vec2::ZERO }
    }

    pub fn targeting(self, target: impl Into<Target>) -> Targeted<Self> {
        Targeted::new(target, self)
    }

    /// Acceleration currently being applied.
    pub fn acceleration(&self) -> Vec2 {
        self.acceleration
    }
}

impl Default for VelocityMatching {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl MarkerSteering for VelocityMatching {
    fn steer_to(&mut self, args: &SteeringArgs, marker: &Marker, _rng: &mut AgentRng) -> Steering {
        let target = marker.velocity.clamp_length_max(args.max_speed);
        let gap = target - args.velocity;

        let mut step = self.acceleration * args.delta_secs;
        // Re-plan when the target changes or the agent was pushed past it.
        if self.matched_target != Some(target) || step.dot(gap) <= 0.0 {
            let wanted = gap / self.time_to_match.max(f32::EPSILON);
            let braking = wanted.dot(args.velocity) < 0.0;
            let limit = if braking { args.max_deceleration } else { args.max_acceleration };
            self.acceleration = wanted.clamp_length_max(limit.max(0.0));
            self.matched_target = Some(target);
            step = self.acceleration * args.delta_secs;
        }

        if step.length_squared() >= gap.length_squared() {
            return Some(SteeringOutput::linear(target));
        }
        Some(SteeringOutput::linear(args.velocity + step))
    }

    fn validate(&self) -> Vec<ConfigIssue> {
        if self.time_to_match <= 0.0 {
            vec![ConfigIssue::new("velocity-matching", "time to match must be positive")]
        } else {
            Vec::new()
        }
    }

    fn name(&self) -> &'static str {
        "velocity-matching"
    }
}
