use sk_core::{AgentRng, Steering, SteeringOutput};

use crate::{ConfigIssue, Marker, MarkerSteering, SteeringArgs, Target, Targeted};

/// Full speed straight at the target; a zero output inside
/// `arrival_distance`.
#[derive(Clone, Debug, PartialEq)]
pub struct Seek {
    pub arrival_distance: f32,
}

impl Seek {
    pub fn new(arrival_distance: f32) -> Self {
        Self { arrival_distance }
    }

    pub fn targeting(self, target: impl Into<Target>) -> Targeted<Self> {
        Targeted::new(target, self)
    }
}

impl Default for Seek {
    fn default() -> Self {
        Self::new(5.0)
    }
}

impl MarkerSteering for Seek {
    fn steer_to(&mut self, args: &SteeringArgs, marker: &Marker, _rng: &mut AgentRng) -> Steering {
        let to_target = marker.position - args.position;
        let distance = to_target.length();
        if distance <= self.arrival_distance || distance <= f32::EPSILON {
            return Some(SteeringOutput::ZERO);
        }
        Some(SteeringOutput::linear(to_target / distance * args.max_speed))
    }

    fn validate(&self) -> Vec<ConfigIssue> {
        if self.arrival_distance < 0.0 {
            vec![ConfigIssue::new("seek", "arrival distance must not be negative")]
        } else {
            Vec::new()
        }
    }

    fn name(&self) -> &'static str {
        "seek"
    }
}
