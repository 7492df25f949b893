use sk_core::{AgentRng, Steering};

use crate::{ConfigIssue, Marker, MarkerSteering, Seek, SteeringArgs, Target, Targeted};

/// Run directly away from a threat inside `panic_distance`; decline outside.
///
/// The output is exactly the negation of [`Seek`] toward the same point.
#[derive(Clone, Debug, PartialEq)]
pub struct Flee {
    pub panic_distance: f32,
    seek: Seek,
}

impl Flee {
    pub fn new(panic_distance: f32) -> Self {
        Self { panic_distance, seek: Seek::new(0.0) }
    }

    pub fn targeting(self, target: impl Into<Target>) -> Targeted<Self> {
        Targeted::new(target, self)
    }
}

impl Default for Flee {
    fn default() -> Self {
        Self::new(200.0)
    }
}

impl MarkerSteering for Flee {
    fn steer_to(&mut self, args: &SteeringArgs, marker: &Marker, rng: &mut AgentRng) -> Steering {
        if args.position.distance(marker.position) > self.panic_distance {
            return None;
        }
        self.seek.steer_to(args, marker, rng).map(|out| out * -1.0)
    }

    fn validate(&self) -> Vec<ConfigIssue> {
        if self.panic_distance <= 0.0 {
            vec![ConfigIssue::new("flee", "panic distance must be positive")]
        } else {
            Vec::new()
        }
    }

    fn name(&self) -> &'static str {
        "flee"
    }
}
