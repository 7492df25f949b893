use sk_core::math::{is_negligible, orientation_of};
use sk_core::{AgentRng, Steering};

use crate::{Align, ConfigIssue, Marker, MarkerSteering, SteeringArgs, Target, Targeted};

/// Turn to look at the target's position by aligning with a synthesized
/// look-at pose.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Face {
    pub align: Align,
}

impl Face {
    pub fn new(align: Align) -> Self {
        Self { align }
    }

    pub fn targeting(self, target: impl Into<Target>) -> Targeted<Self> {
        Targeted::new(target, self)
    }
}

impl MarkerSteering for Face {
    fn steer_to(&mut self, args: &SteeringArgs, marker: &Marker, rng: &mut AgentRng) -> Steering {
        let to_target = marker.position - args.position;
        if is_negligible(to_target) {
            return None;
        }
        let look_at = Marker::posed(args.position, orientation_of(to_target));
        self.align.steer_to(args, &look_at, rng)
    }

    fn validate(&self) -> Vec<ConfigIssue> {
        self.align.validate().into_iter().map(|i| i.within("face")).collect()
    }

    fn name(&self) -> &'static str {
        "face"
    }
}
