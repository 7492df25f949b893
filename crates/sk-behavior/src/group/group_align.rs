use sk_core::math::{heading, is_negligible, orientation_of};
use sk_core::{AgentRng, Steering, Vec2};

use crate::behavior::nested;
use crate::{
    AgentSet, Align, BehaviorResult, ConfigIssue, Marker, MarkerSteering, SteeringArgs, SteeringBehavior,
    SteeringContext,
};

/// Turn to the average heading of a set of agents.
///
/// Headings are averaged as unit vectors, not as angles, so a group facing
/// 179° and −179° averages to 180° rather than 0°.  Declines when the set is
/// empty or the headings cancel out.
pub struct GroupAlign {
    pub targets: AgentSet,
    pub radius: f32,
    pub align: Align,
}

impl GroupAlign {
    pub fn new(targets: AgentSet, radius: f32) -> Self {
        Self { targets, radius, align: Align::default() }
    }
}

impl SteeringBehavior for GroupAlign {
    fn steering(
        &mut self,
        args: &SteeringArgs,
        ctx:  &SteeringContext<'_>,
        rng:  &mut AgentRng,
    ) -> BehaviorResult<Steering> {
        let sum: Vec2 = ctx
            .agents_near(&self.targets, args.agent, args.position, self.radius)
            .iter()
            .map(|(_, s)| heading(s.orientation))
            .sum();
        if is_negligible(sum) {
            return Ok(None);
        }
        let average = Marker::posed(args.position, orientation_of(sum));
        Ok(self.align.steer_to(args, &average, rng))
    }

    fn validate(&self) -> Vec<ConfigIssue> {
        nested("group-align", self.align.validate()).collect()
    }

    fn name(&self) -> &'static str {
        "group-align"
    }
}
