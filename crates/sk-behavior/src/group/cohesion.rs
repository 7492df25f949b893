use sk_core::{AgentRng, Steering, Vec2};

use crate::behavior::nested;
use crate::{
    AgentSet, Arrive, BehaviorResult, ConfigIssue, Marker, MarkerSteering, SteeringArgs, SteeringBehavior,
    SteeringContext,
};

/// Steer toward the centroid of a set of agents.
///
/// `approach` is usually [`Arrive`] (the default) or [`Seek`](crate::Seek).
/// Declines when no agent of the set is within `radius`.
pub struct Cohesion<A = Arrive> {
    pub targets: AgentSet,
    /// Neighborhood radius; infinite means the whole set.
    pub radius: f32,
    pub approach: A,
}

impl Cohesion<Arrive> {
    pub fn new(targets: AgentSet, radius: f32) -> Self {
        Self { targets, radius, approach: Arrive::default() }
    }
}

impl<A: MarkerSteering> Cohesion<A> {
    pub fn with_approach<B: MarkerSteering>(self, approach: B) -> Cohesion<B> {
        Cohesion { targets: self.targets, radius: self.radius, approach }
    }
}

impl<A: MarkerSteering> SteeringBehavior for Cohesion<A> {
    fn steering(
        &mut self,
        args: &SteeringArgs,
        ctx:  &SteeringContext<'_>,
        rng:  &mut AgentRng,
    ) -> BehaviorResult<Steering> {
        let neighbors = ctx.agents_near(&self.targets, args.agent, args.position, self.radius);
        if neighbors.is_empty() {
            return Ok(None);
        }
        let sum: Vec2 = neighbors.iter().map(|(_, s)| s.position).sum();
        let centroid = Marker::at(sum / neighbors.len() as f32);
        Ok(self.approach.steer_to(args, &centroid, rng))
    }

    fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues: Vec<_> = nested("cohesion", self.approach.validate()).collect();
        if self.radius <= 0.0 {
            issues.push(ConfigIssue::new("cohesion", "radius must be positive"));
        }
        issues
    }

    fn name(&self) -> &'static str {
        "cohesion"
    }
}
