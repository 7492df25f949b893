use sk_core::{AgentId, AgentRng, Steering, Vec2};

use super::look_ahead;
use crate::behavior::nested;
use crate::{
    Arrive, BehaviorResult, ConfigIssue, Marker, MarkerSteering, SteeringArgs, SteeringBehavior,
    SteeringContext,
};

/// Get between two agents.
///
/// Estimates how long it would take to reach their current midpoint at full
/// speed, extrapolates both agents that far ahead, and approaches the
/// midpoint of the extrapolated positions.  The prediction is only redone
/// when either agent has moved since it was last computed.
pub struct Interpose<A = Arrive> {
    pub first: AgentId,
    pub second: AgentId,
    pub max_prediction: f32,
    pub approach: A,
    last_seen: Option<(Vec2, Vec2)>,
    predicted: Vec2,
}

impl Interpose<Arrive> {
    pub fn new(first: AgentId, second: AgentId) -> Self {
        Self {
            first,
            second,
            max_prediction: 2.0,
            approach: Arrive::default(),
            last_seen: None,
            predicted: Vec2::ZERO,
        }
    }
}

impl<A: MarkerSteering> Interpose<A> {
    pub fn with_approach<B: MarkerSteering>(self, approach: B) -> Interpose<B> {
        Interpose {
            first:          self.first,
            second:         self.second,
            max_prediction: self.max_prediction,
            approach,
            last_seen:      None,
            predicted:      Vec2::ZERO,
        }
    }

    /// The last predicted meeting point.
    pub fn predicted(&self) -> Option<Vec2> {
        self.last_seen.map(|_| self.predicted)
    }
}

impl<A: MarkerSteering> SteeringBehavior for Interpose<A> {
    fn steering(
        &mut self,
        args: &SteeringArgs,
        ctx:  &SteeringContext<'_>,
        rng:  &mut AgentRng,
    ) -> BehaviorResult<Steering> {
        let (Some(a), Some(b)) = (ctx.agent(self.first), ctx.agent(self.second)) else {
            return Ok(None);
        };

        let seen = (a.position, b.position);
        if self.last_seen != Some(seen) {
            let midpoint = (a.position + b.position) * 0.5;
            let t = look_ahead(args.position.distance(midpoint), args.max_speed, self.max_prediction);
            self.predicted = (a.position + a.velocity * t + b.position + b.velocity * t) * 0.5;
            self.last_seen = Some(seen);
        }
        Ok(self.approach.steer_to(args, &Marker::at(self.predicted), rng))
    }

    fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues: Vec<_> = nested("interpose", self.approach.validate()).collect();
        if self.first == self.second {
            issues.push(ConfigIssue::new("interpose", "both tracked agents are the same"));
        }
        issues
    }

    fn name(&self) -> &'static str {
        "interpose"
    }
}
