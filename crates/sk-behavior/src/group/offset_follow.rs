use sk_core::math::rotate;
use sk_core::{AgentId, AgentRng, Steering, SteeringOutput, Vec2};

use super::look_ahead;
use crate::behavior::nested;
use crate::{
    Align, Arrive, BehaviorResult, ConfigIssue, Marker, MarkerSteering, SteeringArgs, SteeringBehavior,
    SteeringContext,
};

/// Hold a position relative to a leader.
///
/// `offset` is in the leader's frame (+X ahead, +Y to its left).  The slot
/// is extrapolated along the leader's velocity by the usual look-ahead and
/// approached with [`Arrive`]; once arrived, the follower optionally turns
/// to the leader's orientation.
pub struct OffsetFollow {
    pub leader: AgentId,
    pub offset: Vec2,
    pub max_prediction: f32,
    pub arrive: Arrive,
    pub align: Option<Align>,
}

impl OffsetFollow {
    pub fn new(leader: AgentId, offset: Vec2) -> Self {
        Self { leader, offset, max_prediction: 1.0, arrive: Arrive::default(), align: Some(Align::default()) }
    }

    pub fn without_align(mut self) -> Self {
        self.align = None;
        self
    }
}

impl SteeringBehavior for OffsetFollow {
    fn steering(
        &mut self,
        args: &SteeringArgs,
        ctx:  &SteeringContext<'_>,
        rng:  &mut AgentRng,
    ) -> BehaviorResult<Steering> {
        let Some(leader) = ctx.agent(self.leader) else {
            return Ok(None);
        };
        let slot = leader.position + rotate(self.offset, leader.orientation);
        let t = look_ahead(args.position.distance(slot), args.speed() + leader.velocity.length(), self.max_prediction);
        let target = Marker::posed(slot + leader.velocity * t, leader.orientation);

        let out = self.arrive.steer_to(args, &target, rng).unwrap_or(SteeringOutput::ZERO);
        if !out.is_zero() {
            return Ok(Some(out));
        }
        Ok(Some(match &mut self.align {
            Some(align) => align.steer_to(args, &target, rng).unwrap_or(SteeringOutput::ZERO),
            None => SteeringOutput::ZERO,
        }))
    }

    fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues: Vec<_> = nested("offset-follow", self.arrive.validate()).collect();
        if let Some(align) = &self.align {
            issues.extend(nested("offset-follow", align.validate()));
        }
        if self.leader == AgentId::INVALID {
            issues.push(ConfigIssue::new("offset-follow", "leader is unset"));
        }
        issues
    }

    fn name(&self) -> &'static str {
        "offset-follow"
    }
}
