use sk_core::{AgentRng, Countdown, Steering, SteeringOutput, Vec2};

use super::{AgentAvoider, PassiveAvoider, WallAvoider};
use crate::behavior::nested;
use crate::{BehaviorResult, BoxedBehavior, ConfigIssue, SteeringArgs, SteeringBehavior, SteeringContext};

/// A goal behavior with collision avoidance layered on top.
///
/// The avoider's vector is added to the goal's output.  After the last
/// detection the same vector keeps being applied for `cooldown` seconds so
/// the agent clears the obstacle instead of turning straight back into it.
pub struct ActiveAvoider<P> {
    pub goal: BoxedBehavior,
    pub avoider: P,
    cooldown: Countdown,
    last: Option<Vec2>,
}

pub type ActiveAgentAvoider = ActiveAvoider<AgentAvoider>;
pub type ActiveWallAvoider = ActiveAvoider<WallAvoider>;

impl<P: PassiveAvoider> ActiveAvoider<P> {
    pub fn new(goal: impl SteeringBehavior + 'static, avoider: P, cooldown_secs: f32) -> Self {
        Self { goal: Box::new(goal), avoider, cooldown: Countdown::once(cooldown_secs), last: None }
    }

    /// `true` while an avoidance vector is being applied.
    pub fn is_avoiding(&self) -> bool {
        self.last.is_some()
    }
}

impl<P: PassiveAvoider> SteeringBehavior for ActiveAvoider<P> {
    fn steering(
        &mut self,
        args: &SteeringArgs,
        ctx:  &SteeringContext<'_>,
        rng:  &mut AgentRng,
    ) -> BehaviorResult<Steering> {
        let goal = self.goal.steering(args, ctx, rng)?;

        match self.avoider.avoidance(args, ctx, rng) {
            Some(vector) => {
                self.last = Some(vector);
                self.cooldown.start();
            }
            None if self.cooldown.is_running() => {
                if self.cooldown.tick(args.delta_secs) {
                    self.last = None;
                }
            }
            None => self.last = None,
        }

        Ok(match (goal, self.last) {
            (goal, Some(vector)) => {
                let combined = goal.unwrap_or(SteeringOutput::ZERO) + SteeringOutput::linear(vector);
                Some(combined.clamp_linear(args.max_speed))
            }
            (goal, None) => goal,
        })
    }

    fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues: Vec<_> = nested("active-avoider/goal", self.goal.validate()).collect();
        issues.extend(nested("active-avoider", self.avoider.validate()));
        if self.cooldown.duration_secs() < 0.0 {
            issues.push(ConfigIssue::new("active-avoider", "cooldown must not be negative"));
        }
        issues
    }

    fn name(&self) -> &'static str {
        "active-avoider"
    }
}
