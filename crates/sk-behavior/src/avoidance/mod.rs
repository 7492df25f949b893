//! Collision avoidance.
//!
//! A [`PassiveAvoider`] only reports an avoidance vector (a velocity offset
//! of up to `max_speed`) when something is about to be hit.  Passive
//! avoiders are also complete behaviors on their own; [`ActiveAvoider`]
//! layers one on top of a goal behavior.

mod active;
mod agent;
mod wall;

pub use active::{ActiveAgentAvoider, ActiveAvoider, ActiveWallAvoider};
pub use agent::AgentAvoider;
pub use wall::WallAvoider;

use sk_core::{AgentRng, Vec2};

use crate::{ConfigIssue, SteeringArgs, SteeringContext};

/// Detects imminent collisions and proposes a way out.
pub trait PassiveAvoider: Send {
    /// Velocity offset that avoids the most urgent collision, or `None` when
    /// nothing needs avoiding this tick.
    fn avoidance(&mut self, args: &SteeringArgs, ctx: &SteeringContext<'_>, rng: &mut AgentRng) -> Option<Vec2>;

    fn validate(&self) -> Vec<ConfigIssue> {
        Vec::new()
    }

    fn name(&self) -> &'static str;
}

/// Implements `SteeringBehavior` for a passive avoider: the avoidance vector
/// becomes the linear output.
macro_rules! passive_behavior {
    ($ty:ty) => {
        impl $crate::SteeringBehavior for $ty {
            fn steering(
                &mut self,
                args: &$crate::SteeringArgs,
                ctx:  &$crate::SteeringContext<'_>,
                rng:  &mut sk_core::AgentRng,
            ) -> $crate::BehaviorResult<sk_core::Steering> {
                Ok($crate::avoidance::PassiveAvoider::avoidance(self, args, ctx, rng)
                    .map(sk_core::SteeringOutput::linear))
            }

            fn validate(&self) -> Vec<$crate::ConfigIssue> {
                $crate::avoidance::PassiveAvoider::validate(self)
            }

            fn name(&self) -> &'static str {
                $crate::avoidance::PassiveAvoider::name(self)
            }
        }
    };
}
pub(crate) use passive_behavior;
