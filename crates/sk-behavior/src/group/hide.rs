use sk_core::{AgentId, AgentRng, Steering, Vec2};

use crate::{BehaviorError, BehaviorResult, ConfigIssue, SteeringArgs, SteeringBehavior, SteeringContext};

/// The point `distance_from_boundary` beyond a disc obstacle on the far side
/// from `threat`.
pub fn hiding_spot(center: Vec2, radius: f32, threat: Vec2, distance_from_boundary: f32) -> Vec2 {
    let away = (center - threat).try_normalize().unwrap_or(Vec2::X);
    center + away * (radius + distance_from_boundary)
}

/// Hide behind disc obstacles from a threat.
///
/// Only the geometry is available: [`hiding_spots`](Self::hiding_spots) and
/// [`best_spot`](Self::best_spot) compute candidate positions, and a host can
/// route to them with a path follower.  Deciding *when* the agent is seen
/// and must hide needs a detection trigger that does not exist, so
/// `steering` always fails with [`BehaviorError::Unsupported`] and
/// `validate` reports the behavior as unusable.
pub struct Hide {
    pub threat: AgentId,
    /// Disc obstacles as `(center, radius)`.
    pub obstacles: Vec<(Vec2, f32)>,
    pub distance_from_boundary: f32,
}

impl Hide {
    pub fn new(threat: AgentId, obstacles: Vec<(Vec2, f32)>) -> Self {
        Self { threat, obstacles, distance_from_boundary: 10.0 }
    }

    /// One hiding spot per obstacle, in obstacle order.
    pub fn hiding_spots(&self, threat: Vec2) -> Vec<Vec2> {
        self.obstacles
            .iter()
            .map(|&(c, r)| hiding_spot(c, r, threat, self.distance_from_boundary))
            .collect()
    }

    /// The hiding spot closest to `position`.
    pub fn best_spot(&self, position: Vec2, threat: Vec2) -> Option<Vec2> {
        self.hiding_spots(threat)
            .into_iter()
            .min_by(|a, b| a.distance_squared(position).total_cmp(&b.distance_squared(position)))
    }
}

impl SteeringBehavior for Hide {
    fn steering(
        &mut self,
        _args: &SteeringArgs,
        _ctx:  &SteeringContext<'_>,
        _rng:  &mut AgentRng,
    ) -> BehaviorResult<Steering> {
        Err(BehaviorError::Unsupported {
            behavior: "hide",
            reason:   "no line-of-sight trigger decides when to hide",
        })
    }

    fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = vec![ConfigIssue::new(
            "hide",
            "steering is unsupported; route to Hide::best_spot with a path follower instead",
        )];
        if self.obstacles.is_empty() {
            issues.push(ConfigIssue::new("hide", "no obstacles to hide behind"));
        }
        issues
    }

    fn name(&self) -> &'static str {
        "hide"
    }
}
