use sk_core::{AgentRng, Steering, SteeringOutput, Vec2};

use crate::{AgentSet, BehaviorResult, ConfigIssue, SteeringArgs, SteeringBehavior, SteeringContext};

/// How repulsion strength falls off with distance.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Falloff {
    /// `max_acceleration × (threshold − d) / threshold`.
    Linear,
    /// `decay / d²`, capped at `max_acceleration`.
    InverseSquare { decay: f32 },
}

/// Push away from every threat closer than `threshold`.
///
/// The summed repulsion is treated as an acceleration and added to the
/// current velocity over one tick.  Declines when no threat is in range.
#[derive(Clone, Debug, PartialEq)]
pub struct Separation {
    pub threats: AgentSet,
    pub threshold: f32,
    pub falloff: Falloff,
}

impl Separation {
    pub fn new(threats: AgentSet, threshold: f32, falloff: Falloff) -> Self {
        Self { threats, threshold, falloff }
    }

    fn strength(&self, distance: f32, max_acceleration: f32) -> f32 {
        match self.falloff {
            Falloff::Linear => max_acceleration * (self.threshold - distance).max(0.0) / self.threshold,
            Falloff::InverseSquare { decay } => {
                if distance <= f32::EPSILON {
                    max_acceleration
                } else {
                    (decay / (distance * distance)).min(max_acceleration)
                }
            }
        }
    }
}

impl SteeringBehavior for Separation {
    fn steering(
        &mut self,
        args: &SteeringArgs,
        ctx:  &SteeringContext<'_>,
        rng:  &mut AgentRng,
    ) -> BehaviorResult<Steering> {
        let threats = ctx.agents_near(&self.threats, args.agent, args.position, self.threshold);
        if threats.is_empty() {
            return Ok(None);
        }

        let mut push = Vec2::ZERO;
        for (_, threat) in threats {
            let away = args.position - threat.position;
            let distance = away.length();
            // Coincident agents have no "away"; pick one at random.
            let direction = if distance <= f32::EPSILON { rng.unit_vector() } else { away / distance };
            push += direction * self.strength(distance, args.max_acceleration);
        }

        let velocity = args.velocity + push * args.delta_secs;
        Ok(Some(SteeringOutput::linear(velocity).clamp_linear(args.max_speed)))
    }

    fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.threshold <= 0.0 || !self.threshold.is_finite() {
            issues.push(ConfigIssue::new("separation", "threshold must be positive and finite"));
        }
        if let Falloff::InverseSquare { decay } = self.falloff {
            if decay <= 0.0 {
                issues.push(ConfigIssue::new("separation", "decay coefficient must be positive"));
            }
        }
        if self.threats == AgentSet::List(Vec::new()) {
            issues.push(ConfigIssue::new("separation", "threat list is empty"));
        }
        issues
    }

    fn name(&self) -> &'static str {
        "separation"
    }
}
