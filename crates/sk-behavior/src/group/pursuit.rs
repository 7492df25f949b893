use sk_core::{AgentId, AgentRng, KinematicState, Steering, Vec2};

use super::look_ahead;
use crate::behavior::nested;
use crate::{
    BehaviorResult, ConfigIssue, Flee, Marker, MarkerSteering, Seek, SteeringArgs, SteeringBehavior,
    SteeringContext,
};

/// Where `other` will be by the time an agent at `position` moving at
/// `speed` could reach it.
fn predict(position: Vec2, speed: f32, other: &KinematicState, max_secs: f32) -> Vec2 {
    let distance = position.distance(other.position);
    let t = look_ahead(distance, speed + other.velocity.length(), max_secs);
    other.position + other.velocity * t
}

// ── Pursue ────────────────────────────────────────────────────────────────────

/// Intercept a moving quarry by seeking its predicted position.
///
/// When the quarry is already heading at the pursuer (within
/// `facing_cone` degrees) the prediction is skipped and the quarry's current
/// position is sought directly.
pub struct Pursue {
    pub quarry: AgentId,
    /// Upper bound on the prediction horizon, in seconds.
    pub max_prediction: f32,
    /// Full cone angle in degrees.
    pub facing_cone: f32,
    pub seek: Seek,
}

impl Pursue {
    pub fn new(quarry: AgentId) -> Self {
        Self { quarry, max_prediction: 2.0, facing_cone: 20.0, seek: Seek::default() }
    }

    pub fn with_seek(mut self, seek: Seek) -> Self {
        self.seek = seek;
        self
    }

    fn heads_toward(&self, quarry: &KinematicState, pursuer: Vec2) -> bool {
        let to_pursuer = pursuer - quarry.position;
        let direction = if quarry.velocity.length() > quarry.stop_speed {
            quarry.velocity
        } else {
            quarry.forward()
        };
        match (to_pursuer.try_normalize(), direction.try_normalize()) {
            (Some(a), Some(b)) => a.dot(b) >= (self.facing_cone * 0.5).to_radians().cos(),
            _ => false,
        }
    }
}

impl SteeringBehavior for Pursue {
    fn steering(
        &mut self,
        args: &SteeringArgs,
        ctx:  &SteeringContext<'_>,
        rng:  &mut AgentRng,
    ) -> BehaviorResult<Steering> {
        let Some(quarry) = ctx.agent(self.quarry) else {
            return Ok(None);
        };
        let aim = if self.heads_toward(quarry, args.position) {
            quarry.position
        } else {
            predict(args.position, args.speed(), quarry, self.max_prediction)
        };
        Ok(self.seek.steer_to(args, &Marker::at(aim), rng))
    }

    fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues: Vec<_> = nested("pursue", self.seek.validate()).collect();
        if self.quarry == AgentId::INVALID {
            issues.push(ConfigIssue::new("pursue", "quarry is unset"));
        }
        issues
    }

    fn name(&self) -> &'static str {
        "pursue"
    }
}

// ── Evade ─────────────────────────────────────────────────────────────────────

/// Flee from where a moving threat is about to be.
pub struct Evade {
    pub threat: AgentId,
    pub max_prediction: f32,
    pub flee: Flee,
}

impl Evade {
    pub fn new(threat: AgentId, panic_distance: f32) -> Self {
        Self { threat, max_prediction: 2.0, flee: Flee::new(panic_distance) }
    }
}

impl SteeringBehavior for Evade {
    fn steering(
        &mut self,
        args: &SteeringArgs,
        ctx:  &SteeringContext<'_>,
        rng:  &mut AgentRng,
    ) -> BehaviorResult<Steering> {
        let Some(threat) = ctx.agent(self.threat) else {
            return Ok(None);
        };
        let predicted = predict(args.position, args.speed(), threat, self.max_prediction);
        Ok(self.flee.steer_to(args, &Marker::at(predicted), rng))
    }

    fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues: Vec<_> = nested("evade", self.flee.validate()).collect();
        if self.threat == AgentId::INVALID {
            issues.push(ConfigIssue::new("evade", "threat is unset"));
        }
        issues
    }

    fn name(&self) -> &'static str {
        "evade"
    }
}
