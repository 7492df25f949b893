use sk_core::math::{is_negligible, orientation_of, rotate};
use sk_core::{AgentRng, Countdown, Steering, Vec2};

use crate::{
    BehaviorResult, ConfigIssue, Marker, MarkerSteering, Seek, SteeringArgs, SteeringBehavior,
    SteeringContext,
};

/// Random meandering.
///
/// Keeps a point on a circle projected `circle_distance` ahead of the agent.
/// Every `recalculation_secs` the point is jittered by up to `jitter` on each
/// axis and snapped back onto the circle; the agent seeks the projected
/// point.
#[derive(Clone, Debug, PartialEq)]
pub struct Wander {
    pub circle_distance: f32,
    pub circle_radius: f32,
    pub jitter: f32,
    pub seek: Seek,
    timer: Countdown,
    /// Offset on the circle in the agent's local frame; `None` until first
    /// polled.
    wander_point: Option<Vec2>,
}

impl Wander {
    pub fn new(circle_distance: f32, circle_radius: f32, jitter: f32, recalculation_secs: f32) -> Self {
        Self {
            circle_distance,
            circle_radius,
            jitter,
            seek: Seek::new(0.0),
            timer: Countdown::repeating(recalculation_secs),
            wander_point: None,
        }
    }

    /// The world-space point currently being sought, if initialized.
    pub fn wander_target(&self, args: &SteeringArgs) -> Option<Vec2> {
        self.wander_point.map(|p| self.project(args, p))
    }

    fn project(&self, args: &SteeringArgs, local: Vec2) -> Vec2 {
        let direction = args.travel_direction();
        args.position + direction * self.circle_distance + rotate(local, orientation_of(direction))
    }

    fn jittered(&self, point: Vec2, rng: &mut AgentRng) -> Vec2 {
        let moved = point + rng.unit_square() * self.jitter;
        if is_negligible(moved) {
            rng.unit_vector() * self.circle_radius
        } else {
            moved.normalize() * self.circle_radius
        }
    }
}

impl Default for Wander {
    fn default() -> Self {
        Self::new(60.0, 30.0, 15.0, 0.25)
    }
}

impl SteeringBehavior for Wander {
    fn steering(
        &mut self,
        args: &SteeringArgs,
        _ctx: &SteeringContext<'_>,
        rng:  &mut AgentRng,
    ) -> BehaviorResult<Steering> {
        let point = match self.wander_point {
            None => {
                self.timer.start();
                rng.unit_vector() * self.circle_radius
            }
            Some(p) if self.timer.tick(args.delta_secs) => self.jittered(p, rng),
            Some(p) => p,
        };
        self.wander_point = Some(point);
        let target = Marker::at(self.project(args, point));
        Ok(self.seek.steer_to(args, &target, rng))
    }

    fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.circle_radius <= 0.0 {
            issues.push(ConfigIssue::new("wander", "circle radius must be positive"));
        }
        if self.timer.duration_secs() <= 0.0 {
            issues.push(ConfigIssue::new("wander", "recalculation period must be positive"));
        }
        issues
    }

    fn name(&self) -> &'static str {
        "wander"
    }
}
