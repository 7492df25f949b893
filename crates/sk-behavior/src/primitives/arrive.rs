use sk_core::{AgentRng, Curve, Steering, SteeringOutput, Vec2};

use super::approach_floor;
use crate::{ConfigIssue, Marker, MarkerSteering, SteeringArgs, Target, Targeted};

// ── Arrive (curve) ────────────────────────────────────────────────────────────

/// Approach a target and stop on it, with curve-shaped speed-up and
/// slow-down.
///
/// | Phase        | Condition                               | Speed                                             |
/// |--------------|-----------------------------------------|---------------------------------------------------|
/// | accelerate   | travelled < `acceleration_radius`       | `acceleration_curve(travelled / radius) × max`    |
/// | cruise       | otherwise                               | `max_speed`                                       |
/// | brake        | remaining < `braking_radius`            | `deceleration_curve(remaining / radius) × max`    |
/// | arrived      | remaining ≤ `arrival_distance`          | zero                                              |
///
/// When accelerating and braking overlap (short trips) the lower speed wins.
/// "Travelled" is measured from the point where the agent last left the
/// arrived state.  The speed never drops below a small approach floor and
/// never carries the agent past the target within one tick.
#[derive(Clone, Debug, PartialEq)]
pub struct Arrive {
    pub arrival_distance: f32,
    pub acceleration_radius: f32,
    pub braking_radius: f32,
    pub acceleration_curve: Curve,
    pub deceleration_curve: Curve,
    idle: bool,
    start: Vec2,
}

impl Arrive {
    pub fn new(arrival_distance: f32, acceleration_radius: f32, braking_radius: f32) -> Self {
        Self {
            arrival_distance,
            acceleration_radius,
            braking_radius,
            acceleration_curve: Curve::default(),
            deceleration_curve: Curve::ramp(0.0),
            idle: true,
            start: Vec2::ZERO,
        }
    }

    pub fn with_curves(mut self, acceleration: Curve, deceleration: Curve) -> Self {
        self.acceleration_curve = acceleration;
        self.deceleration_curve = deceleration;
        self
    }

    pub fn targeting(self, target: impl Into<Target>) -> Targeted<Self> {
        Targeted::new(target, self)
    }

    /// `true` while inside the arrival zone.
    pub fn is_idle(&self) -> bool {
        self.idle
    }
}

impl Default for Arrive {
    fn default() -> Self {
        Self::new(5.0, 50.0, 100.0)
    }
}

impl MarkerSteering for Arrive {
    fn steer_to(&mut self, args: &SteeringArgs, marker: &Marker, _rng: &mut AgentRng) -> Steering {
        let to_target = marker.position - args.position;
        let remaining = to_target.length();
        if remaining <= self.arrival_distance || remaining <= f32::EPSILON {
            self.idle = true;
            return Some(SteeringOutput::ZERO);
        }
        if self.idle {
            self.start = args.position;
            self.idle = false;
        }

        let travelled = self.start.distance(args.position);
        let accelerating = if travelled < self.acceleration_radius && self.acceleration_radius > 0.0 {
            self.acceleration_curve.sample(travelled / self.acceleration_radius)
        } else {
            1.0
        };
        let braking = if remaining < self.braking_radius && self.braking_radius > 0.0 {
            self.deceleration_curve.sample(remaining / self.braking_radius)
        } else {
            1.0
        };

        let floor = approach_floor(args.max_speed, args.stop_speed);
        let mut speed = (args.max_speed * accelerating.min(braking)).clamp(floor, args.max_speed);
        if args.delta_secs > 0.0 {
            speed = speed.min(remaining / args.delta_secs);
        }
        Some(SteeringOutput::linear(to_target / remaining * speed))
    }

    fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.arrival_distance < 0.0 {
            issues.push(ConfigIssue::new("arrive", "arrival distance must not be negative"));
        }
        if self.braking_radius < self.arrival_distance {
            issues.push(ConfigIssue::new("arrive", "braking radius is inside the arrival distance"));
        }
        if !self.acceleration_curve.is_non_decreasing() {
            issues.push(ConfigIssue::new("arrive", "acceleration curve decreases"));
        }
        if !self.deceleration_curve.is_non_decreasing() {
            issues.push(ConfigIssue::new("arrive", "deceleration curve decreases"));
        }
        issues
    }

    fn name(&self) -> &'static str {
        "arrive"
    }
}

// ── Arrive (linear acceleration) ──────────────────────────────────────────────

/// Approach a target with constant acceleration and constant deceleration.
///
/// Braking starts once the remaining distance is inside the stopping
/// distance `speed² / (2 × max_deceleration)` and stays on until the agent
/// arrives, so the speed profile is a clean ramp up, plateau, ramp down.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearArrive {
    pub arrival_distance: f32,
    braking: bool,
}

impl LinearArrive {
    pub fn new(arrival_distance: f32) -> Self {
        Self { arrival_distance, braking: false }
    }

    pub fn targeting(self, target: impl Into<Target>) -> Targeted<Self> {
        Targeted::new(target, self)
    }

    /// Distance needed to stop from `speed`.
    pub fn braking_radius(speed: f32, max_deceleration: f32) -> f32 {
        if max_deceleration <= 0.0 {
            return f32::INFINITY;
        }
        speed * speed / (2.0 * max_deceleration)
    }
}

impl Default for LinearArrive {
    fn default() -> Self {
        Self::new(5.0)
    }
}

impl MarkerSteering for LinearArrive {
    fn steer_to(&mut self, args: &SteeringArgs, marker: &Marker, _rng: &mut AgentRng) -> Steering {
        let to_target = marker.position - args.position;
        let remaining = to_target.length();
        if remaining <= self.arrival_distance || remaining <= f32::EPSILON {
            self.braking = false;
            return Some(SteeringOutput::ZERO);
        }

        let speed = args.speed();
        if !self.braking && remaining <= Self::braking_radius(speed, args.max_deceleration) {
            self.braking = true;
        }
        let next = if self.braking {
            speed - args.max_deceleration * args.delta_secs
        } else {
            speed + args.max_acceleration * args.delta_secs
        };

        let floor = approach_floor(args.max_speed, args.stop_speed);
        let mut next = next.clamp(floor, args.max_speed);
        if args.delta_secs > 0.0 {
            next = next.min(remaining / args.delta_secs);
        }
        Some(SteeringOutput::linear(to_target / remaining * next))
    }

    fn validate(&self) -> Vec<ConfigIssue> {
        if self.arrival_distance < 0.0 {
            vec![ConfigIssue::new("linear-arrive", "arrival distance must not be negative")]
        } else {
            Vec::new()
        }
    }

    fn name(&self) -> &'static str {
        "linear-arrive"
    }
}
