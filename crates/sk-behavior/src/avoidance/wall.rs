use sk_core::math::{cross, rotate};
use sk_core::{AgentRng, Vec2};
use sk_sense::{LayerMask, RayHit};

use super::{PassiveAvoider, passive_behavior};
use crate::{ConfigIssue, SteeringArgs, SteeringContext};

/// Whisker-based obstacle avoidance.
///
/// Casts a fan of `whisker_count` rays spread over `whisker_spread` degrees
/// around the direction of travel.  The centre whisker is `whisker_length`
/// long, the outer ones `side_whisker_scale` times that.  The hit that
/// penetrates deepest into its whisker sets the push:
///
/// ```text
/// overshoot = (length − hit distance) / length        ∈ [0, 1]
/// push      = normal × overshoot × max_speed
/// ```
///
/// A wall met nearly square on pushes almost straight back, which would only
/// stop the agent.  When `|normal · forward| ≥ longitudinal_threshold` a
/// lateral push of the same strength is added, toward the side away from
/// the hit point, or a random side when the hit is dead ahead.
#[derive(Clone, Debug, PartialEq)]
pub struct WallAvoider {
    pub layers: LayerMask,
    pub whisker_count: usize,
    /// Degrees between the outermost whiskers.
    pub whisker_spread: f32,
    pub whisker_length: f32,
    pub side_whisker_scale: f32,
    pub longitudinal_threshold: f32,
}

impl WallAvoider {
    pub fn new(layers: LayerMask, whisker_length: f32) -> Self {
        Self {
            layers,
            whisker_count: 3,
            whisker_spread: 60.0,
            whisker_length,
            side_whisker_scale: 0.6,
            longitudinal_threshold: 0.9,
        }
    }

    pub fn with_whiskers(mut self, count: usize, spread: f32) -> Self {
        self.whisker_count = count;
        self.whisker_spread = spread;
        self
    }

    /// `(direction, length)` of each whisker for an agent travelling along
    /// `forward`.
    pub fn whiskers(&self, forward: Vec2) -> Vec<(Vec2, f32)> {
        match self.whisker_count {
            0 => Vec::new(),
            1 => vec![(forward, self.whisker_length)],
            n => {
                let step = self.whisker_spread / (n - 1) as f32;
                (0..n)
                    .map(|i| {
                        let angle = -self.whisker_spread / 2.0 + step * i as f32;
                        let central = angle.abs() <= step / 2.0;
                        let length = if central { self.whisker_length } else { self.whisker_length * self.side_whisker_scale };
                        (rotate(forward, angle), length)
                    })
                    .collect()
            }
        }
    }
}

impl PassiveAvoider for WallAvoider {
    fn avoidance(&mut self, args: &SteeringArgs, ctx: &SteeringContext<'_>, rng: &mut AgentRng) -> Option<Vec2> {
        let forward = args.travel_direction();
        let (hit, overshoot): (RayHit, f32) = self
            .whiskers(forward)
            .into_iter()
            .filter(|&(_, length)| length > 0.0)
            .filter_map(|(direction, length)| {
                ctx.rays
                    .cast_ray(args.position, direction, length, self.layers)
                    .map(|hit| (hit, ((length - hit.distance) / length).clamp(0.0, 1.0)))
            })
            .max_by(|a, b| a.1.total_cmp(&b.1))?;

        let strength = overshoot * args.max_speed;
        let mut push = hit.normal * strength;
        if hit.normal.dot(forward).abs() >= self.longitudinal_threshold {
            let side = cross(forward, hit.point - args.position);
            let away = if side.abs() <= f32::EPSILON { rng.sign() } else { -side.signum() };
            push += forward.perp() * away * strength;
        }
        Some(push)
    }

    fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.whisker_count == 0 {
            issues.push(ConfigIssue::new("wall-avoider", "no whiskers"));
        }
        if self.whisker_length <= 0.0 {
            issues.push(ConfigIssue::new("wall-avoider", "whisker length must be positive"));
        }
        if self.layers == LayerMask::NONE {
            issues.push(ConfigIssue::new("wall-avoider", "layer mask selects nothing"));
        }
        issues
    }

    fn name(&self) -> &'static str {
        "wall-avoider"
    }
}

passive_behavior!(WallAvoider);
