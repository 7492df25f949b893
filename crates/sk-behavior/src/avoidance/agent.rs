use sk_core::math::is_negligible;
use sk_core::{AgentRng, KinematicState, Vec2};

use super::{PassiveAvoider, passive_behavior};
use crate::{AgentSet, ConfigIssue, SteeringArgs, SteeringContext};

/// Potential-collision avoidance against other agents.
///
/// For every threat inside `sensing_radius` the time of closest approach
/// `t = −(p·v) / |v|²` and the separation at that time are computed from
/// the relative position `p` and relative velocity `v`.  A threat is a
/// candidate when it will pass closer than `collision_distance` in the
/// future, or already is that close.  The most urgent candidate wins.
///
/// The agent steers away from the threat's current position when already
/// colliding or meeting it dead on, and from its position at closest
/// approach otherwise.  When the relative velocity is nearly collinear with
/// the relative position (`|cos| ≥ too_aligned_factor`, a head-on or
/// tail-chase) pushing straight apart would only brake both agents, so the
/// vector is replaced by a sidestep perpendicular to the line of approach,
/// away from the side the threat is on.  A perfectly symmetric encounter
/// picks the side at random, and the roll repeats every tick until the
/// agents drift apart.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentAvoider {
    pub threats: AgentSet,
    pub sensing_radius: f32,
    pub collision_distance: f32,
    pub too_aligned_factor: f32,
}

struct Encounter<'a> {
    threat: &'a KinematicState,
    time: f32,
    separation: f32,
    distance: f32,
}

impl AgentAvoider {
    pub fn new(threats: AgentSet, sensing_radius: f32) -> Self {
        Self { threats, sensing_radius, collision_distance: 20.0, too_aligned_factor: 0.95 }
    }

    pub fn with_collision_distance(mut self, collision_distance: f32) -> Self {
        self.collision_distance = collision_distance;
        self
    }

    pub fn with_too_aligned_factor(mut self, factor: f32) -> Self {
        self.too_aligned_factor = factor;
        self
    }

    fn encounter<'a>(&self, args: &SteeringArgs, threat: &'a KinematicState) -> Option<Encounter<'a>> {
        let rel_pos = threat.position - args.position;
        let rel_vel = threat.velocity - args.velocity;
        let distance = rel_pos.length();
        let rel_speed_sq = rel_vel.length_squared();

        let time = if rel_speed_sq > f32::EPSILON { -rel_pos.dot(rel_vel) / rel_speed_sq } else { 0.0 };
        let separation = (rel_pos + rel_vel * time.max(0.0)).length();

        let colliding = distance < self.collision_distance;
        let closing = time > 0.0 && separation < self.collision_distance;
        (colliding || closing).then_some(Encounter {
            threat,
            time: if colliding { 0.0 } else { time },
            separation,
            distance,
        })
    }

    fn too_aligned(&self, rel_pos: Vec2, rel_vel: Vec2) -> bool {
        match (rel_pos.try_normalize(), rel_vel.try_normalize()) {
            (Some(p), Some(v)) => p.dot(v).abs() >= self.too_aligned_factor,
            _ => false,
        }
    }

    fn sidestep(&self, args: &SteeringArgs, threat: &KinematicState, rng: &mut AgentRng) -> Vec2 {
        let rel_vel = threat.velocity - args.velocity;
        let approach = if is_negligible(rel_vel) { threat.velocity } else { rel_vel };
        let perp = approach.try_normalize().unwrap_or(args.forward()).perp();
        let lateral = (threat.position - args.position).dot(perp);
        let side = if lateral.abs() <= f32::EPSILON { rng.sign() } else { -lateral.signum() };
        perp * side
    }
}

impl PassiveAvoider for AgentAvoider {
    fn avoidance(&mut self, args: &SteeringArgs, ctx: &SteeringContext<'_>, rng: &mut AgentRng) -> Option<Vec2> {
        let urgent = ctx
            .agents_near(&self.threats, args.agent, args.position, self.sensing_radius)
            .into_iter()
            .filter_map(|(_, threat)| self.encounter(args, threat))
            .min_by(|a, b| a.time.total_cmp(&b.time))?;

        let rel_pos = urgent.threat.position - args.position;
        let rel_vel = urgent.threat.velocity - args.velocity;
        let head_on = urgent.separation <= f32::EPSILON;
        let relative = if urgent.distance < self.collision_distance || head_on {
            rel_pos
        } else {
            rel_pos + rel_vel * urgent.time
        };

        let away = if self.too_aligned(rel_pos, rel_vel) {
            self.sidestep(args, urgent.threat, rng)
        } else {
            (-relative).try_normalize().unwrap_or_else(|| rng.unit_vector())
        };
        Some(away * args.max_speed)
    }

    fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.collision_distance <= 0.0 {
            issues.push(ConfigIssue::new("agent-avoider", "collision distance must be positive"));
        }
        if self.sensing_radius < self.collision_distance {
            issues.push(ConfigIssue::new("agent-avoider", "sensing radius is smaller than the collision distance"));
        }
        if !(0.0..=1.0).contains(&self.too_aligned_factor) {
            issues.push(ConfigIssue::new("agent-avoider", "too-aligned factor must lie in [0, 1]"));
        }
        issues
    }

    fn name(&self) -> &'static str {
        "agent-avoider"
    }
}

passive_behavior!(AgentAvoider);
