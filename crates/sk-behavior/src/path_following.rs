//! Following waypoint paths, optionally planned on the fly.

use std::sync::Arc;

use log::{debug, warn};

use sk_core::{AgentRng, Steering, Vec2};
use sk_path::{NavigationOracle, Path};

use crate::behavior::nested;
use crate::{
    Arrive, BehaviorResult, ConfigIssue, Marker, MarkerSteering, Seek, SteeringArgs, SteeringBehavior,
    SteeringContext, Target,
};

// ── PathFollowing ─────────────────────────────────────────────────────────────

/// Seek each waypoint in turn and arrive at the last one.
///
/// The cursor advances once the agent is within the path's arrival
/// tolerance of the current waypoint.  Looping paths never arrive; they
/// wrap back to the first waypoint.  Declines on an empty path.
pub struct PathFollowing {
    pub path: Path,
    pub seek: Seek,
    pub arrive: Arrive,
}

impl PathFollowing {
    pub fn new(path: Path) -> Self {
        Self { path, seek: Seek::new(0.0), arrive: Arrive::default() }
    }

    pub fn with_arrive(mut self, arrive: Arrive) -> Self {
        self.arrive = arrive;
        self
    }

    /// `true` once the last waypoint of a one-shot path has been reached.
    pub fn is_finished(&self, position: Vec2) -> bool {
        self.path.is_finished(position)
    }
}

impl SteeringBehavior for PathFollowing {
    fn steering(
        &mut self,
        args: &SteeringArgs,
        _ctx: &SteeringContext<'_>,
        rng:  &mut AgentRng,
    ) -> BehaviorResult<Steering> {
        self.path.update(args.position);
        let Some(waypoint) = self.path.current() else {
            return Ok(None);
        };
        let marker = Marker::at(waypoint);
        if self.path.is_final() {
            Ok(self.arrive.steer_to(args, &marker, rng))
        } else {
            Ok(self.seek.steer_to(args, &marker, rng))
        }
    }

    fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues: Vec<_> = nested("path-following", self.arrive.validate()).collect();
        if self.path.is_looping() && self.path.len() < 2 {
            issues.push(ConfigIssue::new("path-following", "a looping path needs at least two waypoints"));
        }
        issues
    }

    fn name(&self) -> &'static str {
        "path-following"
    }
}

// ── PathfindingFollower ───────────────────────────────────────────────────────

/// Plans a path to a (possibly moving) target and follows it.
///
/// A new plan is requested from the navigation oracle on the first poll and
/// whenever the target has moved more than `replan_threshold` from the goal
/// of the current plan.  A failed re-plan is logged and the previous path is
/// kept; the next attempt happens once the target moves again.  Failing with
/// no previous path is an error.
pub struct PathfindingFollower {
    pub navigator: Arc<dyn NavigationOracle>,
    pub target: Target,
    pub replan_threshold: f32,
    pub follower: PathFollowing,
    planned_for: Option<Vec2>,
}

impl PathfindingFollower {
    pub fn new(navigator: Arc<dyn NavigationOracle>, target: impl Into<Target>) -> Self {
        Self {
            navigator,
            target: target.into(),
            replan_threshold: 50.0,
            follower: PathFollowing::new(Path::new(Vec::new(), false)),
            planned_for: None,
        }
    }

    pub fn with_replan_threshold(mut self, threshold: f32) -> Self {
        self.replan_threshold = threshold;
        self
    }

    /// The goal the current path was planned for.
    pub fn planned_for(&self) -> Option<Vec2> {
        self.planned_for
    }

    fn needs_plan(&self, goal: Vec2) -> bool {
        self.planned_for.is_none_or(|p| p.distance(goal) > self.replan_threshold)
    }
}

impl SteeringBehavior for PathfindingFollower {
    fn steering(
        &mut self,
        args: &SteeringArgs,
        ctx:  &SteeringContext<'_>,
        rng:  &mut AgentRng,
    ) -> BehaviorResult<Steering> {
        let Some(goal) = ctx.resolve(&self.target).map(|m| m.position) else {
            return Ok(None);
        };

        if self.needs_plan(goal) {
            match self.navigator.find_path(args.position, goal) {
                Ok(waypoints) => {
                    debug!("{}: planned {} waypoints to {goal}", args.agent, waypoints.len());
                    self.follower.path.set_waypoints(waypoints);
                }
                Err(e) if self.follower.path.is_empty() => return Err(e.into()),
                Err(e) => warn!("{}: path planning to {goal} failed: {e}", args.agent),
            }
            self.planned_for = Some(goal);
        }

        self.follower.steering(args, ctx, rng)
    }

    fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues: Vec<_> = nested("pathfinding-follower", self.follower.validate()).collect();
        if self.replan_threshold < 0.0 {
            issues.push(ConfigIssue::new("pathfinding-follower", "replan threshold must not be negative"));
        }
        issues
    }

    fn name(&self) -> &'static str {
        "pathfinding-follower"
    }
}
