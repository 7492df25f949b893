//! The `SteeringBehavior` trait — the main extension point for user code.

use std::fmt;

use sk_core::{AgentRng, Steering};

use crate::{BehaviorResult, Marker, SteeringArgs, SteeringContext, Target};

// ── ConfigIssue ───────────────────────────────────────────────────────────────

/// A configuration problem found by [`SteeringBehavior::validate`].
///
/// `path` locates the offending behavior inside a tree, e.g.
/// `priority-weight-blended/groups[1]/children[0]/seek`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigIssue {
    pub path: String,
    pub message: String,
}

impl ConfigIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { path: path.into(), message: message.into() }
    }

    /// Prefix the path with a parent segment.
    pub fn within(mut self, parent: &str) -> Self {
        self.path = format!("{parent}/{}", self.path);
        self
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Collect `child`'s issues under `parent`.
pub(crate) fn nested(parent: &str, child: Vec<ConfigIssue>) -> impl Iterator<Item = ConfigIssue> + '_ {
    child.into_iter().map(move |i| i.within(parent))
}

// ── SteeringBehavior ──────────────────────────────────────────────────────────

/// Pluggable steering behavior.
///
/// Each tick the host refreshes the agent's [`SteeringArgs`], builds a
/// [`SteeringContext`] shared by every agent, and polls the agent's root
/// behavior.  Combinators poll their children in declared order.
///
/// # Return value
///
/// - `Ok(None)`: the behavior declines to act this tick (no threat in range,
///   target gone, …).  Combinators skip it.
/// - `Ok(Some(out))`: desired linear velocity and angular velocity.  A zero
///   output is an explicit "hold still"; combinators still skip it.
/// - `Err(_)`: a hard failure the host surfaces to the caller.
///
/// # Thread safety
///
/// Behaviors carry small per-instance continuation state (idle flags,
/// timers, cached predictions), so `steering` takes `&mut self`.  The host
/// may evaluate different agents' behaviors on different rayon workers, so
/// implementations must be `Send`.
pub trait SteeringBehavior: Send {
    fn steering(
        &mut self,
        args: &SteeringArgs,
        ctx:  &SteeringContext<'_>,
        rng:  &mut AgentRng,
    ) -> BehaviorResult<Steering>;

    /// Startup completeness check.  Default: no issues.
    fn validate(&self) -> Vec<ConfigIssue> {
        Vec::new()
    }

    /// Short kebab-case name used in issue paths and logs.
    fn name(&self) -> &'static str;
}

/// Owned, type-erased behavior.
pub type BoxedBehavior = Box<dyn SteeringBehavior>;

impl<B: SteeringBehavior + ?Sized> SteeringBehavior for Box<B> {
    fn steering(
        &mut self,
        args: &SteeringArgs,
        ctx:  &SteeringContext<'_>,
        rng:  &mut AgentRng,
    ) -> BehaviorResult<Steering> {
        (**self).steering(args, ctx, rng)
    }

    fn validate(&self) -> Vec<ConfigIssue> {
        (**self).validate()
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

// ── MarkerSteering ────────────────────────────────────────────────────────────

/// A primitive that can be pointed at a freshly synthesized [`Marker`].
///
/// Composite behaviors compute a marker each tick (a predicted position, a
/// centroid, a look-at pose) and delegate to one of these.
pub trait MarkerSteering: Send {
    fn steer_to(&mut self, args: &SteeringArgs, marker: &Marker, rng: &mut AgentRng) -> Steering;

    fn validate(&self) -> Vec<ConfigIssue> {
        Vec::new()
    }

    fn name(&self) -> &'static str;
}

/// A [`MarkerSteering`] primitive bound to a fixed [`Target`].
///
/// Built with the primitives' `targeting` helpers:
///
/// ```
/// use sk_core::Vec2;
/// use sk_behavior::{Seek, SteeringBehavior};
///
/// let seek = Seek::new(5.0).targeting(Vec2::new(1000.0, 0.0));
/// assert_eq!(seek.name(), "seek");
/// ```
pub struct Targeted<P> {
    pub target: Target,
    pub inner: P,
}

impl<P: MarkerSteering> Targeted<P> {
    pub fn new(target: impl Into<Target>, inner: P) -> Self {
        Self { target: target.into(), inner }
    }
}

impl<P: MarkerSteering> SteeringBehavior for Targeted<P> {
    fn steering(
        &mut self,
        args: &SteeringArgs,
        ctx:  &SteeringContext<'_>,
        rng:  &mut AgentRng,
    ) -> BehaviorResult<Steering> {
        Ok(ctx.resolve(&self.target).and_then(|marker| self.inner.steer_to(args, &marker, rng)))
    }

    fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = self.inner.validate();
        if let Target::Agent(id) = self.target {
            if id == sk_core::AgentId::INVALID {
                issues.push(ConfigIssue::new(self.inner.name(), "target agent is unset"));
            }
        }
        if let Target::Marker(id) = self.target {
            if id == sk_core::MarkerId::INVALID {
                issues.push(ConfigIssue::new(self.inner.name(), "target marker is unset"));
            }
        }
        issues
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}
