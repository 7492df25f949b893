//! Arbitration combinators.
//!
//! | Combinator                  | Picks                                                    |
//! |-----------------------------|----------------------------------------------------------|
//! | [`WeightBlended`]           | weighted sum of every contributing child                 |
//! | [`PriorityWeightBlended`]   | the first blended group that contributes                 |
//! | [`PriorityDitheringBlended`]| the first child that passes its dice roll and contributes |
//!
//! A child *contributes* when it returns a non-zero output; declining
//! (`None`) and explicit zeros are both skipped.

use sk_core::{AgentRng, Steering, SteeringOutput};

use crate::behavior::nested;
use crate::{BehaviorResult, BoxedBehavior, ConfigIssue, SteeringArgs, SteeringBehavior, SteeringContext};

// ── WeightBlended ─────────────────────────────────────────────────────────────

/// Weighted average of the contributing children.
///
/// Every child is polled each tick so its continuation state stays current.
/// Weights are renormalized over the children that actually contributed,
/// so a child going quiet does not shrink the result.
#[derive(Default)]
pub struct WeightBlended {
    children: Vec<(f32, BoxedBehavior)>,
}

impl WeightBlended {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`push`](Self::push).
    pub fn with(mut self, weight: f32, behavior: impl SteeringBehavior + 'static) -> Self {
        self.push(weight, behavior);
        self
    }

    pub fn push(&mut self, weight: f32, behavior: impl SteeringBehavior + 'static) {
        self.children.push((weight, Box::new(behavior)));
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl SteeringBehavior for WeightBlended {
    fn steering(
        &mut self,
        args: &SteeringArgs,
        ctx:  &SteeringContext<'_>,
        rng:  &mut AgentRng,
    ) -> BehaviorResult<Steering> {
        let mut sum = SteeringOutput::ZERO;
        let mut total_weight = 0.0;
        for (weight, child) in &mut self.children {
            let steering = child.steering(args, ctx, rng)?;
            if let Some(out) = steering.filter(|out| !out.is_zero()) {
                sum += out * *weight;
                total_weight += *weight;
            }
        }
        if total_weight <= f32::EPSILON {
            return Ok(None);
        }
        Ok(Some(sum * (1.0 / total_weight)))
    }

    fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.children.is_empty() {
            issues.push(ConfigIssue::new("weight-blended", "no children"));
        }
        for (i, (weight, child)) in self.children.iter().enumerate() {
            let path = format!("weight-blended/children[{i}]");
            if *weight < 0.0 || !weight.is_finite() {
                issues.push(ConfigIssue::new(path.clone(), "weight must be finite and non-negative"));
            }
            issues.extend(nested(&path, child.validate()));
        }
        issues
    }

    fn name(&self) -> &'static str {
        "weight-blended"
    }
}

// ── PriorityWeightBlended ─────────────────────────────────────────────────────

/// Ordered fallback over blended groups.
///
/// Groups are polled in order and the first one that contributes wins;
/// groups after it are not polled this tick.
#[derive(Default)]
pub struct PriorityWeightBlended {
    groups: Vec<WeightBlended>,
}

impl PriorityWeightBlended {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, group: WeightBlended) -> Self {
        self.groups.push(group);
        self
    }

    pub fn push(&mut self, group: WeightBlended) {
        self.groups.push(group);
    }
}

impl SteeringBehavior for PriorityWeightBlended {
    fn steering(
        &mut self,
        args: &SteeringArgs,
        ctx:  &SteeringContext<'_>,
        rng:  &mut AgentRng,
    ) -> BehaviorResult<Steering> {
        for group in &mut self.groups {
            let steering = group.steering(args, ctx, rng)?;
            if SteeringOutput::contributes(&steering) {
                return Ok(steering);
            }
        }
        Ok(None)
    }

    fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.groups.is_empty() {
            issues.push(ConfigIssue::new("priority-weight-blended", "no groups"));
        }
        for (i, group) in self.groups.iter().enumerate() {
            issues.extend(nested(&format!("priority-weight-blended/groups[{i}]"), group.validate()));
        }
        issues
    }

    fn name(&self) -> &'static str {
        "priority-weight-blended"
    }
}

// ── PriorityDitheringBlended ──────────────────────────────────────────────────

/// Ordered, probabilistic arbitration.
///
/// Each child is only polled if a roll against its probability succeeds;
/// the first polled child that contributes wins.  Rolls draw from the
/// agent's RNG, so runs are reproducible for a given seed.
#[derive(Default)]
pub struct PriorityDitheringBlended {
    children: Vec<(f64, BoxedBehavior)>,
}

impl PriorityDitheringBlended {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, probability: f64, behavior: impl SteeringBehavior + 'static) -> Self {
        self.push(probability, behavior);
        self
    }

    pub fn push(&mut self, probability: f64, behavior: impl SteeringBehavior + 'static) {
        self.children.push((probability, Box::new(behavior)));
    }
}

impl SteeringBehavior for PriorityDitheringBlended {
    fn steering(
        &mut self,
        args: &SteeringArgs,
        ctx:  &SteeringContext<'_>,
        rng:  &mut AgentRng,
    ) -> BehaviorResult<Steering> {
        for (probability, child) in &mut self.children {
            if !rng.gen_bool(*probability) {
                continue;
            }
            let steering = child.steering(args, ctx, rng)?;
            if SteeringOutput::contributes(&steering) {
                return Ok(steering);
            }
        }
        Ok(None)
    }

    fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.children.is_empty() {
            issues.push(ConfigIssue::new("priority-dithering-blended", "no children"));
        }
        for (i, (probability, child)) in self.children.iter().enumerate() {
            let path = format!("priority-dithering-blended/children[{i}]");
            if !(0.0..=1.0).contains(probability) {
                issues.push(ConfigIssue::new(path.clone(), "probability must lie in [0, 1]"));
            }
            issues.extend(nested(&path, child.validate()));
        }
        issues
    }

    fn name(&self) -> &'static str {
        "priority-dithering-blended"
    }
}
