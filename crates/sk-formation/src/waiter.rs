//! Usher throttling while members catch up.

use log::debug;

use sk_core::{AgentId, AgentRng, Countdown, GroupId, Steering, SteeringOutput};

use sk_behavior::{
    BehaviorResult, BoxedBehavior, ConfigIssue, SteeringArgs, SteeringBehavior, SteeringContext,
};

/// How the usher is held back.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WaitMode {
    /// Halt once the worst lag exceeds `stop_distance`; resume when it falls
    /// under `resume_distance` or the advantage timer runs out.
    Stop,
    /// Scale the usher's speed linearly from 1 at `resume_distance` down to
    /// `min_factor` at `stop_distance`.
    Slow { min_factor: f32 },
}

/// Wraps the usher's own steering and throttles it while the members of
/// `group` lag behind their slots.
///
/// Lag is the largest distance between a live member and its slot marker,
/// taken from the group roster.  Obstructed slots are ignored.  After an
/// advantage timeout the usher moves on regardless and will not stop again
/// until the cooldown has passed.
pub struct UsherWaiter {
    pub inner: BoxedBehavior,
    pub group: GroupId,
    pub mode: WaitMode,
    pub stop_distance: f32,
    pub resume_distance: f32,
    advantage: Countdown,
    cooldown: Countdown,
    waiting: bool,
}

impl UsherWaiter {
    pub fn new(inner: BoxedBehavior, group: GroupId, mode: WaitMode) -> Self {
        Self {
            inner,
            group,
            mode,
            stop_distance: 60.0,
            resume_distance: 20.0,
            advantage: Countdown::once(3.0),
            cooldown: Countdown::once(2.0),
            waiting: false,
        }
    }

    pub fn with_distances(mut self, stop_distance: f32, resume_distance: f32) -> Self {
        self.stop_distance = stop_distance;
        self.resume_distance = resume_distance;
        self
    }

    /// Longest wait before moving on, and the grace period after it.
    pub fn with_timers(mut self, advantage_secs: f32, cooldown_secs: f32) -> Self {
        self.advantage = Countdown::once(advantage_secs);
        self.cooldown = Countdown::once(cooldown_secs);
        self
    }

    pub fn is_waiting(&self) -> bool {
        self.waiting
    }

    /// Worst distance between a live, unobstructed member and its slot.
    pub fn worst_lag(&self, ctx: &SteeringContext<'_>) -> f32 {
        ctx.markers
            .roster(self.group)
            .iter()
            .filter(|slot| !slot.obstructed)
            .filter_map(|slot| {
                let member = ctx.agent(slot.member?)?;
                let marker = ctx.markers.get(slot.marker)?;
                Some(member.position.distance(marker.position))
            })
            .fold(0.0, f32::max)
    }

    fn update_stop(&mut self, lag: f32, delta_secs: f32, who: AgentId) {
        self.cooldown.tick(delta_secs);
        if self.waiting {
            if self.advantage.tick(delta_secs) {
                self.waiting = false;
                self.cooldown.start();
                debug!("{who}: moving on after waiting (lag {lag:.1})");
            } else if lag < self.resume_distance {
                self.waiting = false;
                self.advantage.stop();
                debug!("{who}: members caught up (lag {lag:.1})");
            }
        } else if lag > self.stop_distance && !self.cooldown.is_running() {
            self.waiting = true;
            self.advantage.start();
            debug!("{who}: waiting for members (lag {lag:.1})");
        }
    }

    fn slow_factor(&self, lag: f32, min_factor: f32) -> f32 {
        let span = self.stop_distance - self.resume_distance;
        if lag <= self.resume_distance || span <= 0.0 {
            return 1.0;
        }
        let t = ((lag - self.resume_distance) / span).min(1.0);
        1.0 + (min_factor - 1.0) * t
    }
}

impl SteeringBehavior for UsherWaiter {
    fn steering(
        &mut self,
        args: &SteeringArgs,
        ctx:  &SteeringContext<'_>,
        rng:  &mut AgentRng,
    ) -> BehaviorResult<Steering> {
        let steering = self.inner.steering(args, ctx, rng)?;
        let lag = self.worst_lag(ctx);
        match self.mode {
            WaitMode::Stop => {
                self.update_stop(lag, args.delta_secs, args.agent);
                if self.waiting {
                    return Ok(Some(SteeringOutput::ZERO));
                }
                Ok(steering)
            }
            WaitMode::Slow { min_factor } => {
                let factor = self.slow_factor(lag, min_factor);
                Ok(steering.map(|out| SteeringOutput::new(out.linear * factor, out.angular)))
            }
        }
    }

    fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues: Vec<ConfigIssue> =
            self.inner.validate().into_iter().map(|i| i.within("usher-waiter")).collect();
        if self.resume_distance >= self.stop_distance {
            issues.push(ConfigIssue::new("usher-waiter", "resume distance must be below the stop distance"));
        }
        if let WaitMode::Slow { min_factor } = self.mode {
            if !(0.0..=1.0).contains(&min_factor) {
                issues.push(ConfigIssue::new("usher-waiter", "slow factor must be in [0, 1]"));
            }
        }
        if self.advantage.duration_secs() <= 0.0 {
            issues.push(ConfigIssue::new("usher-waiter", "advantage timeout must be positive"));
        }
        issues
    }

    fn name(&self) -> &'static str {
        "usher-waiter"
    }
}
