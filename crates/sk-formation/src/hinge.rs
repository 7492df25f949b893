//! Realistic usher turning around a hinge point.

use log::debug;

use sk_core::math::{cross, orientation_of, shortest_angle};
use sk_core::{AgentRng, Steering, SteeringOutput, Vec2};

use sk_behavior::{
    Arrive, BehaviorResult, ConfigIssue, MarkerSteering, SteeringArgs, SteeringBehavior,
    SteeringContext, Target,
};

use crate::{PivotFrame, Transform2};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HingeState {
    Straight,
    TurningLeft,
    TurningRight,
}

/// Usher steering that turns like a marching block: instead of spinning in
/// place it wheels around a hinge point `hinge_offset` to the side it is
/// turning toward.
///
/// | State          | Motion                                                        |
/// |----------------|---------------------------------------------------------------|
/// | `Straight`     | forward at the arrive speed, small heading corrections only  |
/// | `TurningLeft`  | wheel around a hinge on the left                              |
/// | `TurningRight` | wheel around a hinge on the right                             |
///
/// The turn engages when the desired heading is more than
/// `straight_tolerance` degrees off and releases once it is back inside.
/// The usher halts when the arrive speed drops below its stop speed.
#[derive(Clone, Debug, PartialEq)]
pub struct UsherHinge {
    pub target: Target,
    pub arrive: Arrive,
    /// Degrees.
    pub straight_tolerance: f32,
    pub hinge_offset: f32,
    state: HingeState,
    frame: Option<PivotFrame>,
}

impl UsherHinge {
    pub fn new(target: impl Into<Target>) -> Self {
        Self {
            target: target.into(),
            arrive: Arrive::default(),
            straight_tolerance: 10.0,
            hinge_offset: 50.0,
            state: HingeState::Straight,
            frame: None,
        }
    }

    pub fn with_arrive(mut self, arrive: Arrive) -> Self {
        self.arrive = arrive;
        self
    }

    pub fn with_hinge(mut self, straight_tolerance: f32, hinge_offset: f32) -> Self {
        self.straight_tolerance = straight_tolerance;
        self.hinge_offset = hinge_offset;
        self
    }

    pub fn state(&self) -> HingeState {
        self.state
    }

    /// World position of the engaged hinge.
    pub fn hinge_position(&self) -> Option<Vec2> {
        self.frame.map(|f| f.parent.position)
    }

    fn engage(&mut self, args: &SteeringArgs, desired: Vec2) {
        let forward = args.forward();
        let side = if cross(forward, desired) >= 0.0 { 1.0 } else { -1.0 };
        let hinge = args.position + forward.perp() * side * self.hinge_offset;
        let usher = Transform2::new(args.position, args.orientation);
        self.frame = Some(PivotFrame::attach(Transform2::new(hinge, args.orientation), usher));
        self.state = if side > 0.0 { HingeState::TurningLeft } else { HingeState::TurningRight };
        debug!("{}: hinge engaged {:?} at ({:.1}, {:.1})", args.agent, self.state, hinge.x, hinge.y);
    }

    fn release(&mut self, args: &SteeringArgs) {
        if self.frame.take().is_some() {
            debug!("{}: hinge released", args.agent);
        }
        self.state = HingeState::Straight;
    }

    fn straight(&self, args: &SteeringArgs, speed: f32, off_by: f32) -> SteeringOutput {
        let angular = (off_by / args.delta_secs).clamp(-args.max_rotation, args.max_rotation);
        SteeringOutput::new(args.forward() * speed, angular)
    }

    /// One sweep step around the hinge, measured from the usher's actual
    /// pose.  Polling without applying the result leaves the hinge as it was.
    fn wheel(&mut self, args: &SteeringArgs, speed: f32, desired_heading: f32) -> SteeringOutput {
        let Some(frame) = self.frame.as_mut() else {
            return SteeringOutput::ZERO;
        };
        frame.reattach(Transform2::new(args.position, args.orientation));

        // The usher sweeps an arc of radius `hinge_offset` at no more than
        // its arrive speed.
        let rate = args.max_rotation.min((speed / self.hinge_offset).to_degrees());
        let limit = rate * args.delta_secs;
        let step = shortest_angle(args.orientation, desired_heading).clamp(-limit, limit);

        let mut swept = *frame;
        swept.rotate_parent(step);
        let next = swept.world();
        SteeringOutput::new(
            (next.position - args.position) / args.delta_secs,
            shortest_angle(args.orientation, next.orientation) / args.delta_secs,
        )
    }
}

impl SteeringBehavior for UsherHinge {
    fn steering(
        &mut self,
        args: &SteeringArgs,
        ctx:  &SteeringContext<'_>,
        rng:  &mut AgentRng,
    ) -> BehaviorResult<Steering> {
        let Some(marker) = ctx.resolve(&self.target) else {
            self.release(args);
            return Ok(None);
        };
        if args.delta_secs <= 0.0 {
            return Ok(Some(SteeringOutput::ZERO));
        }
        let desired = self.arrive.steer_to(args, &marker, rng).map_or(Vec2::ZERO, |o| o.linear);
        let speed = desired.length();
        if speed < args.stop_speed {
            self.release(args);
            return Ok(Some(SteeringOutput::ZERO));
        }

        let desired_heading = orientation_of(desired);
        let off_by = shortest_angle(args.orientation, desired_heading);
        let aligned = off_by.abs() <= self.straight_tolerance;

        match self.state {
            HingeState::Straight if aligned => Ok(Some(self.straight(args, speed, off_by))),
            HingeState::Straight => {
                self.engage(args, desired);
                Ok(Some(self.wheel(args, speed, desired_heading)))
            }
            HingeState::TurningLeft | HingeState::TurningRight if aligned => {
                self.release(args);
                Ok(Some(self.straight(args, speed, off_by)))
            }
            HingeState::TurningLeft | HingeState::TurningRight => {
                if (self.state == HingeState::TurningLeft) != (off_by > 0.0) {
                    self.release(args);
                    self.engage(args, desired);
                }
                Ok(Some(self.wheel(args, speed, desired_heading)))
            }
        }
    }

    fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues: Vec<ConfigIssue> =
            self.arrive.validate().into_iter().map(|i| i.within("usher-hinge")).collect();
        if !(self.hinge_offset > 0.0) {
            issues.push(ConfigIssue::new("usher-hinge", "hinge offset must be positive"));
        }
        if !(0.0..180.0).contains(&self.straight_tolerance) {
            issues.push(ConfigIssue::new("usher-hinge", "straight tolerance must be in [0, 180) degrees"));
        }
        issues
    }

    fn name(&self) -> &'static str {
        "usher-hinge"
    }
}
