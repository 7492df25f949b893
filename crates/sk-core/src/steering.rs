//! The value every steering behavior produces.

use std::ops::{Add, AddAssign, Mul};

use glam::Vec2;

use crate::math::EPSILON;

/// Desired linear velocity and angular velocity (degrees per second).
///
/// Immutable value type; combinators build new instances by addition and
/// weighted sums.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SteeringOutput {
    pub linear: Vec2,
    pub angular: f32,
}

/// Result of polling one behavior for one tick.
///
/// `None` means the behavior declines to act this tick (e.g. a flee with no
/// threat in range).  `Some(SteeringOutput::ZERO)` is an explicit "hold
/// still".  Combinators treat both as no contribution; at the root, both
/// bring the agent to rest.
pub type Steering = Option<SteeringOutput>;

impl SteeringOutput {
    pub const ZERO: SteeringOutput = SteeringOutput { linear: Vec2::ZERO, angular: 0.0 };

    #[inline]
    pub fn new(linear: Vec2, angular: f32) -> Self {
        Self { linear, angular }
    }

    #[inline]
    pub fn linear(linear: Vec2) -> Self {
        Self { linear, angular: 0.0 }
    }

    #[inline]
    pub fn angular(angular: f32) -> Self {
        Self { linear: Vec2::ZERO, angular }
    }

    /// `true` if both components are negligible.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.linear.length_squared() < EPSILON * EPSILON && self.angular.abs() < EPSILON
    }

    /// `true` if `steering` carries a non-zero output.
    #[inline]
    pub fn contributes(steering: &Steering) -> bool {
        matches!(steering, Some(out) if !out.is_zero())
    }

    /// Copy with the linear part clamped to `max`.
    #[inline]
    pub fn clamp_linear(self, max: f32) -> Self {
        Self { linear: self.linear.clamp_length_max(max.max(0.0)), angular: self.angular }
    }
}

impl Add for SteeringOutput {
    type Output = SteeringOutput;
    #[inline]
    fn add(self, rhs: SteeringOutput) -> SteeringOutput {
        SteeringOutput {
            linear:  self.linear + rhs.linear,
            angular: self.angular + rhs.angular,
        }
    }
}

impl AddAssign for SteeringOutput {
    #[inline]
    fn add_assign(&mut self, rhs: SteeringOutput) {
        self.linear += rhs.linear;
        self.angular += rhs.angular;
    }
}

impl Mul<f32> for SteeringOutput {
    type Output = SteeringOutput;
    #[inline]
    fn mul(self, rhs: f32) -> SteeringOutput {
        SteeringOutput {
            linear:  self.linear * rhs,
            angular: self.angular * rhs,
        }
    }
}
