//! 2D rigid transforms and pivot frames.
//!
//! A [`PivotFrame`] stands in for temporarily parenting one object to
//! another: the child's pose is stored relative to the parent, the parent is
//! moved or rotated, and the child's world pose is read back.

use sk_core::math::{heading, rotate, shortest_angle, wrap_degrees};
use sk_core::{KinematicState, Vec2};

/// Position plus orientation (degrees, counter-clockwise from +X).
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform2 {
    pub position: Vec2,
    pub orientation: f32,
}

impl Transform2 {
    pub const IDENTITY: Transform2 = Transform2 { position: Vec2::ZERO, orientation: 0.0 };

    pub fn new(position: Vec2, orientation: f32) -> Self {
        Self { position, orientation: wrap_degrees(orientation) }
    }

    pub fn of(state: &KinematicState) -> Self {
        Self::new(state.position, state.orientation)
    }

    #[inline]
    pub fn forward(&self) -> Vec2 {
        heading(self.orientation)
    }

    /// Map a point from this frame into the parent (world) frame.
    #[inline]
    pub fn transform_point(&self, local: Vec2) -> Vec2 {
        self.position + rotate(local, self.orientation)
    }

    #[inline]
    pub fn transform_vector(&self, local: Vec2) -> Vec2 {
        rotate(local, self.orientation)
    }

    pub fn inverse(&self) -> Self {
        Self::new(-rotate(self.position, -self.orientation), -self.orientation)
    }

    /// World pose of `child`, which is given relative to `self`.
    pub fn compose(&self, child: &Transform2) -> Self {
        Self::new(self.transform_point(child.position), self.orientation + child.orientation)
    }

    /// This pose expressed in `parent`'s frame.
    pub fn relative_to(&self, parent: &Transform2) -> Self {
        let local = rotate(self.position - parent.position, -parent.orientation);
        Self::new(local, shortest_angle(parent.orientation, self.orientation))
    }
}

/// A child pose held relative to a movable parent.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PivotFrame {
    pub parent: Transform2,
    pub local: Transform2,
}

impl PivotFrame {
    /// Attach a child currently at `child_world` to `parent`.
    pub fn attach(parent: Transform2, child_world: Transform2) -> Self {
        Self { parent, local: child_world.relative_to(&parent) }
    }

    /// Re-read the child's offset from its actual world pose, keeping the
    /// parent where it is.
    pub fn reattach(&mut self, child_world: Transform2) {
        self.local = child_world.relative_to(&self.parent);
    }

    pub fn world(&self) -> Transform2 {
        self.parent.compose(&self.local)
    }

    /// Spin the parent in place by `degrees`, carrying the child with it.
    pub fn rotate_parent(&mut self, degrees: f32) {
        self.parent.orientation = wrap_degrees(self.parent.orientation + degrees);
    }

    /// Release the child, returning its world pose.
    pub fn detach(self) -> Transform2 {
        self.world()
    }
}
