//! Hit-test oracle traits.
//!
//! The steering layer treats collision queries as a black box: it asks
//! "what does this ray hit first?" and "does this shape overlap anything?",
//! nothing more.

use glam::Vec2;

use crate::LayerMask;

/// Nearest intersection of a ray with the world.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RayHit {
    pub point: Vec2,
    /// Unit surface normal, facing back toward the ray origin.
    pub normal: Vec2,
    /// Distance from the ray origin to `point`.
    pub distance: f32,
}

/// Query shapes for overlap tests.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Shape {
    Circle { center: Vec2, radius: f32 },
}

/// Ray casting against static obstacles.
///
/// Implementations must be `Send + Sync` so one oracle can be shared by every
/// agent during a (possibly parallel) steering pass.
pub trait RayOracle: Send + Sync {
    /// Cast from `origin` along unit `direction` up to `max_distance`.
    /// Returns the nearest hit on an obstacle matching `layers`.
    fn cast_ray(&self, origin: Vec2, direction: Vec2, max_distance: f32, layers: LayerMask) -> Option<RayHit>;
}

/// Visibility between two points.
///
/// Blanket-implemented for every [`RayOracle`]; implement it directly only
/// when a cheaper visibility test than a ray cast exists.
pub trait LineOfSight: Send + Sync {
    /// `true` if nothing on `layers` blocks the straight segment `from → to`.
    fn line_of_sight(&self, from: Vec2, to: Vec2, layers: LayerMask) -> bool;
}

impl<T: RayOracle + ?Sized> LineOfSight for T {
    fn line_of_sight(&self, from: Vec2, to: Vec2, layers: LayerMask) -> bool {
        let delta = to - from;
        let distance = delta.length();
        if distance <= f32::EPSILON {
            return true;
        }
        self.cast_ray(from, delta / distance, distance, layers).is_none()
    }
}

/// Shape overlap queries against static obstacles.
pub trait ShapeOracle: Send + Sync {
    /// `true` if `shape` overlaps any obstacle matching `layers`.
    fn overlaps(&self, shape: Shape, layers: LayerMask) -> bool;
}

/// An empty world: rays never hit, shapes never overlap.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoObstacles;

impl RayOracle for NoObstacles {
    fn cast_ray(&self, _origin: Vec2, _direction: Vec2, _max_distance: f32, _layers: LayerMask) -> Option<RayHit> {
        None
    }
}

impl ShapeOracle for NoObstacles {
    fn overlaps(&self, _shape: Shape, _layers: LayerMask) -> bool {
        false
    }
}
