//! Degree-based 2D angle helpers.
//!
//! All angles are degrees, counter-clockwise from +X.  `glam` works in
//! radians; the conversions happen here so behavior code never mixes units.

use glam::Vec2;

/// Lengths and angles below this are treated as zero.
pub const EPSILON: f32 = 1e-4;

/// Unit vector pointing along `orientation_deg`.
#[inline]
pub fn heading(orientation_deg: f32) -> Vec2 {
    Vec2::from_angle(orientation_deg.to_radians())
}

/// Orientation (degrees) of `v`.  The zero vector maps to `0.0`.
#[inline]
pub fn orientation_of(v: Vec2) -> f32 {
    v.y.atan2(v.x).to_degrees()
}

/// Wrap an angle into `(-180, 180]`.
pub fn wrap_degrees(angle: f32) -> f32 {
    let mut a = angle % 360.0;
    if a <= -180.0 {
        a += 360.0;
    } else if a > 180.0 {
        a -= 360.0;
    }
    a
}

/// Signed shortest rotation from `from_deg` to `to_deg`, in `(-180, 180]`.
/// Positive means counter-clockwise.
#[inline]
pub fn shortest_angle(from_deg: f32, to_deg: f32) -> f32 {
    wrap_degrees(to_deg - from_deg)
}

/// Signed angle (degrees) that rotates direction `from` onto direction `to`.
///
/// Returns `0.0` if either vector is degenerate.
pub fn signed_angle_between(from: Vec2, to: Vec2) -> f32 {
    if from.length_squared() < EPSILON * EPSILON || to.length_squared() < EPSILON * EPSILON {
        return 0.0;
    }
    from.perp_dot(to).atan2(from.dot(to)).to_degrees()
}

/// Rotate `v` counter-clockwise by `angle_deg`.
#[inline]
pub fn rotate(v: Vec2, angle_deg: f32) -> Vec2 {
    Vec2::from_angle(angle_deg.to_radians()).rotate(v)
}

/// 2D cross product (z component of the 3D cross).  Positive when `b` lies
/// counter-clockwise (to the left) of `a`.
#[inline]
pub fn cross(a: Vec2, b: Vec2) -> f32 {
    a.perp_dot(b)
}

/// `true` if `v` is too short to normalize meaningfully.
#[inline]
pub fn is_negligible(v: Vec2) -> bool {
    v.length_squared() < EPSILON * EPSILON
}
