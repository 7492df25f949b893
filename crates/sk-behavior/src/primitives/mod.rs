//! Single-target steering primitives.
//!
//! Every primitive implements [`MarkerSteering`](crate::MarkerSteering) so
//! composites can aim it at synthesized markers, and offers a `targeting`
//! helper that binds it to a fixed [`Target`](crate::Target).

mod align;
mod arrive;
mod face;
mod flee;
mod seek;
mod velocity_matching;
mod wander;

pub use align::Align;
pub use arrive::{Arrive, LinearArrive};
pub use face::Face;
pub use flee::Flee;
pub use seek::Seek;
pub use velocity_matching::VelocityMatching;
pub use wander::Wander;

/// Fraction of the maximum a speed profile never drops below while still
/// outside the arrival zone.
pub(crate) const APPROACH_FLOOR: f32 = 0.05;

/// Lowest commanded speed (or rotation speed) while approaching.
#[inline]
pub(crate) fn approach_floor(max: f32, stop_threshold: f32) -> f32 {
    (max * APPROACH_FLOOR).max(stop_threshold).min(max)
}
