//! Behaviors that react to other agents or to the obstacle layout.
//!
//! Most of these compute a synthetic [`Marker`](crate::Marker) (a predicted
//! position, a centroid, an average heading) and delegate to a primitive.

mod cohesion;
mod group_align;
mod hide;
mod interpose;
mod offset_follow;
mod pursuit;
mod separation;

pub use cohesion::Cohesion;
pub use group_align::GroupAlign;
pub use hide::{Hide, hiding_spot};
pub use interpose::Interpose;
pub use offset_follow::OffsetFollow;
pub use pursuit::{Evade, Pursue};
pub use separation::{Falloff, Separation};

/// Seconds until two agents `distance` apart would meet if they closed at
/// their combined speed, capped at `max_secs`.
///
/// Two stationary agents give an infinite raw estimate; that case (and any
/// other non-finite result) predicts no movement at all.
pub(crate) fn look_ahead(distance: f32, combined_speed: f32, max_secs: f32) -> f32 {
    let t = distance / combined_speed;
    if t.is_finite() { t.min(max_secs).max(0.0) } else { 0.0 }
}
