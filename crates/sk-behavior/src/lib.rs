//! `sk-behavior` — steering behaviors and the combinators that arbitrate
//! between them.
//!
//! # Crate layout
//!
//! | Module             | Contents                                                          |
//! |--------------------|-------------------------------------------------------------------|
//! | [`behavior`]       | `SteeringBehavior` and `MarkerSteering` traits, `Targeted`, `ConfigIssue` |
//! | [`args`]           | `SteeringArgs` — per-agent, per-tick inputs                        |
//! | [`context`]        | `SteeringContext<'a>` — read-only tick snapshot, `MarkerBoard`     |
//! | [`target`]         | `Target`, `Marker`                                                 |
//! | [`primitives`]     | `Seek`, `Flee`, `Arrive`, `LinearArrive`, `Align`, `Face`, `Wander`, `VelocityMatching` |
//! | [`group`]          | `Separation`, `Cohesion`, `GroupAlign`, `Pursue`, `Evade`, `Interpose`, `Hide`, `OffsetFollow` |
//! | [`avoidance`]      | `AgentAvoider`, `WallAvoider`, `ActiveAvoider`                     |
//! | [`blend`]          | `WeightBlended`, `PriorityWeightBlended`, `PriorityDitheringBlended` |
//! | [`path_following`] | `PathFollowing`, `PathfindingFollower`                             |
//! | [`error`]          | `BehaviorError`, `BehaviorResult<T>`                               |
//!
//! # Design notes
//!
//! Every tick the host runs two phases:
//!
//! 1. **Steering phase** (optionally parallel): for every live agent,
//!    refresh its `SteeringArgs` and poll its root behavior against the
//!    shared `&SteeringContext`.  Behaviors only read the world; their own
//!    continuation state is the only thing they mutate.
//!
//! 2. **Apply phase** (sequential): integrate each agent's output into its
//!    `KinematicState` in ascending id order.
//!
//! Because the snapshot is taken before any behavior runs, no agent sees a
//! neighbour's output from the same tick.

pub mod args;
pub mod avoidance;
pub mod behavior;
pub mod blend;
pub mod context;
pub mod error;
pub mod group;
pub mod path_following;
pub mod primitives;
pub mod target;

#[cfg(test)]
mod tests;

pub use args::SteeringArgs;
pub use avoidance::{ActiveAgentAvoider, ActiveAvoider, ActiveWallAvoider, AgentAvoider, PassiveAvoider, WallAvoider};
pub use behavior::{BoxedBehavior, ConfigIssue, MarkerSteering, SteeringBehavior, Targeted};
pub use blend::{PriorityDitheringBlended, PriorityWeightBlended, WeightBlended};
pub use context::{AgentSet, MarkerBoard, SlotBinding, SteeringContext};
pub use error::{BehaviorError, BehaviorResult};
pub use group::{
    Cohesion, Evade, Falloff, GroupAlign, Hide, Interpose, OffsetFollow, Pursue, Separation, hiding_spot,
};
pub use path_following::{PathFollowing, PathfindingFollower};
pub use primitives::{Align, Arrive, Face, Flee, LinearArrive, Seek, VelocityMatching, Wander};
pub use target::{Marker, Target};
