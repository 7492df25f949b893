//! `sk-formation` — coordinated group movement.
//!
//! A formation is an **usher** (the agent the host steers toward a goal) and
//! a set of **slots** laid out around it.  Each slot is published as a
//! marker on the [`MarkerBoard`](sk_behavior::MarkerBoard) every tick, and
//! one spawned member agent steers toward it.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                            |
//! |----------------|---------------------------------------------------------------------|
//! | [`pattern`]    | `Pattern` — line, column, wedge, grid, circle, explicit offsets     |
//! | [`scalable`]   | `ScalableLayout` — grids solved from quantity, dimensions, density  |
//! | [`frame`]      | `Transform2`, `PivotFrame`                                          |
//! | [`spawn`]      | `Spawner` oracle, `SpawnRequest`                                    |
//! | [`formation`]  | `Formation`, `Layout`, `Choreography`, `FormationEvent`             |
//! | [`two_level`]  | `TwoLevelFormation` — squads of squads                              |
//! | [`member`]     | `FormationMember` — member root behavior                            |
//! | [`hinge`]      | `UsherHinge` — wheel around a hinge point when turning              |
//! | [`waiter`]     | `UsherWaiter` — hold the usher back while members lag               |
//! | [`error`]      | `FormationError`, `FormationResult<T>`                              |
//!
//! # Tick protocol
//!
//! The host calls [`Choreography::sync_members`] and then
//! [`Choreography::publish`] for every formation before the steering pass.
//! Sync only does work after a layout change; publish moves every slot
//! marker to follow the usher's current pose.

pub mod error;
pub mod formation;
pub mod frame;
pub mod hinge;
pub mod member;
pub mod pattern;
pub mod scalable;
pub mod spawn;
pub mod two_level;
pub mod waiter;

#[cfg(test)]
mod tests;

pub use error::{FormationError, FormationResult};
pub use formation::{Choreography, Formation, FormationEvent, FormationWorld, Layout, Spawned};
pub use frame::{PivotFrame, Transform2};
pub use hinge::{HingeState, UsherHinge};
pub use member::FormationMember;
pub use pattern::Pattern;
pub use scalable::{ScalableLayout, ScalableMode, SolvedGrid};
pub use spawn::{SpawnRequest, Spawner};
pub use two_level::TwoLevelFormation;
pub use waiter::{UsherWaiter, WaitMode};
