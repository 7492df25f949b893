//! `sk-core` — foundational types for the `steerkit` workspace.
//!
//! This crate is a dependency of every other `sk-*` crate.  It intentionally
//! has no `sk-*` dependencies and minimal external ones (`glam`, `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `NodeId`, `EdgeId`, `MarkerId`, `GroupId`      |
//! | [`math`]        | degree-based angle helpers, headings, signed angles       |
//! | [`kinematics`]  | `KinematicState` — per-agent pose, velocity and limits    |
//! | [`steering`]    | `SteeringOutput`, `Steering`                              |
//! | [`curve`]       | `Curve` — piecewise-linear response curves                |
//! | [`time`]        | `Tick`, `SimClock`, `SimConfig`, `Countdown`              |
//! | [`rng`]         | `AgentRng` (per-agent), `SimRng` (global)                 |
//! | [`error`]       | `CoreError`, `CoreResult`                                 |
//!
//! # Conventions
//!
//! Orientations are in **degrees**, measured counter-clockwise from the +X
//! axis.  An orientation of `0.0` faces `(1, 0)`; `90.0` faces `(0, 1)`.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod curve;
pub mod error;
pub mod ids;
pub mod kinematics;
pub mod math;
pub mod rng;
pub mod steering;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use curve::Curve;
pub use error::{CoreError, CoreResult};
pub use glam::Vec2;
pub use ids::{AgentId, EdgeId, GroupId, MarkerId, NodeId};
pub use kinematics::KinematicState;
pub use rng::{AgentRng, SimRng};
pub use steering::{Steering, SteeringOutput};
pub use time::{Countdown, SimClock, SimConfig, Tick};
