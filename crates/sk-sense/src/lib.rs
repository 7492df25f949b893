//! `sk-sense` — everything a behavior can ask about the world besides other
//! agents' kinematic state.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                     |
//! |----------------|--------------------------------------------------------------|
//! | [`layers`]     | `LayerMask` — physics-layer bit set                          |
//! | [`oracle`]     | `RayOracle`, `LineOfSight`, `ShapeOracle`, `RayHit`, `Shape` |
//! | [`obstacles`]  | `ObstacleSet` — walls and discs behind an R-tree             |
//! | [`agents`]     | `AgentIndex` — per-tick R-tree over live agent positions     |
//! | [`error`]      | `SenseError`, `SenseResult<T>`                               |
//!
//! Behaviors only ever see the oracle traits, so a host may answer ray and
//! shape queries with a full physics engine instead of [`ObstacleSet`].

pub mod agents;
pub mod error;
pub mod layers;
pub mod obstacles;
pub mod oracle;


pub use agents::AgentIndex;
pub use error::{SenseError, SenseResult};
pub use layers::LayerMask;
pub use obstacles::{Obstacle, ObstacleSet};
pub use oracle::{LineOfSight, NoObstacles, RayHit, RayOracle, Shape, ShapeOracle};
