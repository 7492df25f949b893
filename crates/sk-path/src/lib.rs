//! `sk-path` — navigation graphs, path search, and waypoint paths.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                      |
//! |---------------|---------------------------------------------------------------|
//! | [`graph`]     | `NavGraph` (CSR + R-tree), `NavGraphBuilder`, `TileGrid`      |
//! | [`search`]    | `PathSearch` trait, `Route`, `Dijkstra`, `AStar`, `BreadthFirst`, `DepthFirst` |
//! | [`smoothing`] | `smooth_path` — string pulling against a `LineOfSight` oracle |
//! | [`path`]      | `Path` — looping or one-shot waypoint list with a cursor      |
//! | [`navigator`] | `NavigationOracle` trait, `GraphNavigator`                    |
//! | [`error`]     | `PathError`, `PathResult<T>`                                  |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on `Path` and `TileGrid`.  |

pub mod error;
pub mod graph;
pub mod navigator;
pub mod path;
pub mod search;
pub mod smoothing;


pub use error::{PathError, PathResult};
pub use graph::{NavGraph, NavGraphBuilder, TileGrid};
pub use navigator::{GraphNavigator, NavigationOracle};
pub use path::Path;
pub use search::{AStar, BreadthFirst, DepthFirst, Dijkstra, PathSearch, Route};
pub use smoothing::smooth_path;
