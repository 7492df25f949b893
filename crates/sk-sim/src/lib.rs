//! `sk-sim` — fixed-timestep host for the steerkit workspace.
//!
//! # Two-phase tick loop
//!
//! ```text
//! for tick in 0..config.total_ticks:
//!   ① Sync      — formations with a changed layout spawn/despawn members.
//!   ② Index     — rebuild the spatial index over live agents.
//!   ③ Publish   — slot markers follow their ushers; events go to observers.
//!   ④ Steer     — poll every live agent's root behavior against the
//!                 start-of-tick snapshot (parallel with `parallel`).
//!   ⑤ Apply     — KinematicState::apply in ascending AgentId order.
//! ```
//!
//! No behavior observes another agent's output from the same tick, so the
//! outcome does not depend on evaluation order.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs the steering pass on Rayon's thread pool.         |
//! | `serde`    | Serde support on configuration and formation types.    |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use sk_behavior::Seek;
//! use sk_core::{KinematicState, SimConfig, Vec2};
//! use sk_sim::{NoopObserver, SimBuilder};
//!
//! let mut builder = SimBuilder::new(SimConfig::default());
//! builder.add_agent(KinematicState::at(Vec2::ZERO, 0.0), Box::new(Seek::new(5.0).targeting(Vec2::new(300.0, 0.0))));
//! let mut sim = builder.build()?;
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod sim;
pub mod store;

mod spawner;


pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use sim::Sim;
pub use store::{AgentRngs, AgentStore};
