//! `sk-output` — CSV output for steerkit simulation runs.
//!
//! | File                   | One row per                                 |
//! |------------------------|---------------------------------------------|
//! | `trajectories.csv`     | live agent per snapshot tick                |
//! | `tick_summaries.csv`   | tick                                        |
//! | `formation_events.csv` | formation event (spawn, despawn, obstruction, relayout) |
//!
//! [`CsvWriter`] implements [`OutputWriter`] and is driven by
//! [`SimOutputObserver`], which implements `sk_sim::SimObserver`.
//!
//! # Usage
//!
//! ```rust,ignore
//! use sk_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = SimOutputObserver::new(writer, &config);
//! sim.run(&mut obs)?;
//! if let Some(e) = obs.take_error() {
//!     eprintln!("output error: {e}");
//! }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod writer;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::{SimOutputObserver, event_row};
pub use row::{FormationEventRow, TickSummaryRow, TrajectoryRow};
pub use writer::OutputWriter;
