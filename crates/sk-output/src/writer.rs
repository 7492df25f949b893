//! The `OutputWriter` trait implemented by backend writers.

use crate::{FormationEventRow, OutputResult, TickSummaryRow, TrajectoryRow};

/// Sink for simulation output rows.
///
/// All methods are infallible from the observer's perspective: errors are
/// stored internally and retrieved with
/// [`SimOutputObserver::take_error`](crate::SimOutputObserver::take_error).
pub trait OutputWriter {
    /// Write a batch of trajectory rows.
    fn write_trajectories(&mut self, rows: &[TrajectoryRow]) -> OutputResult<()>;

    /// Write one tick summary row.
    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    /// Write a batch of formation events.
    fn write_events(&mut self, rows: &[FormationEventRow]) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent: safe to call more than once.
    fn finish(&mut self) -> OutputResult<()>;
}
