//! Simulation observer trait for progress reporting and data collection.

use sk_core::Tick;
use sk_formation::FormationEvent;

use crate::AgentStore;

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: progress printer
///
/// ```rust,ignore
/// struct ProgressPrinter { interval: u64 }
///
/// impl SimObserver for ProgressPrinter {
///     fn on_tick_end(&mut self, tick: Tick, active: usize) {
///         if tick.0 % self.interval == 0 {
///             println!("tick {tick}: steered {active} agents");
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called at the end of each tick.
    ///
    /// `active` is the number of live agents steered this tick.
    fn on_tick_end(&mut self, _tick: Tick, _active: usize) {}

    /// Called at snapshot intervals (every `config.output_interval_ticks`
    /// ticks), after the tick's states have been integrated.
    fn on_snapshot(&mut self, _tick: Tick, _agents: &AgentStore) {}

    /// Called when formations reported events during the tick.
    fn on_formation_events(&mut self, _tick: Tick, _events: &[FormationEvent]) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.  Use when you need to call `run` but
/// don't want progress callbacks.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
