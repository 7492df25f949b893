//! Fixed-timestep time model and polled countdown timers.
//!
//! # Design
//!
//! Time advances in fixed physics ticks.  `SimClock` maps the integer tick
//! counter to elapsed seconds:
//!
//!   elapsed_secs = tick * delta_secs
//!
//! Timers never block or fire callbacks: a [`Countdown`] is polled once per
//! tick and reports whether it elapsed during that tick, and the behavior
//! that owns it consumes the flag on the spot.

use std::fmt;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// An absolute simulation tick counter.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Return the tick `n` steps after `self`.
    #[inline]
    pub fn offset(self, n: u64) -> Tick {
        Tick(self.0 + n)
    }

    /// Ticks elapsed from `earlier` to `self`.
    ///
    /// # Panics
    /// Panics in debug mode if `earlier > self`.
    #[inline]
    pub fn since(self, earlier: Tick) -> u64 {
        self.0 - earlier.0
    }
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl std::ops::Sub for Tick {
    type Output = u64;
    #[inline]
    fn sub(self, rhs: Tick) -> u64 {
        self.0 - rhs.0
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Tracks the current tick and converts it to elapsed seconds.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimClock {
    /// Seconds per physics tick.
    pub delta_secs: f32,
    /// The current tick, advanced by `SimClock::advance()` each iteration.
    pub current_tick: Tick,
}

impl SimClock {
    pub fn new(delta_secs: f32) -> Self {
        Self { delta_secs, current_tick: Tick::ZERO }
    }

    /// Advance the clock by one tick.
    #[inline]
    pub fn advance(&mut self) {
        self.current_tick = Tick(self.current_tick.0 + 1);
    }

    /// Elapsed simulated seconds since tick 0.
    #[inline]
    pub fn elapsed_secs(&self) -> f64 {
        self.current_tick.0 as f64 * self.delta_secs as f64
    }

    /// How many ticks span `secs` seconds? (rounds up)
    #[inline]
    pub fn ticks_for_secs(&self, secs: f32) -> u64 {
        if self.delta_secs <= 0.0 {
            return 0;
        }
        (secs / self.delta_secs).ceil().max(0.0) as u64
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.3} s)", self.current_tick, self.elapsed_secs())
    }
}

// ── SimConfig ─────────────────────────────────────────────────────────────────

/// Top-level run configuration.
///
/// Typically loaded from a JSON file by the application crate (with the
/// `serde` feature) and passed to the simulation builder.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Seconds per physics tick.  Default: 1/60.
    pub delta_secs: f32,

    /// Total ticks to simulate.
    pub total_ticks: u64,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Snapshot observers every N ticks.  0 disables snapshots.
    pub output_interval_ticks: u64,

    /// Refuse to build when any behavior reports a configuration issue.
    pub strict_validation: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            delta_secs:            1.0 / 60.0,
            total_ticks:           600,
            seed:                  42,
            output_interval_ticks: 1,
            strict_validation:     false,
        }
    }
}

impl SimConfig {
    /// The tick at which the simulation ends (exclusive upper bound).
    #[inline]
    pub fn end_tick(&self) -> Tick {
        Tick(self.total_ticks)
    }

    /// Construct a `SimClock` pre-configured for this run.
    pub fn make_clock(&self) -> SimClock {
        SimClock::new(self.delta_secs)
    }
}

// ── Countdown ─────────────────────────────────────────────────────────────────

/// A polled countdown, one-shot or repeating.
///
/// ```
/// use sk_core::Countdown;
///
/// let mut timer = Countdown::repeating(0.5);
/// timer.start();
/// assert!(!timer.tick(0.25));
/// assert!(timer.tick(0.25));   // elapsed this tick
/// assert!(timer.is_running()); // repeating timers re-arm themselves
/// ```
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Countdown {
    duration_secs: f32,
    remaining_secs: f32,
    repeating: bool,
    running: bool,
}

impl Countdown {
    /// A stopped one-shot timer.
    pub fn once(duration_secs: f32) -> Self {
        Self { duration_secs, remaining_secs: duration_secs, repeating: false, running: false }
    }

    /// A stopped repeating timer.
    pub fn repeating(duration_secs: f32) -> Self {
        Self { duration_secs, remaining_secs: duration_secs, repeating: true, running: false }
    }

    pub fn duration_secs(&self) -> f32 {
        self.duration_secs
    }

    pub fn remaining_secs(&self) -> f32 {
        self.remaining_secs
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Start (or restart) from the full duration.
    pub fn start(&mut self) {
        self.remaining_secs = self.duration_secs;
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Advance by `delta_secs`.  Returns `true` if the timer elapsed during
    /// this call.  One-shot timers stop after elapsing; repeating timers
    /// re-arm and carry over the excess.
    pub fn tick(&mut self, delta_secs: f32) -> bool {
        if !self.running {
            return false;
        }
        self.remaining_secs -= delta_secs;
        if self.remaining_secs > 0.0 {
            return false;
        }
        if self.repeating && self.duration_secs > 0.0 {
            while self.remaining_secs <= 0.0 {
                self.remaining_secs += self.duration_secs;
            }
        } else {
            self.remaining_secs = 0.0;
            self.running = false;
        }
        true
    }
}
