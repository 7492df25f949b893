//! march — a small arena exercising every layer of steerkit.
//!
//! - a flock wandering in the west half (separation, cohesion, alignment),
//! - a courier that plans around a pillar on a tile graph and avoids walls,
//! - a wedge formation whose usher wheels around a hinge toward the north
//!   and waits for stragglers.
//!
//! Usage: `march [config.json] [output-dir]`.  The optional JSON file holds
//! a `SimConfig`; missing fields take their defaults.  Set `RUST_LOG=debug`
//! to watch hinge, waiter and formation decisions.

mod arena;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use log::info;

use sk_core::{SimConfig, Tick};
use sk_output::{CsvWriter, OutputWriter, SimOutputObserver};
use sk_sim::{AgentStore, SimObserver};

// ── Constants ─────────────────────────────────────────────────────────────────

const TOTAL_TICKS:           u64 = 1_800; // 30 s at 60 Hz
const OUTPUT_INTERVAL_TICKS: u64 = 10;
const DEFAULT_OUTPUT_DIR:    &str = "output/march";

// ── Observer wrapper to count rows ───────────────────────────────────────────

struct CountingObserver<W: OutputWriter> {
    inner:          SimOutputObserver<W>,
    trajectory_rows: usize,
    summary_rows:   usize,
    event_rows:     usize,
}

impl<W: OutputWriter> CountingObserver<W> {
    fn new(inner: SimOutputObserver<W>) -> Self {
        Self { inner, trajectory_rows: 0, summary_rows: 0, event_rows: 0 }
    }
}

impl<W: OutputWriter> SimObserver for CountingObserver<W> {
    fn on_tick_end(&mut self, tick: Tick, active: usize) {
        self.summary_rows += 1;
        self.inner.on_tick_end(tick, active);
    }

    fn on_snapshot(&mut self, tick: Tick, agents: &AgentStore) {
        self.trajectory_rows += agents.live_count();
        self.inner.on_snapshot(tick, agents);
    }

    fn on_formation_events(&mut self, tick: Tick, events: &[sk_formation::FormationEvent]) {
        self.event_rows += events.len();
        self.inner.on_formation_events(tick, events);
    }

    fn on_sim_end(&mut self, final_tick: Tick) {
        self.inner.on_sim_end(final_tick);
    }
}

// ── Configuration ─────────────────────────────────────────────────────────────

fn load_config(path: Option<&Path>) -> Result<SimConfig> {
    let Some(path) = path else {
        return Ok(SimConfig {
            total_ticks: TOTAL_TICKS,
            output_interval_ticks: OUTPUT_INTERVAL_TICKS,
            ..SimConfig::default()
        });
    };
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let config: SimConfig =
        serde_json::from_reader(file).with_context(|| format!("parsing {}", path.display()))?;
    Ok(config)
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let config_path = args.next().map(PathBuf::from);
    let output_dir = args.next().map_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR), PathBuf::from);

    let config = load_config(config_path.as_deref())?;
    info!(
        "{} ticks of {:.4} s, seed {}, snapshot every {} ticks",
        config.total_ticks, config.delta_secs, config.seed, config.output_interval_ticks
    );

    // 1. Build the arena.
    let arena::Arena { mut sim, courier, usher, formation } = arena::build(config.clone())?;
    for (agent, issue) in sim.config_issues() {
        eprintln!("config issue on {agent}: {issue}");
    }
    info!("{} agents, formation handle {formation}", sim.agents.len());

    // 2. Set up output.
    let writer = CsvWriter::new(&output_dir)?;
    let mut obs = CountingObserver::new(SimOutputObserver::new(writer, &config));

    // 3. Run.
    let t0 = Instant::now();
    sim.run(&mut obs)?;
    let elapsed = t0.elapsed();

    if let Some(e) = obs.inner.take_error() {
        eprintln!("output error: {e}");
    }

    // 4. Summary.
    println!("Simulation complete in {:.3} s", elapsed.as_secs_f64());
    println!("  trajectories.csv     : {} rows", obs.trajectory_rows);
    println!("  tick_summaries.csv   : {} rows", obs.summary_rows);
    println!("  formation_events.csv : {} rows", obs.event_rows);
    println!("  written to {}", output_dir.display());
    println!();

    println!("{:<10} {:>10} {:>10} {:>8}", "Agent", "x", "y", "speed");
    println!("{}", "-".repeat(41));
    for (label, id) in [("courier", courier), ("usher", usher)] {
        if let Some(s) = sim.agents.state(id) {
            println!("{:<10} {:>10.1} {:>10.1} {:>8.1}", label, s.position.x, s.position.y, s.speed());
        }
    }

    Ok(())
}
