//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `trajectories.csv`
//! - `tick_summaries.csv`
//! - `formation_events.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;
use log::debug;

use crate::writer::OutputWriter;
use crate::{FormationEventRow, OutputResult, TickSummaryRow, TrajectoryRow};

/// Writes simulation output to three CSV files.
pub struct CsvWriter {
    trajectories: Writer<File>,
    summaries:    Writer<File>,
    events:       Writer<File>,
    finished:     bool,
}

impl CsvWriter {
    /// Create `dir` if needed, open the three CSV files in it and write the
    /// header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        std::fs::create_dir_all(dir)?;

        let mut trajectories = Writer::from_path(dir.join("trajectories.csv"))?;
        trajectories.write_record(["agent_id", "tick", "x", "y", "orientation", "vx", "vy"])?;

        let mut summaries = Writer::from_path(dir.join("tick_summaries.csv"))?;
        summaries.write_record(["tick", "elapsed_secs", "active_agents"])?;

        let mut events = Writer::from_path(dir.join("formation_events.csv"))?;
        events.write_record(["tick", "group", "kind", "slot", "agent"])?;

        debug!("writing CSV output to {}", dir.display());
        Ok(Self { trajectories, summaries, events, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_trajectories(&mut self, rows: &[TrajectoryRow]) -> OutputResult<()> {
        for row in rows {
            self.trajectories.write_record(&[
                row.agent_id.to_string(),
                row.tick.to_string(),
                format!("{:.3}", row.x),
                format!("{:.3}", row.y),
                format!("{:.3}", row.orientation),
                format!("{:.3}", row.vx),
                format!("{:.3}", row.vy),
            ])?;
        }
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            format!("{:.4}", row.elapsed_secs),
            row.active_agents.to_string(),
        ])?;
        Ok(())
    }

    fn write_events(&mut self, rows: &[FormationEventRow]) -> OutputResult<()> {
        for row in rows {
            self.events.write_record(&[
                row.tick.to_string(),
                row.group.to_string(),
                row.kind.to_string(),
                row.slot.to_string(),
                row.agent.to_string(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.trajectories.flush()?;
        self.summaries.flush()?;
        self.events.flush()?;
        Ok(())
    }
}
