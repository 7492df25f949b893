//! Fixed formation patterns.
//!
//! Offsets are expressed in the usher's local frame: +X points along the
//! usher's facing, +Y to its left.  Slot 0 is always the slot nearest the
//! front-left of the pattern.

use sk_core::Vec2;
use sk_core::math::heading;

use crate::{FormationError, FormationResult};

/// A named slot arrangement, or an explicit offset list.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Pattern {
    /// Abreast, centered on the usher.
    Line { spacing: f32 },
    /// Single file, starting at the usher and extending backward.
    Column { spacing: f32 },
    /// Apex at the usher; ranks alternate left and right, each one step back.
    Wedge { spacing: f32 },
    /// Rows of `columns` centered on the usher.  `spacing.x` separates rows
    /// (along the facing), `spacing.y` separates columns.  A partial last row
    /// is centered.
    Grid { columns: usize, spacing: Vec2 },
    /// Evenly spaced on a circle around the usher, slot 0 straight ahead.
    Circle { radius: f32 },
    /// Explicit offsets.  `count` must not exceed the list length.
    Offsets(Vec<Vec2>),
}

impl Pattern {
    /// Reject degenerate parameters for a pattern of `count` slots.
    pub fn validate(&self, count: usize) -> FormationResult<()> {
        let bad = |msg: String| Err(FormationError::InvalidLayout(msg));
        match self {
            Pattern::Line { spacing } | Pattern::Column { spacing } | Pattern::Wedge { spacing }
                if !(*spacing > 0.0) =>
            {
                bad(format!("spacing must be positive, got {spacing}"))
            }
            Pattern::Grid { columns: 0, .. } => bad("grid needs at least one column".into()),
            Pattern::Grid { spacing, .. } if !(spacing.x > 0.0 && spacing.y > 0.0) => {
                bad(format!("grid spacing must be positive, got ({}, {})", spacing.x, spacing.y))
            }
            Pattern::Circle { radius } if !(*radius > 0.0) => {
                bad(format!("circle radius must be positive, got {radius}"))
            }
            Pattern::Offsets(list) if list.len() < count => bad(format!(
                "{count} members requested but only {} offsets given",
                list.len()
            )),
            _ => Ok(()),
        }
    }

    /// Local offsets of the first `count` slots.
    pub fn offsets(&self, count: usize) -> FormationResult<Vec<Vec2>> {
        self.validate(count)?;
        let offsets = match self {
            Pattern::Line { spacing } => {
                let half = (count as f32 - 1.0) / 2.0;
                (0..count).map(|i| Vec2::new(0.0, (half - i as f32) * spacing)).collect()
            }
            Pattern::Column { spacing } => {
                (0..count).map(|i| Vec2::new(-(i as f32) * spacing, 0.0)).collect()
            }
            Pattern::Wedge { spacing } => (0..count)
                .map(|i| {
                    let rank = ((i + 1) / 2) as f32;
                    let side = if i % 2 == 1 { 1.0 } else { -1.0 };
                    Vec2::new(-rank * spacing, side * rank * spacing)
                })
                .collect(),
            Pattern::Grid { columns, spacing } => grid_offsets(count, *columns, *spacing),
            Pattern::Circle { radius } => {
                let step = 360.0 / count.max(1) as f32;
                (0..count).map(|i| heading(i as f32 * step) * *radius).collect()
            }
            Pattern::Offsets(list) => list[..count].to_vec(),
        };
        Ok(offsets)
    }
}

/// Centered rows of `columns`; `spacing.x` between rows, `spacing.y`
/// between columns.
fn grid_offsets(count: usize, columns: usize, spacing: Vec2) -> Vec<Vec2> {
    let columns = columns.max(1);
    let rows = count.div_ceil(columns);
    let front = (rows as f32 - 1.0) / 2.0;
    (0..count)
        .map(|i| {
            let (row, col) = (i / columns, i % columns);
            let in_row = columns.min(count - row * columns);
            let left = (in_row as f32 - 1.0) / 2.0;
            Vec2::new((front - row as f32) * spacing.x, (left - col as f32) * spacing.y)
        })
        .collect()
}
