//! Scalable grid layouts.
//!
//! A scalable formation is a rectangular grid described by any two of
//! quantity, dimensions and density; the third is derived.  Dimensions are
//! `(width, length)`: width runs across the usher's facing, length along it.
//!
//! | Mode           | Given                           | Derived                                  |
//! |----------------|---------------------------------|------------------------------------------|
//! | `FitQuantity`  | quantity, dimensions            | density; quantity reduced to fit spacing |
//! | `FitDensity`   | density, quantity, aspect ratio | dimensions                               |
//! | `FillArea`     | density, dimensions             | quantity; reduced to fit spacing         |
//!
//! Solving is a single pass: every call derives the full [`SolvedGrid`] from
//! the mode's inputs.

use sk_core::Vec2;

use crate::{FormationError, FormationResult};

/// Which two quantities are fixed.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScalableMode {
    FitQuantity { quantity: usize, dimensions: Vec2 },
    /// `aspect` is width / length.
    FitDensity { density: f32, quantity: usize, aspect: f32 },
    FillArea { density: f32, dimensions: Vec2 },
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScalableLayout {
    pub mode: ScalableMode,
    /// Smallest allowed spacing between neighbours on either axis.
    pub min_spacing: f32,
}

/// A fully derived grid.
#[derive(Clone, Debug, PartialEq)]
pub struct SolvedGrid {
    pub quantity: usize,
    pub columns: usize,
    pub rows: usize,
    /// `(width, length)`.
    pub dimensions: Vec2,
    /// `(between columns, between rows)`.
    pub spacing: Vec2,
    /// Members per square unit.
    pub density: f32,
}

impl ScalableLayout {
    pub fn new(mode: ScalableMode) -> Self {
        Self { mode, min_spacing: 0.0 }
    }

    pub fn with_min_spacing(mut self, min_spacing: f32) -> Self {
        self.min_spacing = min_spacing;
        self
    }

    pub fn solve(&self) -> FormationResult<SolvedGrid> {
        match self.mode {
            ScalableMode::FitQuantity { quantity, dimensions } => {
                check_dimensions(dimensions)?;
                if quantity == 0 {
                    return Err(invalid("quantity must be positive".into()));
                }
                self.fit_down(quantity, dimensions)
            }
            ScalableMode::FitDensity { density, quantity, aspect } => {
                check_density(density)?;
                if quantity == 0 {
                    return Err(invalid("quantity must be positive".into()));
                }
                if !(aspect > 0.0) {
                    return Err(invalid(format!("aspect ratio must be positive, got {aspect}")));
                }
                let area = quantity as f32 / density;
                let length = (area / aspect).sqrt();
                let grid = SolvedGrid::lay_out(quantity, Vec2::new(aspect * length, length));
                if grid.spacing.min_element() < self.min_spacing {
                    return Err(invalid(format!(
                        "density {density} packs members closer than {}",
                        self.min_spacing
                    )));
                }
                Ok(grid)
            }
            ScalableMode::FillArea { density, dimensions } => {
                check_density(density)?;
                check_dimensions(dimensions)?;
                let quantity = (density * dimensions.x * dimensions.y + 1e-3).floor() as usize;
                if quantity == 0 {
                    return Err(invalid(format!("density {density} fits no member in the area")));
                }
                self.fit_down(quantity, dimensions)
            }
        }
    }

    /// Lay out `quantity` in `dimensions`, dropping members until the
    /// spacing clears `min_spacing`.
    fn fit_down(&self, quantity: usize, dimensions: Vec2) -> FormationResult<SolvedGrid> {
        (1..=quantity)
            .rev()
            .map(|q| SolvedGrid::lay_out(q, dimensions))
            .find(|grid| grid.spacing.min_element() >= self.min_spacing)
            .ok_or_else(|| {
                invalid(format!(
                    "no member fits {} x {} at spacing {}",
                    dimensions.x, dimensions.y, self.min_spacing
                ))
            })
    }
}

impl SolvedGrid {
    fn lay_out(quantity: usize, dimensions: Vec2) -> Self {
        let (width, length) = (dimensions.x, dimensions.y);
        let columns = ((quantity as f32 * width / length).sqrt().round() as usize).clamp(1, quantity);
        let rows = quantity.div_ceil(columns);
        Self {
            quantity,
            columns,
            rows,
            dimensions,
            spacing: Vec2::new(width / columns as f32, length / rows as f32),
            density: quantity as f32 / (width * length),
        }
    }

    /// Slot offsets in the usher frame, row by row from the front.  Each
    /// member sits in the middle of its grid cell.
    pub fn offsets(&self) -> Vec<Vec2> {
        let half_length = self.dimensions.y / 2.0;
        (0..self.quantity)
            .map(|i| {
                let (row, col) = (i / self.columns, i % self.columns);
                let in_row = self.columns.min(self.quantity - row * self.columns);
                let left = (in_row as f32 - 1.0) / 2.0;
                Vec2::new(
                    half_length - (row as f32 + 0.5) * self.spacing.y,
                    (left - col as f32) * self.spacing.x,
                )
            })
            .collect()
    }
}

fn invalid(msg: String) -> FormationError {
    FormationError::InvalidLayout(msg)
}

fn check_density(density: f32) -> FormationResult<()> {
    if density > 0.0 && density.is_finite() {
        Ok(())
    } else {
        Err(invalid(format!("density must be positive, got {density}")))
    }
}

fn check_dimensions(dimensions: Vec2) -> FormationResult<()> {
    if dimensions.x > 0.0 && dimensions.y > 0.0 && dimensions.is_finite() {
        Ok(())
    } else {
        Err(invalid(format!("dimensions must be positive, got ({}, {})", dimensions.x, dimensions.y)))
    }
}
