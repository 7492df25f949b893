//! Piecewise-linear response curves on the unit interval.
//!
//! Arrive and Align key their acceleration and braking phases on these: the
//! input is a normalized distance (or angle) in `[0, 1]`, the output a
//! fraction of the maximum speed.

use crate::{CoreError, CoreResult};

/// A piecewise-linear curve through `(x, y)` control points.
///
/// Points are sorted by `x`; sampling outside the first/last point clamps to
/// the end values.  Deserialized curves go through the same checks as
/// [`Curve::new`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<(f32, f32)>", into = "Vec<(f32, f32)>"))]
pub struct Curve {
    points: Vec<(f32, f32)>,
}

impl Curve {
    /// Build a curve from control points.
    ///
    /// # Errors
    /// Fails if `points` is empty, contains non-finite values, or is not
    /// strictly increasing in `x`.
    pub fn new(points: Vec<(f32, f32)>) -> CoreResult<Self> {
        if points.is_empty() {
            return Err(CoreError::Curve("a curve needs at least one point".into()));
        }
        if points.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
            return Err(CoreError::Curve("curve points must be finite".into()));
        }
        if points.windows(2).any(|w| w[1].0 <= w[0].0) {
            return Err(CoreError::Curve("curve points must be strictly increasing in x".into()));
        }
        Ok(Self { points })
    }

    /// A flat curve.
    pub fn constant(y: f32) -> Self {
        Self { points: vec![(0.0, y)] }
    }

    /// Straight ramp from `(0, start)` to `(1, 1)`.
    pub fn ramp(start: f32) -> Self {
        Self { points: vec![(0.0, start), (1.0, 1.0)] }
    }

    /// Fast start, gentle finish: reaches 0.75 at the half-way point.
    pub fn ease_out(start: f32) -> Self {
        let mid = start + (1.0 - start) * 0.75;
        Self { points: vec![(0.0, start), (0.5, mid), (1.0, 1.0)] }
    }

    pub fn points(&self) -> &[(f32, f32)] {
        &self.points
    }

    /// `true` if the curve never decreases as `x` grows.
    pub fn is_non_decreasing(&self) -> bool {
        self.points.windows(2).all(|w| w[1].1 >= w[0].1)
    }

    /// Evaluate at `x` (clamped to the curve's domain).
    pub fn sample(&self, x: f32) -> f32 {
        let first = self.points[0];
        if x <= first.0 {
            return first.1;
        }
        for w in self.points.windows(2) {
            let (x0, y0) = w[0];
            let (x1, y1) = w[1];
            if x <= x1 {
                let t = (x - x0) / (x1 - x0);
                return y0 + (y1 - y0) * t;
            }
        }
        self.points[self.points.len() - 1].1
    }
}

impl Default for Curve {
    /// A ramp starting at 10 % so an agent leaving idle always moves.
    fn default() -> Self {
        Self::ramp(0.1)
    }
}

impl TryFrom<Vec<(f32, f32)>> for Curve {
    type Error = CoreError;

    fn try_from(points: Vec<(f32, f32)>) -> CoreResult<Self> {
        Curve::new(points)
    }
}

impl From<Curve> for Vec<(f32, f32)> {
    fn from(curve: Curve) -> Self {
        curve.points
    }
}
