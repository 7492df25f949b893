//! Sensing-subsystem error type.

use thiserror::Error;

/// Errors produced by `sk-sense`.
#[derive(Debug, Error)]
pub enum SenseError {
    #[error("degenerate wall: endpoints coincide at ({x}, {y})")]
    DegenerateWall { x: f32, y: f32 },

    #[error("obstacle radius must be positive, got {0}")]
    InvalidRadius(f32),

    #[error("non-finite obstacle coordinates")]
    NonFinite,
}

pub type SenseResult<T> = Result<T, SenseError>;
