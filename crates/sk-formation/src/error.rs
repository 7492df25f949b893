//! Formation-subsystem error type.

use thiserror::Error;

use sk_core::Vec2;

/// Errors produced by `sk-formation`.
#[derive(Debug, Error)]
pub enum FormationError {
    #[error("invalid formation layout: {0}")]
    InvalidLayout(String),

    /// A member's spawn spot overlaps an obstacle.  Nothing was spawned.
    #[error("slot {slot} is blocked at ({}, {})", position.x, position.y)]
    SlotBlocked { slot: usize, position: Vec2 },

    #[error("usher agent is not alive")]
    MissingUsher,

    #[error("spawn failed: {0}")]
    Spawn(String),
}

pub type FormationResult<T> = Result<T, FormationError>;
