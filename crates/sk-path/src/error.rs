//! Pathfinding error type.

use thiserror::Error;

use sk_core::{NodeId, Vec2};

/// Errors produced by `sk-path`.
#[derive(Debug, Error)]
pub enum PathError {
    #[error("no path from {from} to {to}")]
    NoPath { from: NodeId, to: NodeId },

    #[error("node {0} not found in graph")]
    NodeNotFound(NodeId),

    #[error("navigation graph has no node near ({}, {})", .0.x, .0.y)]
    Unreachable(Vec2),

    #[error("invalid tile grid: {0}")]
    InvalidGrid(String),
}

pub type PathResult<T> = Result<T, PathError>;
