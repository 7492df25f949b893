//! Workspace base error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant where they surface core validation failures.

use thiserror::Error;

use crate::AgentId;

/// The top-level error type for `sk-core`.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("curve error: {0}")]
    Curve(String),
}

/// Shorthand result type for `sk-core`.
pub type CoreResult<T> = Result<T, CoreError>;
