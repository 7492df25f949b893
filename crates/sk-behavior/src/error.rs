use thiserror::Error;

use sk_path::PathError;

#[derive(Debug, Error)]
pub enum BehaviorError {
    /// The behavior exists for configuration completeness but cannot steer.
    #[error("{behavior} steering is not supported: {reason}")]
    Unsupported { behavior: &'static str, reason: &'static str },

    /// Planning failed with no earlier path to fall back on.
    #[error("path planning failed: {0}")]
    Path(#[from] PathError),
}

pub type BehaviorResult<T> = Result<T, BehaviorError>;
