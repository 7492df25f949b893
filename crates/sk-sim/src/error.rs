use sk_behavior::BehaviorError;
use sk_core::AgentId;
use sk_formation::FormationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    /// Strict validation found problems in one or more behavior trees.
    #[error("{count} behavior configuration issue(s), first: {first}")]
    InvalidConfiguration { count: usize, first: String },

    #[error("behavior of agent {agent} failed: {source}")]
    Behavior {
        agent:  AgentId,
        #[source]
        source: BehaviorError,
    },

    #[error("formation error: {0}")]
    Formation(#[from] FormationError),

    #[error("no formation with handle {0}")]
    UnknownFormation(usize),
}

pub type SimResult<T> = Result<T, SimError>;
