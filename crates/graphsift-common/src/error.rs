use thiserror::Error;

/// Result alias used throughout the graph model and auxiliary structures.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Errors raised by the graph model, configuration and internal structures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("node '{0}' is already in the graph")]
    DuplicateNode(String),

    #[error("node '{0}' is not in the graph")]
    UnknownNode(String),

    #[error("invalid argument '{name}': {message}")]
    InvalidArgument { name: String, message: String },

    #[error("progress must be within [0, 1], got {0}")]
    InvalidProgress(f64),

    #[error("analysis cancelled")]
    Cancelled,

    /// Internal bookkeeping diverged. Always a bug, never bad input.
    #[error("invariant violated: {0}")]
    InvariantViolated(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl GraphError {
    pub fn invariant(message: impl Into<String>) -> Self {
        GraphError::InvariantViolated(message.into())
    }

    pub fn invalid_argument(name: impl Into<String>, message: impl Into<String>) -> Self {
        GraphError::InvalidArgument {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl From<config::ConfigError> for GraphError {
    fn from(err: config::ConfigError) -> Self {
        GraphError::Config(err.to_string())
    }
}
