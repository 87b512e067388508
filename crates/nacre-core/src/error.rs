use thiserror::Error;

/// Protocol-wide error types for the Nacre Protocol.
#[derive(Debug, Error)]
pub enum NacreError {
    /// Trust engine error (scoring, selection, convergence).
    #[error("Trust error: {0}")]
    Trust(String),

    /// Network error (peer transport, gossip, discovery).
    #[error("Network error: {0}")]
    Network(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid state transition.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<serde_json::Error> for NacreError {
    fn from(e: serde_json::Error) -> Self {
        NacreError::Serialization(e.to_string())
    }
}
