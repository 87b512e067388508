use nacre_core::NacreError;
use thiserror::Error;

/// Trust engine error types.
#[derive(Debug, Error)]
pub enum TrustError {
    /// No peer could be selected: the node set was empty or no eligible
    /// node retained any trust mass. Recoverable at the caller's level
    /// (back off, or fall back to pre-trusted nodes).
    #[error("no eligible peers available for selection")]
    NoEligiblePeers,

    /// Feedback credibility could not be computed for a peer this round.
    /// The peer is skipped; the round continues for all other peers.
    #[error("credibility computation failed for peer {peer}: {reason}")]
    Credibility { peer: String, reason: String },
}

impl From<TrustError> for NacreError {
    fn from(e: TrustError) -> Self {
        NacreError::Trust(e.to_string())
    }
}
