//! Error types for event delivery.

use shared_types::PeerName;
use thiserror::Error;

/// Failure of a peer's deliver service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeliverError {
    #[error("Deliver service of {peer} unavailable: {reason}")]
    Unavailable { peer: PeerName, reason: String },

    /// Requested start block is beyond the peer's ledger height.
    #[error("Block {requested} not available on {peer} (height {height})")]
    BlockNotFound {
        peer: PeerName,
        requested: u64,
        height: u64,
    },

    #[error("Deliver protocol error from {peer}: {reason}")]
    Protocol { peer: PeerName, reason: String },
}

/// Errors surfaced to hub users and subscribers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EventHubError {
    #[error("Cannot connect event hub: {0}")]
    Connect(#[from] DeliverError),

    /// The hub stopped delivering; the subscription is finished.
    #[error("Event hub for {peer} disconnected: {reason}")]
    Disconnected { peer: PeerName, reason: String },

    /// The subscription was unregistered or has already finished.
    #[error("Subscription closed")]
    SubscriptionClosed,
}
