//! Error types for the development network.

use thiserror::Error;

/// A chaincode invocation failed. The message becomes the peer's failed
/// proposal response, exactly as the chaincode phrased it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChaincodeError {
    #[error("Function {function} not found in contract {chaincode}")]
    UnknownFunction { chaincode: String, function: String },

    #[error("Incorrect number of params. Expected {expected}, received {received}")]
    ArgumentCount { expected: usize, received: usize },

    #[error("Error managing parameter param{position}. {reason}")]
    InvalidArgument { position: usize, reason: String },

    #[error("{0}")]
    Failed(String),
}

impl ChaincodeError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// Building or operating the network failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DevnetError {
    #[error("Peer {0} is defined twice")]
    DuplicatePeer(String),

    #[error("Network has no peers")]
    NoPeers,

    /// A profile peer belongs to no organization, so it has no MSP id.
    #[error("Peer {peer} belongs to no organization in the profile")]
    UnknownOrganization { peer: String },

    #[error("Block encoding failed: {0}")]
    Encoding(#[from] shared_types::EncodingError),
}
