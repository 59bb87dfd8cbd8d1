//! Error types for profile loading, wallets and client bootstrap.

use shared_types::IdentityError;
use thiserror::Error;

/// Connection or client profile could not be used.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("Cannot read profile {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Cannot parse profile {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("Unsupported profile format for {path}: expected .yaml, .yml or .json")]
    UnsupportedFormat { path: String },

    #[error("Peer {peer} referenced by {referenced_by} is not defined")]
    UndefinedPeer { peer: String, referenced_by: String },

    #[error("Orderer {orderer} referenced by {referenced_by} is not defined")]
    UndefinedOrderer {
        orderer: String,
        referenced_by: String,
    },

    #[error("Client organization {0} is not defined")]
    UndefinedOrganization(String),
}

/// Wallet storage errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WalletError {
    #[error("Wallet I/O error at {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Malformed identity file {path}: {reason}")]
    Malformed { path: String, reason: String },

    #[error("Identity label {0:?} is not a valid file name")]
    InvalidLabel(String),
}

/// Process exit codes for setup failures.
pub mod exit_codes {
    pub const CONFIGURATION: i32 = 2;
    pub const IDENTITY_MISSING: i32 = 3;
    pub const CHANNEL_UNREACHABLE: i32 = 4;
}

/// Setup-time failures: nothing has been sent to the network yet.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BootstrapError {
    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error(transparent)]
    Wallet(#[from] WalletError),

    /// The profile names no client organization and no MSP id was given.
    #[error("Profile does not name a client organization")]
    NoClientOrganization,

    #[error("Identity {label} not found in wallet {wallet}")]
    IdentityNotFound { label: String, wallet: String },

    #[error("Identity {label} is unusable: {source}")]
    InvalidIdentity {
        label: String,
        #[source]
        source: IdentityError,
    },

    #[error("Channel {channel} is not defined in the connection profile")]
    ChannelNotFound { channel: String },

    #[error("Channel {channel} has no reachable peers")]
    ChannelHasNoPeers { channel: String },

    #[error("Peer {peer} is not part of channel {channel}")]
    PeerNotFound { channel: String, peer: String },
}

impl BootstrapError {
    /// Non-zero process exit code for this failure.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Profile(_) | Self::Wallet(_) | Self::NoClientOrganization => {
                exit_codes::CONFIGURATION
            }
            Self::IdentityNotFound { .. } | Self::InvalidIdentity { .. } => {
                exit_codes::IDENTITY_MISSING
            }
            Self::ChannelNotFound { .. }
            | Self::ChannelHasNoPeers { .. }
            | Self::PeerNotFound { .. } => exit_codes::CHANNEL_UNREACHABLE,
        }
    }
}
