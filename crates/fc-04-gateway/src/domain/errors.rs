//! Gateway errors. Each wraps the layer that failed, so callers can still
//! tell bootstrap, endorsement and submission failures apart.

use fc_01_identity::{exit_codes, BootstrapError};
use fc_02_submission::SubmitError;
use fc_03_event_hub::EventHubError;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),

    #[error(transparent)]
    Submit(#[from] SubmitError),

    #[error(transparent)]
    EventHub(#[from] EventHubError),

    /// The transport cannot serve events for any event-source peer.
    #[error("No event source available on channel {channel}")]
    NoEventSource { channel: String },

    /// No peer on the channel may endorse.
    #[error("No endorsing peers on channel {channel}")]
    NoEndorsers { channel: String },

    /// A gateway transaction is single use.
    #[error("Transaction {name} was already submitted as {tx_id}")]
    AlreadySubmitted { name: String, tx_id: String },
}

impl GatewayError {
    /// Process exit code for this failure.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Bootstrap(e) => e.exit_code(),
            Self::Submit(e) => e.kind().exit_code(),
            Self::EventHub(_) | Self::NoEventSource { .. } => exit_codes::CHANNEL_UNREACHABLE,
            Self::NoEndorsers { .. } => exit_codes::CONFIGURATION,
            Self::AlreadySubmitted { .. } => fc_02_submission::FailureKind::Submission.exit_code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_follow_wrapped_error() {
        let missing = GatewayError::Bootstrap(BootstrapError::IdentityNotFound {
            label: "Admin".into(),
            wallet: "<memory>".into(),
        });
        assert_eq!(missing.exit_code(), exit_codes::IDENTITY_MISSING);
        assert_eq!(GatewayError::Submit(SubmitError::NoTargets).exit_code(), 5);
        assert_eq!(
            GatewayError::NoEventSource {
                channel: "oem-channel".into()
            }
            .exit_code(),
            exit_codes::CHANNEL_UNREACHABLE
        );
    }
}
