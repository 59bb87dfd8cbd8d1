//! Process exit codes.
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | success |
//! | 1 | anything unclassified |
//! | 2 | configuration error |
//! | 3 | identity missing from the wallet |
//! | 4 | channel, peer or event source unreachable |
//! | 5 | endorsement failure, nothing was ordered |
//! | 6 | submission failure, at or after ordering |

use crate::config::ConfigError;
use fc_01_identity::{exit_codes, BootstrapError, ProfileError, WalletError};
use fc_02_submission::SubmitError;
use fc_03_event_hub::EventHubError;
use fc_04_gateway::GatewayError;
use fc_devnet::DevnetError;
use fc_rpc_client::RpcError;

pub const SUCCESS: i32 = 0;
pub const UNCLASSIFIED: i32 = 1;

/// Exit code for the first classified error in the chain.
pub fn exit_code(error: &anyhow::Error) -> i32 {
    for cause in error.chain() {
        if let Some(e) = cause.downcast_ref::<GatewayError>() {
            return e.exit_code();
        }
        if let Some(e) = cause.downcast_ref::<BootstrapError>() {
            return e.exit_code();
        }
        if let Some(e) = cause.downcast_ref::<SubmitError>() {
            return e.kind().exit_code();
        }
        if cause.downcast_ref::<EventHubError>().is_some() {
            return exit_codes::CHANNEL_UNREACHABLE;
        }
        if let Some(e) = cause.downcast_ref::<RpcError>() {
            return if e.is_connection_failure() {
                exit_codes::CHANNEL_UNREACHABLE
            } else {
                exit_codes::CONFIGURATION
            };
        }
        if cause.is::<ConfigError>()
            || cause.is::<DevnetError>()
            || cause.is::<ProfileError>()
            || cause.is::<WalletError>()
        {
            return exit_codes::CONFIGURATION;
        }
    }
    UNCLASSIFIED
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_missing_identity_is_3_through_context() {
        let err: anyhow::Result<()> = Err(BootstrapError::IdentityNotFound {
            label: "Admin".into(),
            wallet: "./user-wallet".into(),
        })
        .context("bootstrapping client");
        assert_eq!(exit_code(&err.unwrap_err()), 3);
    }

    #[test]
    fn test_unknown_channel_is_4() {
        let err = anyhow::Error::new(BootstrapError::ChannelNotFound {
            channel: "nope".into(),
        });
        assert_eq!(exit_code(&err), 4);
    }

    #[test]
    fn test_submit_kinds() {
        assert_eq!(exit_code(&anyhow::Error::new(SubmitError::NoTargets)), 5);
        assert_eq!(
            exit_code(&anyhow::Error::new(SubmitError::NoCommitNotifier)),
            6
        );
    }

    #[test]
    fn test_config_and_unclassified() {
        assert_eq!(
            exit_code(&anyhow::Error::new(ConfigError::Invalid("x".into()))),
            2
        );
        assert_eq!(exit_code(&anyhow::anyhow!("something else")), UNCLASSIFIED);
    }
}
