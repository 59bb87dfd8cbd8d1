//! Builds the `NetworkTransport` selected by `network` in the configuration.

use crate::config::{NetworkMode, RuntimeConfig};
use anyhow::Context;
use fc_01_identity::ConnectionProfile;
use fc_04_gateway::NetworkTransport;
use fc_devnet::{DevNetwork, DevTransport};
use fc_rpc_client::RpcTransport;
use std::sync::Arc;
use tracing::info;

pub fn connect(
    config: &RuntimeConfig,
    profile: &ConnectionProfile,
) -> anyhow::Result<Arc<dyn NetworkTransport>> {
    match config.network {
        NetworkMode::Rpc => {
            let transport = RpcTransport::from_profile(profile, &config.channel, config.rpc.clone())
                .with_context(|| format!("configuring RPC transport for {}", config.channel))?;
            info!(channel = %config.channel, "Using remote network");
            Ok(Arc::new(transport))
        }
        NetworkMode::Devnet => {
            let network = DevNetwork::from_profile(profile, config.devnet.clone())
                .context("starting development network")?;
            info!(
                peers = network.peers().count(),
                "Using in-process development network"
            );
            Ok(Arc::new(DevTransport(network)))
        }
    }
}
