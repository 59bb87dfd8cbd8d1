//! # Network
//!
//! A channel seen through a gateway: the endorsers picked for it, a
//! submitter bound to the client identity, and at most one event hub shared
//! by commit waits and contract listeners.

use crate::application::contract::Contract;
use crate::domain::errors::GatewayError;
use crate::domain::options::{CommitStrategy, DiscoveryOptions};
use crate::ports::outbound::NetworkTransport;
use fc_01_identity::ChannelContext;
use fc_02_submission::{EndorsementPolicy, SubmissionConfig, TransactionSubmitter};
use fc_03_event_hub::{ChannelEventHub, CommitTracker, ConnectOptions};
use shared_types::{ChaincodeId, ChannelId, PeerName};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

struct NetworkInner {
    channel: ChannelContext,
    transport: Arc<dyn NetworkTransport>,
    submitter: TransactionSubmitter,
    targets: Vec<PeerName>,
    event_hub: OnceCell<Arc<ChannelEventHub>>,
}

#[derive(Clone)]
pub struct Network {
    inner: Arc<NetworkInner>,
}

/// Endorsers for a channel. Without discovery every endorsing peer; with it,
/// only as many as `policy` needs, the client's own organization first.
pub(crate) fn select_targets(
    channel: &ChannelContext,
    discovery: DiscoveryOptions,
    policy: &EndorsementPolicy,
) -> Vec<PeerName> {
    let all = channel.endorsing_peers();
    if !discovery.enabled {
        return all;
    }
    let mut ordered = channel.local_endorsing_peers();
    let rest: Vec<_> = all.into_iter().filter(|p| !ordered.contains(p)).collect();
    ordered.extend(rest);
    let needed = policy.required(ordered.len());
    ordered.truncate(needed);
    ordered
}

/// Hub on the first event-source peer the transport can reach.
fn open_hub(
    channel: &ChannelContext,
    transport: &dyn NetworkTransport,
) -> Result<Arc<ChannelEventHub>, GatewayError> {
    let source = channel
        .event_sources()
        .iter()
        .find_map(|peer| transport.event_source(peer))
        .ok_or_else(|| GatewayError::NoEventSource {
            channel: channel.name().to_string(),
        })?;
    Ok(Arc::new(ChannelEventHub::new(source)))
}

impl Network {
    pub(crate) async fn open(
        channel: ChannelContext,
        transport: Arc<dyn NetworkTransport>,
        discovery: DiscoveryOptions,
        strategy: CommitStrategy,
        submission: SubmissionConfig,
    ) -> Result<Self, GatewayError> {
        let targets = select_targets(&channel, discovery, &submission.policy);
        if targets.is_empty() {
            return Err(GatewayError::NoEndorsers {
                channel: channel.name().to_string(),
            });
        }

        let submission = SubmissionConfig {
            wait_for_commit: strategy != CommitStrategy::None,
            commit_timeout_ms: strategy
                .timeout()
                .map_or(submission.commit_timeout_ms, |t| t.as_millis() as u64),
            ..submission
        };
        let mut submitter =
            TransactionSubmitter::from_channel(&channel, transport.endorser(), transport.orderer())
                .with_config(submission);

        let event_hub = OnceCell::new();
        if let CommitStrategy::AnyPeer { .. } = strategy {
            let hub = open_hub(&channel, transport.as_ref())?;
            let tracker = CommitTracker::attach(Arc::clone(&hub));
            hub.connect(ConnectOptions::default()).await?;
            submitter = submitter.with_commit_notifier(tracker);
            debug!(channel = %channel.name(), peer = %hub.peer(), "Commit listener connected");
            let _ = event_hub.set(hub);
        }

        info!(
            channel = %channel.name(),
            endorsers = targets.len(),
            commit_strategy = ?strategy,
            "Network opened"
        );

        Ok(Self {
            inner: Arc::new(NetworkInner {
                channel,
                transport,
                submitter,
                targets,
                event_hub,
            }),
        })
    }

    #[must_use]
    pub fn name(&self) -> &ChannelId {
        self.inner.channel.name()
    }

    #[must_use]
    pub fn channel(&self) -> &ChannelContext {
        &self.inner.channel
    }

    #[must_use]
    pub fn submitter(&self) -> &TransactionSubmitter {
        &self.inner.submitter
    }

    /// Peers every submission is proposed to.
    #[must_use]
    pub fn endorsement_targets(&self) -> &[PeerName] {
        &self.inner.targets
    }

    /// Peer for queries: the first with the chaincode-query role, else the
    /// first endorser.
    #[must_use]
    pub fn query_targets(&self) -> Vec<PeerName> {
        match self.inner.channel.query_peer() {
            Some(peer) => vec![peer.name.clone()],
            None => self.inner.targets.clone(),
        }
    }

    #[must_use]
    pub fn contract(&self, chaincode_id: &str) -> Contract {
        Contract::new(self.clone(), ChaincodeId::new(chaincode_id))
    }

    /// The channel's event hub, connecting it on first use.
    pub async fn event_hub(&self) -> Result<Arc<ChannelEventHub>, GatewayError> {
        let hub = self
            .inner
            .event_hub
            .get_or_try_init(|| async {
                let hub = open_hub(&self.inner.channel, self.inner.transport.as_ref())?;
                hub.connect(ConnectOptions::default()).await?;
                Ok::<_, GatewayError>(hub)
            })
            .await?;
        Ok(Arc::clone(hub))
    }

    /// Disconnect the event hub, if one was opened.
    pub async fn close(&self) {
        if let Some(hub) = self.inner.event_hub.get() {
            hub.disconnect().await;
        }
    }
}
