//! # Commands
//!
//! Every networked command runs against a [`Session`]: the bootstrapped
//! client, the channel it acts on, the target peer and the transport.
//!
//! ```text
//! RuntimeConfig ──bootstrap──→ ClientContext ──channel()──→ ChannelContext
//!        │                                                       │
//!        └──network──→ NetworkTransport ──────────────→ Session ─┘
//! ```

pub mod demo;
pub mod gateway;
pub mod identity;
pub mod invoke;
pub mod listen;
pub mod query;

use crate::cli::Command;
use crate::config::RuntimeConfig;
use crate::transport;
use anyhow::Context;
use fc_01_identity::{ChannelContext, ClientContext};
use fc_02_submission::{CommitWait, SubmitOutcome, TransactionSubmitter};
use fc_03_event_hub::{ChannelEventHub, CommitTracker, ConnectOptions};
use fc_04_gateway::{GatewayError, NetworkTransport};
use shared_types::{ChaincodeId, ChaincodeInvocation, PeerName};
use std::sync::Arc;
use tracing::debug;

pub struct Session {
    config: RuntimeConfig,
    client: ClientContext,
    channel: ChannelContext,
    transport: Arc<dyn NetworkTransport>,
}

impl Session {
    /// Bootstrap from the configured profile and wallet, then connect.
    pub async fn open(config: RuntimeConfig) -> anyhow::Result<Self> {
        let client = ClientContext::from_config(&config.bootstrap)
            .await
            .with_context(|| {
                format!(
                    "bootstrapping {} from {}",
                    config.bootstrap.identity,
                    config.bootstrap.connection_profile.display()
                )
            })?;
        let transport = transport::connect(&config, client.profile())?;
        Self::new(config, client, transport)
    }

    /// Session over an already bootstrapped client.
    pub fn new(
        config: RuntimeConfig,
        client: ClientContext,
        transport: Arc<dyn NetworkTransport>,
    ) -> anyhow::Result<Self> {
        let channel = client.channel(&config.channel)?;
        channel.peer(&config.peer)?;
        Ok(Self {
            config,
            client,
            channel,
            transport,
        })
    }

    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    #[must_use]
    pub fn client(&self) -> &ClientContext {
        &self.client
    }

    #[must_use]
    pub fn channel(&self) -> &ChannelContext {
        &self.channel
    }

    #[must_use]
    pub fn transport(&self) -> &Arc<dyn NetworkTransport> {
        &self.transport
    }

    /// The peer every proposal and subscription goes to.
    #[must_use]
    pub fn target(&self) -> PeerName {
        PeerName::new(self.config.peer.clone())
    }

    #[must_use]
    pub fn chaincode_id(&self) -> ChaincodeId {
        ChaincodeId::new(self.config.chaincode.clone())
    }

    #[must_use]
    pub fn invocation(&self, function: &str, args: &[String]) -> ChaincodeInvocation {
        ChaincodeInvocation::new(self.chaincode_id(), function).string_args(args)
    }

    /// Commit behaviour for one command: `--wait` forces a wait, otherwise
    /// the configured default applies.
    #[must_use]
    pub fn commit_wait(&self, wait: bool) -> CommitWait {
        if wait {
            CommitWait::Wait {
                timeout: self.config.submission.commit_timeout(),
            }
        } else {
            self.config.submission.commit_wait()
        }
    }

    /// Event hub on the target peer. Not connected yet.
    pub fn event_hub(&self) -> Result<Arc<ChannelEventHub>, GatewayError> {
        let source = self
            .transport
            .event_source(&self.target())
            .ok_or_else(|| GatewayError::NoEventSource {
                channel: self.channel.name().to_string(),
            })?;
        Ok(Arc::new(ChannelEventHub::with_config(
            source,
            self.config.event_hub.clone(),
        )))
    }

    /// Submitter for this channel. When `commit` waits, a commit tracker on
    /// the target peer's event hub is attached and connected first.
    pub async fn submitter(&self, commit: CommitWait) -> anyhow::Result<TransactionSubmitter> {
        let submitter = TransactionSubmitter::from_channel(
            &self.channel,
            self.transport.endorser(),
            self.transport.orderer(),
        )
        .with_config(self.config.submission.clone());

        if commit == CommitWait::Skip {
            return Ok(submitter);
        }

        let hub = self.event_hub()?;
        let tracker = CommitTracker::attach(Arc::clone(&hub));
        hub.connect(ConnectOptions::default())
            .await
            .map_err(GatewayError::from)?;
        debug!(peer = %hub.peer(), "Commit tracker connected");
        Ok(submitter.with_commit_notifier(tracker))
    }
}

/// Human readable summary of an ordered transaction.
pub fn describe_outcome(outcome: &SubmitOutcome) -> String {
    let mut text = format!(
        "Transaction {} ordered ({} endorsement{})",
        outcome.tx_id,
        outcome.endorsements,
        if outcome.endorsements == 1 { "" } else { "s" }
    );
    if let Some(commit) = &outcome.commit {
        text.push_str(&format!(
            ", committed in block {} as {}",
            commit.block_number,
            commit.validation_code.as_str()
        ));
    }
    if !outcome.result.is_empty() {
        text.push_str(&format!("\n{}", String::from_utf8_lossy(&outcome.result)));
    }
    text
}

/// Run one parsed command.
pub async fn run(command: Command, config: RuntimeConfig) -> anyhow::Result<()> {
    match command {
        Command::Identity(cmd) => identity::run(cmd, &config).await,
        Command::Demo(args) => demo::run(args, config).await,
        Command::Gateway(cmd) => gateway::run(cmd, &config).await,
        Command::Invoke(cmd) => {
            let session = Session::open(config).await?;
            let outcome = invoke::run(&session, cmd).await?;
            println!("{}", describe_outcome(&outcome));
            Ok(())
        }
        Command::Query(args) => {
            let session = Session::open(config).await?;
            let payload = query::run(&session, &args).await?;
            println!("{}", String::from_utf8_lossy(&payload));
            Ok(())
        }
        Command::Listen(args) => {
            let session = Session::open(config).await?;
            listen::run(&session, &args, |line| println!("{line}")).await
        }
    }
}
