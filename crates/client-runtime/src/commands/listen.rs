//! `oemctl listen`: chaincode (and optionally block) events from the
//! target peer, one line per event, until interrupted or `--count` is hit.

use super::Session;
use crate::cli::ListenArgs;
use fc_03_event_hub::{ChannelEvent, ConnectOptions, EventHubError, RegistrationStream};
use fc_04_gateway::GatewayError;
use tokio_stream::{StreamExt, StreamMap};
use tracing::{debug, info};

const BLOCKS: &str = "<blocks>";

/// One printable line for `event`, or `None` for events not worth printing.
#[must_use]
pub fn format_event(event: &ChannelEvent) -> Option<String> {
    match event {
        ChannelEvent::Chaincode {
            block_number,
            event,
            ..
        } => Some(format!(
            "block {block_number} {} tx {} {}",
            event.event_name,
            event.tx_id.short(),
            event.payload_lossy()
        )),
        ChannelEvent::BlockCommitted { block, .. } => Some(format!(
            "block {} committed: {} transaction(s), {} valid",
            block.number,
            block.transactions.len(),
            block.valid_count()
        )),
        ChannelEvent::TransactionCommitted { .. } | ChannelEvent::Disconnected { .. } => None,
    }
}

/// Register, connect, and pass every printed line to `sink`.
pub async fn run<F>(session: &Session, args: &ListenArgs, mut sink: F) -> anyhow::Result<()>
where
    F: FnMut(String),
{
    let hub = session.event_hub()?;
    let chaincode = session.chaincode_id();

    let mut streams: StreamMap<String, RegistrationStream> = StreamMap::new();
    for name in &args.events {
        let registration = hub.register_chaincode_event(&chaincode, name);
        streams.insert(name.clone(), registration.stream.into_stream());
    }
    if args.blocks {
        streams.insert(BLOCKS.to_string(), hub.register_block_event().stream.into_stream());
    }
    if streams.is_empty() {
        anyhow::bail!("nothing to listen for: give --event or --blocks");
    }

    let options = ConnectOptions {
        full_block: session.config().event_hub.full_block,
        start_block: args.from_block.or(session.config().event_hub.start_block),
    };
    hub.connect(options).await.map_err(GatewayError::from)?;
    info!(
        peer = %hub.peer(),
        chaincode = %chaincode,
        registrations = streams.len(),
        start_block = ?options.start_block,
        "Listening"
    );

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut printed = 0usize;
    let result = loop {
        if args.count.is_some_and(|count| printed >= count) {
            break Ok(());
        }
        tokio::select! {
            item = streams.next() => match item {
                Some((_, Ok(event))) => {
                    if let Some(line) = format_event(&event) {
                        sink(line);
                        printed += 1;
                    }
                }
                Some((name, Err(EventHubError::SubscriptionClosed))) => {
                    debug!(registration = %name, "Registration closed");
                }
                Some((_, Err(e))) => break Err(GatewayError::from(e).into()),
                None => break Ok(()),
            },
            _ = &mut ctrl_c => {
                info!("Interrupted");
                break Ok(());
            }
        }
    };

    hub.disconnect().await;
    info!(events = printed, "Stopped listening");
    result
}
