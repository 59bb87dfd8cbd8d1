//! # Polling Event Source
//!
//! A deliver stream built from `peer_blocksFrom` polls. One task per open
//! stream; the task ends when the stream is dropped or the peer fails.

use crate::application::client::RpcClient;
use crate::config::RpcConfig;
use crate::domain::errors::RpcError;
use crate::domain::jsonrpc::methods;
use async_trait::async_trait;
use fc_03_event_hub::{BlockStream, DeliverError, EventSource};
use reqwest::Url;
use shared_types::{Block, PeerName};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

pub struct RpcEventSource {
    client: Arc<RpcClient>,
    peer: PeerName,
    endpoint: Url,
    poll_interval: Duration,
    batch: usize,
}

impl RpcEventSource {
    pub fn new(client: Arc<RpcClient>, peer: PeerName, endpoint: Url, config: &RpcConfig) -> Self {
        Self {
            client,
            peer,
            endpoint,
            poll_interval: config.poll_interval(),
            batch: config.max_blocks_per_poll.max(1),
        }
    }

    fn unavailable(&self, error: RpcError) -> DeliverError {
        DeliverError::Unavailable {
            peer: self.peer.clone(),
            reason: error.to_string(),
        }
    }
}

/// Check that a polled batch continues at `next` without gaps.
fn check_sequence(peer: &PeerName, next: u64, blocks: &[Block]) -> Result<(), DeliverError> {
    for (offset, block) in (0u64..).zip(blocks) {
        if block.number != next + offset {
            return Err(DeliverError::Protocol {
                peer: peer.clone(),
                reason: format!("expected block {}, got {}", next + offset, block.number),
            });
        }
    }
    Ok(())
}

#[async_trait]
impl EventSource for RpcEventSource {
    fn peer(&self) -> &PeerName {
        &self.peer
    }

    async fn deliver(&self, start_block: Option<u64>) -> Result<BlockStream, DeliverError> {
        let height: u64 = self
            .client
            .call(&self.endpoint, methods::BLOCK_HEIGHT, [(); 0])
            .await
            .map_err(|e| self.unavailable(e))?;
        let start = match start_block {
            None => height,
            Some(requested) if requested > height => {
                return Err(DeliverError::BlockNotFound {
                    peer: self.peer.clone(),
                    requested,
                    height,
                })
            }
            Some(requested) => requested,
        };

        let (tx, rx) = mpsc::channel(self.batch);
        let client = Arc::clone(&self.client);
        let peer = self.peer.clone();
        let endpoint = self.endpoint.clone();
        let poll_interval = self.poll_interval;
        let batch = self.batch;
        debug!(%peer, start, "Polling deliver stream opened");

        tokio::spawn(async move {
            let mut next = start;
            loop {
                let polled: Result<Vec<Block>, RpcError> = client
                    .call(&endpoint, methods::BLOCKS_FROM, (next, batch))
                    .await;
                let blocks = match polled {
                    Ok(blocks) => blocks,
                    Err(e) => {
                        warn!(%peer, error = %e, "Deliver poll failed");
                        let _ = tx
                            .send(Err(DeliverError::Unavailable {
                                peer: peer.clone(),
                                reason: e.to_string(),
                            }))
                            .await;
                        return;
                    }
                };
                if let Err(e) = check_sequence(&peer, next, &blocks) {
                    let _ = tx.send(Err(e)).await;
                    return;
                }

                let fetched = blocks.len();
                for block in blocks {
                    next = block.number + 1;
                    if tx.send(Ok(block)).await.is_err() {
                        return;
                    }
                }
                if fetched < batch {
                    tokio::time::sleep(poll_interval).await;
                }
                if tx.is_closed() {
                    return;
                }
            }
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(number: u64) -> Block {
        Block::new(number, [0u8; 32], Vec::new()).unwrap()
    }

    #[test]
    fn test_sequence_accepts_contiguous_batch() {
        let peer = PeerName::new("peer0");
        assert!(check_sequence(&peer, 4, &[block(4), block(5)]).is_ok());
        assert!(check_sequence(&peer, 4, &[]).is_ok());
    }

    #[test]
    fn test_sequence_rejects_gap() {
        let peer = PeerName::new("peer0");
        let err = check_sequence(&peer, 4, &[block(4), block(6)]).unwrap_err();
        assert!(matches!(err, DeliverError::Protocol { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_peer_cannot_deliver() {
        let source = RpcEventSource::new(
            Arc::new(RpcClient::new(&RpcConfig::for_testing()).unwrap()),
            PeerName::new("down"),
            Url::parse("http://127.0.0.1:1").unwrap(),
            &RpcConfig::for_testing(),
        );
        let err = source.deliver(None).await.err().unwrap();
        assert!(matches!(err, DeliverError::Unavailable { .. }));
    }
}
