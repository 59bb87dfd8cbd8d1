//! Outbound Ports (Driven Ports / SPI)

use crate::domain::errors::DeliverError;
use async_trait::async_trait;
use shared_types::{Block, PeerName};
use std::pin::Pin;
use tokio_stream::Stream;

/// Committed blocks in ascending order. An `Err` item ends delivery.
pub type BlockStream = Pin<Box<dyn Stream<Item = Result<Block, DeliverError>> + Send>>;

/// A peer's deliver service.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Peer this source delivers for.
    fn peer(&self) -> &PeerName;

    /// Open a block stream. `None` starts after the current ledger height.
    async fn deliver(&self, start_block: Option<u64>) -> Result<BlockStream, DeliverError>;
}
