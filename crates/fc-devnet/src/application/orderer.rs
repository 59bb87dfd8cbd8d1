//! # Development Ordering Service
//!
//! Accepts envelopes and cuts one block per envelope. The ack means the
//! envelope was queued; validity is decided at commit and only visible
//! through the deliver streams.

use crate::domain::ledger::{Ledger, PendingTransaction};
use async_trait::async_trait;
use fc_02_submission::{BroadcastAck, BroadcastStatus, OrderingService, TransportError};
use shared_types::{Creator, TransactionEnvelope};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Default)]
pub struct OrdererStats {
    pub blocks_cut: AtomicU64,
    /// Envelopes refused before ordering.
    pub rejected: AtomicU64,
}

pub struct DevOrderer {
    ledger: Arc<Ledger>,
    min_endorsements: usize,
    stats: OrdererStats,
}

impl DevOrderer {
    /// `min_endorsements` distinct valid endorsers make a transaction valid.
    pub fn new(ledger: Arc<Ledger>, min_endorsements: usize) -> Self {
        Self {
            ledger,
            min_endorsements: min_endorsements.max(1),
            stats: OrdererStats::default(),
        }
    }

    #[must_use]
    pub fn min_endorsements(&self) -> usize {
        self.min_endorsements
    }

    #[must_use]
    pub fn stats(&self) -> &OrdererStats {
        &self.stats
    }

    /// Endorsements with a valid signature, one per endorser identity.
    fn valid_endorsers(envelope: &TransactionEnvelope) -> usize {
        let mut endorsers: Vec<&Creator> = Vec::new();
        for response in envelope.responses() {
            if response.verify().is_ok() && !endorsers.contains(&&response.endorsement.endorser) {
                endorsers.push(&response.endorsement.endorser);
            }
        }
        endorsers.len()
    }

    fn reject(&self, status: BroadcastStatus, info: String) -> BroadcastAck {
        self.stats.rejected.fetch_add(1, Ordering::Relaxed);
        warn!(status = status.as_str(), %info, "Envelope rejected");
        BroadcastAck::rejected(status, info)
    }
}

#[async_trait]
impl OrderingService for DevOrderer {
    async fn broadcast(&self, envelope: &TransactionEnvelope) -> Result<BroadcastAck, TransportError> {
        if let Err(e) = envelope.verify() {
            return Ok(self.reject(BroadcastStatus::BadRequest, e.to_string()));
        }

        let endorsers = Self::valid_endorsers(envelope);
        let pending = PendingTransaction {
            tx_id: envelope.tx_id().clone(),
            results: envelope.payload().results.clone(),
            event: envelope.payload().event.clone(),
            policy_satisfied: endorsers >= self.min_endorsements,
        };

        let block = match self.ledger.commit(pending) {
            Ok(block) => block,
            Err(e) => return Ok(self.reject(BroadcastStatus::ServiceUnavailable, e.to_string())),
        };
        self.stats.blocks_cut.fetch_add(1, Ordering::Relaxed);

        debug!(
            tx_id = %envelope.tx_id().short(),
            endorsers,
            writes = envelope.payload().results.writes.len(),
            "Envelope ordered"
        );
        info!(
            block = block.number,
            valid = block.valid_count(),
            "Block committed"
        );
        Ok(BroadcastAck::success())
    }
}
