//! # Channel Events
//!
//! Event types that flow through the bus once a peer's deliver service has
//! been connected. One committed block fans out into a `BlockCommitted`
//! event, one `TransactionCommitted` event per transaction, and one
//! `Chaincode` event per valid transaction that set an event.

use shared_types::{Block, ChaincodeEvent, ChaincodeId, PeerName, TransactionId, ValidationCode};
use std::sync::Arc;

/// All events that can be published to the bus.
#[derive(Debug, Clone)]
pub enum ChannelEvent {
    /// A block was committed on the source peer.
    BlockCommitted { source: PeerName, block: Arc<Block> },

    /// A transaction was committed, valid or not.
    TransactionCommitted {
        source: PeerName,
        block_number: u64,
        tx_id: TransactionId,
        validation_code: ValidationCode,
    },

    /// A valid transaction emitted a chaincode event.
    Chaincode {
        source: PeerName,
        block_number: u64,
        event: ChaincodeEvent,
    },

    /// The event source stopped delivering.
    Disconnected { source: PeerName, reason: String },
}

impl ChannelEvent {
    /// Get the topic for this event.
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::BlockCommitted { .. } => EventTopic::Blocks,
            Self::TransactionCommitted { .. } => EventTopic::Transactions,
            Self::Chaincode { .. } => EventTopic::Chaincode,
            Self::Disconnected { .. } => EventTopic::Lifecycle,
        }
    }

    /// Peer the event was delivered by.
    #[must_use]
    pub fn source(&self) -> &PeerName {
        match self {
            Self::BlockCommitted { source, .. }
            | Self::TransactionCommitted { source, .. }
            | Self::Chaincode { source, .. }
            | Self::Disconnected { source, .. } => source,
        }
    }

    /// Block number, when the event belongs to a block.
    #[must_use]
    pub fn block_number(&self) -> Option<u64> {
        match self {
            Self::BlockCommitted { block, .. } => Some(block.number),
            Self::TransactionCommitted { block_number, .. }
            | Self::Chaincode { block_number, .. } => Some(*block_number),
            Self::Disconnected { .. } => None,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTopic {
    Blocks,
    Transactions,
    Chaincode,
    /// Connection lifecycle; delivered to every subscriber.
    Lifecycle,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Only transaction events for this id.
    pub tx_id: Option<TransactionId>,
    /// Only chaincode events from this chaincode.
    pub chaincode_id: Option<ChaincodeId>,
    /// Only chaincode events with this name.
    pub event_name: Option<String>,
}

impl EventFilter {
    /// Create a filter that accepts all events.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for specific topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            ..Self::default()
        }
    }

    /// Every committed block.
    #[must_use]
    pub fn blocks() -> Self {
        Self::topics(vec![EventTopic::Blocks])
    }

    /// The commit of one transaction.
    #[must_use]
    pub fn transaction(tx_id: TransactionId) -> Self {
        Self {
            topics: vec![EventTopic::Transactions],
            tx_id: Some(tx_id),
            ..Self::default()
        }
    }

    /// Chaincode events of one chaincode, optionally narrowed to one name.
    #[must_use]
    pub fn chaincode(chaincode_id: ChaincodeId, event_name: Option<String>) -> Self {
        Self {
            topics: vec![EventTopic::Chaincode],
            chaincode_id: Some(chaincode_id),
            event_name,
            ..Self::default()
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &ChannelEvent) -> bool {
        let topic = event.topic();
        if topic == EventTopic::Lifecycle {
            return true;
        }

        let topic_match = self.topics.is_empty() || self.topics.contains(&topic);
        if !topic_match {
            return false;
        }

        match event {
            ChannelEvent::TransactionCommitted { tx_id, .. } => {
                self.tx_id.as_ref().map_or(true, |want| want == tx_id)
            }
            ChannelEvent::Chaincode { event, .. } => {
                let chaincode_match = self
                    .chaincode_id
                    .as_ref()
                    .map_or(true, |want| want == &event.chaincode_id);
                let name_match = self
                    .event_name
                    .as_deref()
                    .map_or(true, |want| want == event.event_name);
                chaincode_match && name_match
            }
            ChannelEvent::BlockCommitted { .. } | ChannelEvent::Disconnected { .. } => true,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_events::*;
    use super::*;

    #[test]
    fn test_event_topic_mapping() {
        assert_eq!(block_event(1).topic(), EventTopic::Blocks);
        assert_eq!(chaincode_event("oemcc", "newAsset").topic(), EventTopic::Chaincode);
        assert_eq!(block_event(4).block_number(), Some(4));
    }

    #[test]
    fn test_filter_all() {
        let filter = EventFilter::all();
        assert!(filter.matches(&block_event(1)));
        assert!(filter.matches(&chaincode_event("oemcc", "newAsset")));
    }

    #[test]
    fn test_chaincode_filter_by_name() {
        let filter = EventFilter::chaincode(ChaincodeId::new("oemcc"), Some("assetShared".into()));
        assert!(filter.matches(&chaincode_event("oemcc", "assetShared")));
        assert!(!filter.matches(&chaincode_event("oemcc", "newAsset")));
        assert!(!filter.matches(&chaincode_event("othercc", "assetShared")));
        assert!(!filter.matches(&block_event(1)));
    }

    #[test]
    fn test_transaction_filter() {
        let (wanted, _) = TransactionId::generate(b"a");
        let (other, _) = TransactionId::generate(b"a");
        let filter = EventFilter::transaction(wanted.clone());
        assert!(filter.matches(&tx_event(wanted)));
        assert!(!filter.matches(&tx_event(other)));
    }

    #[test]
    fn test_lifecycle_events_pass_every_filter() {
        let event = ChannelEvent::Disconnected {
            source: PeerName::new("peer0"),
            reason: "closed".into(),
        };
        assert!(EventFilter::blocks().matches(&event));
        assert!(EventFilter::chaincode(ChaincodeId::new("oemcc"), None).matches(&event));
    }
}
