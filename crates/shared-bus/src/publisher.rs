//! # Channel Event Bus
//!
//! The publishing half. One bus per event hub; the hub's pump is its only
//! producer and every registration holds one [`Subscription`].

use crate::events::{ChannelEvent, EventFilter};
use crate::subscriber::{EventStream, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Publishing seam used by the event hub pump.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Fan `event` out to the live subscriptions. Returns how many there
    /// were; subscriptions whose filter rejects the event still count.
    async fn publish(&self, event: ChannelEvent) -> usize;

    fn events_published(&self) -> u64;
}

/// Delivery counters shared by a bus and its subscriptions.
#[derive(Debug, Default)]
pub struct BusStats {
    pub published: AtomicU64,
    /// Published while no subscription existed.
    pub unobserved: AtomicU64,
    /// Dropped from slow subscriptions after they fell `capacity` behind.
    pub lost: AtomicU64,
}

impl BusStats {
    pub(crate) fn record_lost(&self, count: u64) {
        self.lost.fetch_add(count, Ordering::Relaxed);
    }

    #[must_use]
    pub fn lost(&self) -> u64 {
        self.lost.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn unobserved(&self) -> u64 {
        self.unobserved.load(Ordering::Relaxed)
    }
}

/// `tokio::sync::broadcast` backed bus of [`ChannelEvent`]s.
pub struct ChannelEventBus {
    sender: broadcast::Sender<ChannelEvent>,
    stats: Arc<BusStats>,
    capacity: usize,
}

impl ChannelEventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// A capacity of 0 is raised to 1.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            stats: Arc::new(BusStats::default()),
            capacity,
        }
    }

    /// Events matching `filter`, from the next publish on. Lifecycle events
    /// pass every filter.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        debug!(
            topics = ?filter.topics,
            chaincode = ?filter.chaincode_id,
            event = ?filter.event_name,
            "Bus subscription opened"
        );
        Subscription::new(self.sender.subscribe(), filter, Arc::clone(&self.stats))
    }

    #[must_use]
    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        self.subscribe(filter).into_stream()
    }

    /// Live subscriptions, streams included.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    #[must_use]
    pub fn stats(&self) -> &BusStats {
        &self.stats
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for ChannelEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for ChannelEventBus {
    async fn publish(&self, event: ChannelEvent) -> usize {
        self.stats.published.fetch_add(1, Ordering::Relaxed);
        let block = event.block_number();
        let topic = event.topic();

        if let Ok(receivers) = self.sender.send(event) {
            trace!(?topic, ?block, receivers, "Channel event published");
            receivers
        } else {
            self.stats.unobserved.fetch_add(1, Ordering::Relaxed);
            trace!(?topic, ?block, "Channel event had no subscribers");
            0
        }
    }

    fn events_published(&self) -> u64 {
        self.stats.published.load(Ordering::Relaxed)
    }
}
