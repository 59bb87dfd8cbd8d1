//! # Channel Event Hub
//!
//! One hub per (channel, peer). Registrations can be made at any time; no
//! event flows until [`ChannelEventHub::connect`] activates the peer's
//! deliver service. A single pump task then turns each delivered block into
//! bus events:
//!
//! ```text
//! deliver stream ──→ pump ──→ BlockCommitted
//!                         ├──→ TransactionCommitted (every tx)
//!                         └──→ Chaincode (valid txs that set an event)
//! ```
//!
//! Delivery is best effort and at most once per connection.

use crate::config::EventHubConfig;
use crate::domain::errors::EventHubError;
use crate::domain::registration::{ConnectOptions, EventRegistration, RegistrationId};
use crate::application::subscription::EventSubscription;
use crate::ports::outbound::{BlockStream, EventSource};
use dashmap::DashMap;
use shared_bus::{ChannelEvent, ChannelEventBus, EventFilter, EventPublisher, EventTopic};
use shared_types::{Block, ChaincodeId, PeerName, TransactionId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};

/// A running pump.
struct Connection {
    stop: oneshot::Sender<()>,
    pump: JoinHandle<()>,
}

pub struct ChannelEventHub {
    peer: PeerName,
    source: Arc<dyn EventSource>,
    bus: Arc<ChannelEventBus>,
    registrations: DashMap<RegistrationId, oneshot::Sender<()>>,
    connection: Mutex<Option<Connection>>,
    connected: Arc<AtomicBool>,
    config: EventHubConfig,
}

impl ChannelEventHub {
    pub fn new(source: Arc<dyn EventSource>) -> Self {
        Self::with_config(source, EventHubConfig::default())
    }

    pub fn with_config(source: Arc<dyn EventSource>, config: EventHubConfig) -> Self {
        Self {
            peer: source.peer().clone(),
            bus: Arc::new(ChannelEventBus::with_capacity(config.bus_capacity)),
            source,
            registrations: DashMap::new(),
            connection: Mutex::new(None),
            connected: Arc::new(AtomicBool::new(false)),
            config,
        }
    }

    #[must_use]
    pub fn peer(&self) -> &PeerName {
        &self.peer
    }

    #[must_use]
    pub fn config(&self) -> &EventHubConfig {
        &self.config
    }

    /// True while the pump is running.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Live registrations.
    #[must_use]
    pub fn registration_count(&self) -> usize {
        self.registrations.len()
    }

    /// Events published since the hub was created.
    #[must_use]
    pub fn events_published(&self) -> u64 {
        self.bus.events_published()
    }

    /// Events dropped from registrations that fell behind.
    #[must_use]
    pub fn events_lost(&self) -> u64 {
        self.bus.stats().lost()
    }

    // =========================================================================
    // REGISTRATION
    // =========================================================================

    fn register(&self, filter: EventFilter) -> EventRegistration {
        let id = RegistrationId::new();
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let subscription = self.bus.subscribe(filter);
        // Entries whose stream was dropped without unregistering.
        self.registrations.retain(|_, cancel| !cancel.is_closed());
        self.registrations.insert(id, cancel_tx);
        debug!(peer = %self.peer, registration = %id, "Registered event listener");
        EventRegistration {
            id,
            stream: EventSubscription::new(self.peer.clone(), subscription, cancel_rx),
        }
    }

    /// Chaincode events of `chaincode_id` named exactly `event_name`.
    pub fn register_chaincode_event(
        &self,
        chaincode_id: &ChaincodeId,
        event_name: &str,
    ) -> EventRegistration {
        self.register(EventFilter::chaincode(
            chaincode_id.clone(),
            Some(event_name.to_string()),
        ))
    }

    /// Every chaincode event of `chaincode_id`.
    pub fn register_all_chaincode_events(&self, chaincode_id: &ChaincodeId) -> EventRegistration {
        self.register(EventFilter::chaincode(chaincode_id.clone(), None))
    }

    /// Every committed block.
    pub fn register_block_event(&self) -> EventRegistration {
        self.register(EventFilter::blocks())
    }

    /// Commit of one transaction, valid or not.
    pub fn register_tx_event(&self, tx_id: &TransactionId) -> EventRegistration {
        self.register(EventFilter::transaction(tx_id.clone()))
    }

    /// Commit of every transaction.
    pub fn register_transaction_events(&self) -> EventRegistration {
        self.register(EventFilter::topics(vec![EventTopic::Transactions]))
    }

    /// End a registration. Its stream yields `None` from the next read on.
    /// Returns false for an unknown id.
    pub fn unregister(&self, id: &RegistrationId) -> bool {
        match self.registrations.remove(id) {
            Some((_, cancel)) => {
                let _ = cancel.send(());
                debug!(peer = %self.peer, registration = %id, "Unregistered event listener");
                true
            }
            None => false,
        }
    }

    // =========================================================================
    // ACTIVATION
    // =========================================================================

    /// Activate the deliver service. A second call while connected is a no-op.
    pub async fn connect(&self, options: ConnectOptions) -> Result<(), EventHubError> {
        let mut connection = self.connection.lock().await;
        if let Some(existing) = connection.as_ref() {
            if !existing.pump.is_finished() {
                debug!(peer = %self.peer, "Event hub already connected");
                return Ok(());
            }
        }

        let blocks = self.source.deliver(options.start_block).await?;
        let (stop_tx, stop_rx) = oneshot::channel();
        self.connected.store(true, Ordering::Release);
        let pump = tokio::spawn(pump(
            self.peer.clone(),
            blocks,
            Arc::clone(&self.bus),
            stop_rx,
            options.full_block,
            Arc::clone(&self.connected),
        ));
        *connection = Some(Connection { stop: stop_tx, pump });

        info!(
            peer = %self.peer,
            start_block = ?options.start_block,
            full_block = options.full_block,
            "Event hub connected"
        );
        Ok(())
    }

    /// Stop the pump. Every subscription then reports `Disconnected` and
    /// ends; registrations are dropped.
    pub async fn disconnect(&self) {
        let mut connection = self.connection.lock().await;
        if let Some(Connection { stop, pump }) = connection.take() {
            let _ = stop.send(());
            if let Err(e) = pump.await {
                warn!(peer = %self.peer, error = %e, "Event pump ended abnormally");
            }
            info!(
                peer = %self.peer,
                published = self.bus.events_published(),
                lost = self.events_lost(),
                "Event hub disconnected"
            );
        }
        self.registrations.clear();
    }
}

impl Drop for ChannelEventHub {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.get_mut().take() {
            connection.pump.abort();
        }
    }
}

/// Strip chaincode event payloads, keeping names.
fn filtered(mut block: Block) -> Block {
    for tx in &mut block.transactions {
        if let Some(event) = tx.chaincode_event.as_mut() {
            event.payload.clear();
        }
    }
    block
}

async fn publish_block(bus: &ChannelEventBus, peer: &PeerName, block: Block, full_block: bool) {
    let block = if full_block { block } else { filtered(block) };
    let number = block.number;
    let block = Arc::new(block);

    bus.publish(ChannelEvent::BlockCommitted {
        source: peer.clone(),
        block: Arc::clone(&block),
    })
    .await;

    for tx in &block.transactions {
        bus.publish(ChannelEvent::TransactionCommitted {
            source: peer.clone(),
            block_number: number,
            tx_id: tx.tx_id.clone(),
            validation_code: tx.validation_code,
        })
        .await;

        if !tx.validation_code.is_valid() {
            continue;
        }
        if let Some(event) = &tx.chaincode_event {
            bus.publish(ChannelEvent::Chaincode {
                source: peer.clone(),
                block_number: number,
                event: event.clone(),
            })
            .await;
        }
    }
}

async fn pump(
    peer: PeerName,
    mut blocks: BlockStream,
    bus: Arc<ChannelEventBus>,
    mut stop: oneshot::Receiver<()>,
    full_block: bool,
    connected: Arc<AtomicBool>,
) {
    let reason = loop {
        tokio::select! {
            _ = &mut stop => break "disconnected by client".to_string(),
            next = blocks.next() => match next {
                Some(Ok(block)) => {
                    debug!(peer = %peer, block = block.number, txs = block.transactions.len(), "Block delivered");
                    publish_block(&bus, &peer, block, full_block).await;
                }
                Some(Err(e)) => {
                    warn!(peer = %peer, error = %e, "Deliver stream failed");
                    break e.to_string();
                }
                None => break "event source closed".to_string(),
            },
        }
    };

    connected.store(false, Ordering::Release);
    bus.publish(ChannelEvent::Disconnected {
        source: peer,
        reason,
    })
    .await;
}
