//! # Commit Tracker
//!
//! Bridges a hub's transaction events to the submission flow's
//! `CommitNotifier` port.
//!
//! Flow:
//! 1. The submitter calls `register(tx_id)` before broadcasting
//! 2. The listener task sees `TransactionCommitted` for that id
//! 3. `complete()` hands the status to the waiting receiver
//! 4. The submitter awaits the receiver under its own timeout, calling
//!    `cancel()` if it gives up
//!
//! When the hub disconnects every pending receiver is dropped, which the
//! submitter reports as an abandoned commit wait.

use crate::application::hub::ChannelEventHub;
use async_trait::async_trait;
use dashmap::DashMap;
use fc_02_submission::{CommitNotifier, CommitStatus, TransportError};
use shared_bus::ChannelEvent;
use shared_types::{TransactionId, ValidationCode};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Instant;
use tokio::sync::oneshot;
use tracing::{debug, warn};

struct PendingCommit {
    sender: oneshot::Sender<CommitStatus>,
    registered_at: Instant,
}

/// Counters for the tracker's lifetime.
#[derive(Debug, Default)]
pub struct CommitTrackerStats {
    pub total_registered: AtomicU64,
    pub total_completed: AtomicU64,
    pub total_cancelled: AtomicU64,
    /// Dropped because the hub disconnected.
    pub total_abandoned: AtomicU64,
}

pub struct CommitTracker {
    hub: Arc<ChannelEventHub>,
    pending: DashMap<TransactionId, PendingCommit>,
    listening: AtomicBool,
    stats: CommitTrackerStats,
}

impl CommitTracker {
    /// Attach to `hub` and start listening. Must run inside a tokio runtime.
    pub fn attach(hub: Arc<ChannelEventHub>) -> Arc<Self> {
        let mut registration = hub.register_transaction_events();
        let tracker = Arc::new(Self {
            hub,
            pending: DashMap::new(),
            listening: AtomicBool::new(true),
            stats: CommitTrackerStats::default(),
        });

        let weak: Weak<Self> = Arc::downgrade(&tracker);
        tokio::spawn(async move {
            while let Some(event) = registration.stream.recv().await {
                let Some(tracker) = weak.upgrade() else {
                    return;
                };
                match event {
                    Ok(ChannelEvent::TransactionCommitted {
                        tx_id,
                        block_number,
                        validation_code,
                        ..
                    }) => {
                        tracker.complete(&tx_id, block_number, validation_code);
                    }
                    Ok(_) => {}
                    Err(e) => {
                        debug!(error = %e, "Commit tracker stopping");
                        break;
                    }
                }
            }
            if let Some(tracker) = weak.upgrade() {
                tracker.listening.store(false, Ordering::Release);
                tracker.abandon_all();
            }
        });

        tracker
    }

    /// Hand `status` to whoever waits for `tx_id`. Returns true if a waiter
    /// received it.
    pub fn complete(&self, tx_id: &TransactionId, block_number: u64, code: ValidationCode) -> bool {
        let Some((_, pending)) = self.pending.remove(tx_id) else {
            return false;
        };
        let status = CommitStatus {
            tx_id: tx_id.clone(),
            block_number,
            validation_code: code,
        };
        match pending.sender.send(status) {
            Ok(()) => {
                self.stats.total_completed.fetch_add(1, Ordering::Relaxed);
                debug!(
                    tx_id = %tx_id.short(),
                    block = block_number,
                    code = %code,
                    wait_ms = pending.registered_at.elapsed().as_millis() as u64,
                    "Commit observed"
                );
                true
            }
            Err(_) => {
                self.stats.total_cancelled.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    fn abandon_all(&self) {
        let abandoned = self.pending.len();
        if abandoned > 0 {
            warn!(abandoned, peer = %self.hub.peer(), "Event hub gone, abandoning commit waits");
        }
        self.pending.clear();
        self.stats
            .total_abandoned
            .fetch_add(abandoned as u64, Ordering::Relaxed);
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_pending(&self, tx_id: &TransactionId) -> bool {
        self.pending.contains_key(tx_id)
    }

    /// True while the listener task runs.
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn stats(&self) -> &CommitTrackerStats {
        &self.stats
    }

    #[must_use]
    pub fn hub(&self) -> &Arc<ChannelEventHub> {
        &self.hub
    }
}

#[async_trait]
impl CommitNotifier for CommitTracker {
    async fn register(
        &self,
        tx_id: &TransactionId,
    ) -> Result<oneshot::Receiver<CommitStatus>, TransportError> {
        if !self.is_listening() || !self.hub.is_connected() {
            return Err(TransportError::NotConnected);
        }
        let (sender, receiver) = oneshot::channel();
        self.pending.insert(
            tx_id.clone(),
            PendingCommit {
                sender,
                registered_at: Instant::now(),
            },
        );
        self.stats.total_registered.fetch_add(1, Ordering::Relaxed);
        Ok(receiver)
    }

    fn cancel(&self, tx_id: &TransactionId) {
        if self.pending.remove(tx_id).is_some() {
            self.stats.total_cancelled.fetch_add(1, Ordering::Relaxed);
        }
    }
}
