//! # Transaction Id Registry
//!
//! Process-local record of transaction ids already used for a proposal.
//! Ids are random and collisions are not expected; the registry turns the
//! "one id per attempt" rule into a checked invariant instead of a hope.
//!
//! Entries expire after a retention window and are garbage-collected
//! periodically, which bounds memory for long-running processes.

use crate::domain::errors::SubmitError;
use parking_lot::Mutex;
use shared_types::TransactionId;
use std::collections::HashMap;
use std::time::{Duration, Instant};

pub struct TxIdRegistry {
    inner: Mutex<Inner>,
    retention: Duration,
    gc_interval: Duration,
}

struct Inner {
    seen: HashMap<TransactionId, Instant>,
    last_gc: Instant,
}

impl TxIdRegistry {
    /// Default retention: one hour.
    pub const DEFAULT_RETENTION: Duration = Duration::from_secs(3600);

    /// Default garbage collection interval.
    pub const DEFAULT_GC_INTERVAL: Duration = Duration::from_secs(60);

    #[must_use]
    pub fn new() -> Self {
        Self::with_retention(Self::DEFAULT_RETENTION, Self::DEFAULT_GC_INTERVAL)
    }

    #[must_use]
    pub fn with_retention(retention: Duration, gc_interval: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                seen: HashMap::new(),
                last_gc: Instant::now(),
            }),
            retention,
            gc_interval,
        }
    }

    /// Record `tx_id` as used. Fails if it was used before.
    pub fn claim(&self, tx_id: &TransactionId) -> Result<(), SubmitError> {
        let now = Instant::now();
        let mut inner = self.inner.lock();

        if now.duration_since(inner.last_gc) > self.gc_interval {
            let retention = self.retention;
            inner
                .seen
                .retain(|_, claimed| now.duration_since(*claimed) <= retention);
            inner.last_gc = now;
        }

        if inner.seen.contains_key(tx_id) {
            return Err(SubmitError::DuplicateTransactionId {
                tx_id: tx_id.clone(),
            });
        }
        inner.seen.insert(tx_id.clone(), now);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().seen.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TxIdRegistry {
    fn default() -> Self {
        Self::new()
    }
}
