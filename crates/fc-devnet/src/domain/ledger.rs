//! # Ledger
//!
//! World state plus the block chain that produced it, shared by every peer
//! of a development network.
//!
//! Keys carry the version of the transaction that last wrote them. A
//! transaction whose simulation read a key at an older version than the one
//! committed is marked `MvccReadConflict` and its writes are dropped.
//!
//! Blocks are appended and fanned out under the same lock, so a deliver
//! stream that snapshots history and subscribes in one step sees every
//! block exactly once.

use parking_lot::RwLock;
use shared_types::{
    Block, BlockTransaction, ChaincodeEvent, EncodingError, Hash, ReadWriteSet, TransactionId,
    ValidationCode, Version,
};
use std::collections::{HashMap, HashSet};
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// A committed value and the version that wrote it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionedValue {
    pub value: Vec<u8>,
    pub version: Version,
}

/// A transaction the ordering service hands to the committer.
#[derive(Debug, Clone)]
pub struct PendingTransaction {
    pub tx_id: TransactionId,
    pub results: ReadWriteSet,
    pub event: Option<ChaincodeEvent>,
    /// Whether the envelope carried enough endorsements.
    pub policy_satisfied: bool,
}

#[derive(Default)]
struct LedgerState {
    world: HashMap<String, VersionedValue>,
    blocks: Vec<Block>,
    committed: HashSet<TransactionId>,
}

pub struct Ledger {
    state: RwLock<LedgerState>,
    live: broadcast::Sender<Block>,
}

/// First key whose read version no longer matches world state.
fn stale_read<'a>(world: &HashMap<String, VersionedValue>, results: &'a ReadWriteSet) -> Option<&'a str> {
    results
        .reads
        .iter()
        .find(|read| world.get(&read.key).map(|v| v.version) != read.version)
        .map(|read| read.key.as_str())
}

impl Ledger {
    /// Empty ledger. `capacity` bounds how far a slow deliver stream may lag.
    pub fn new(capacity: usize) -> Self {
        let (live, _) = broadcast::channel(capacity.max(1));
        Self {
            state: RwLock::new(LedgerState::default()),
            live,
        }
    }

    pub fn get(&self, key: &str) -> Option<VersionedValue> {
        self.state.read().world.get(key).cloned()
    }

    /// Number of blocks; also the number of the next block.
    pub fn height(&self) -> u64 {
        self.state.read().blocks.len() as u64
    }

    pub fn tip_hash(&self) -> Hash {
        self.state
            .read()
            .blocks
            .last()
            .map_or([0u8; 32], Block::header_hash)
    }

    pub fn block(&self, number: u64) -> Option<Block> {
        self.state.read().blocks.get(number as usize).cloned()
    }

    pub fn is_committed(&self, tx_id: &TransactionId) -> bool {
        self.state.read().committed.contains(tx_id)
    }

    /// Validate `tx`, apply its writes if valid, and append it as the next
    /// block. Invalid transactions are recorded too, with their code.
    pub fn commit(&self, tx: PendingTransaction) -> Result<Block, EncodingError> {
        let mut state = self.state.write();
        let number = state.blocks.len() as u64;
        let previous_hash = state.blocks.last().map_or([0u8; 32], Block::header_hash);

        let code = if state.committed.contains(&tx.tx_id) {
            ValidationCode::DuplicateTxId
        } else if !tx.policy_satisfied {
            ValidationCode::EndorsementPolicyFailure
        } else if let Some(key) = stale_read(&state.world, &tx.results) {
            debug!(tx_id = %tx.tx_id.short(), key, "Read version is stale");
            ValidationCode::MvccReadConflict
        } else {
            ValidationCode::Valid
        };

        let block = Block::new(
            number,
            previous_hash,
            vec![BlockTransaction {
                tx_id: tx.tx_id.clone(),
                validation_code: code,
                chaincode_event: tx.event,
            }],
        )?;

        if code.is_valid() {
            let version = Version::new(number, 0);
            for write in tx.results.writes {
                match write.value {
                    Some(value) => {
                        state.world.insert(write.key, VersionedValue { value, version });
                    }
                    None => {
                        state.world.remove(&write.key);
                    }
                }
            }
        } else {
            warn!(tx_id = %tx.tx_id.short(), block = number, code = %code, "Transaction invalidated");
        }

        state.committed.insert(tx.tx_id);
        state.blocks.push(block.clone());
        // No receivers is fine: nobody is listening yet.
        let _ = self.live.send(block.clone());
        Ok(block)
    }

    /// Blocks from `start` on, plus a receiver for every later block.
    pub fn subscribe_from(&self, start: u64) -> (Vec<Block>, broadcast::Receiver<Block>) {
        let state = self.state.read();
        let history = state
            .blocks
            .iter()
            .skip(start as usize)
            .cloned()
            .collect();
        (history, self.live.subscribe())
    }

    /// Receiver for blocks committed from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Block> {
        let _state = self.state.read();
        self.live.subscribe()
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(256)
    }
}
