//! # Chaincode Stub
//!
//! What a chaincode sees while a peer simulates one proposal: committed
//! world state for reads, a read/write set for writes, one event slot, and
//! the transaction's id and timestamp.
//!
//! Reads always return committed state, never the transaction's own
//! pending writes, matching how endorsing peers simulate.

use crate::domain::errors::ChaincodeError;
use crate::domain::ledger::Ledger;
use shared_types::{ChaincodeEvent, ChaincodeId, ReadWriteSet, TransactionId};

pub struct ChaincodeStub<'a> {
    ledger: &'a Ledger,
    chaincode_id: ChaincodeId,
    tx_id: TransactionId,
    timestamp_ms: i64,
    results: ReadWriteSet,
    event: Option<(String, Vec<u8>)>,
}

impl<'a> ChaincodeStub<'a> {
    pub fn new(
        ledger: &'a Ledger,
        chaincode_id: ChaincodeId,
        tx_id: TransactionId,
        timestamp_ms: i64,
    ) -> Self {
        Self {
            ledger,
            chaincode_id,
            tx_id,
            timestamp_ms,
            results: ReadWriteSet::default(),
            event: None,
        }
    }

    pub fn tx_id(&self) -> &TransactionId {
        &self.tx_id
    }

    /// Proposal timestamp in unix seconds. Identical on every endorser.
    pub fn tx_timestamp(&self) -> i64 {
        self.timestamp_ms.div_euclid(1000)
    }

    pub fn get_state(&mut self, key: &str) -> Result<Option<Vec<u8>>, ChaincodeError> {
        if key.is_empty() {
            return Err(ChaincodeError::failed("key must not be an empty string"));
        }
        let entry = self.ledger.get(key);
        self.results.record_read(key, entry.as_ref().map(|v| v.version));
        Ok(entry.map(|v| v.value))
    }

    pub fn put_state(&mut self, key: &str, value: Vec<u8>) -> Result<(), ChaincodeError> {
        if key.is_empty() {
            return Err(ChaincodeError::failed("key must not be an empty string"));
        }
        self.results.record_write(key, Some(value));
        Ok(())
    }

    pub fn del_state(&mut self, key: &str) -> Result<(), ChaincodeError> {
        if key.is_empty() {
            return Err(ChaincodeError::failed("key must not be an empty string"));
        }
        self.results.record_write(key, None);
        Ok(())
    }

    /// Set the transaction's event. A later call replaces an earlier one.
    pub fn set_event(&mut self, name: &str, payload: Vec<u8>) -> Result<(), ChaincodeError> {
        if name.is_empty() {
            return Err(ChaincodeError::failed("event name can not be empty string"));
        }
        self.event = Some((name.to_string(), payload));
        Ok(())
    }

    /// Consume the stub into the simulation results.
    pub fn finish(self) -> (ReadWriteSet, Option<ChaincodeEvent>) {
        let event = self.event.map(|(event_name, payload)| ChaincodeEvent {
            chaincode_id: self.chaincode_id,
            tx_id: self.tx_id,
            event_name,
            payload,
        });
        (self.results, event)
    }
}
