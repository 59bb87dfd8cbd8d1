//! # Core Domain Entities
//!
//! Names, chaincode invocations, read/write sets and chaincode events.
//!
//! ## Clusters
//!
//! - **Naming**: `ChannelId`, `ChaincodeId`, `PeerName`, `MspId`
//! - **Invocation**: `ChaincodeInvocation`, `ChaincodeResponse`
//! - **Simulation Results**: `ReadWriteSet`, `KvRead`, `KvWrite`, `Version`
//! - **Events**: `ChaincodeEvent`

use crate::ids::TransactionId;
use serde::{Deserialize, Serialize};
use serde_with::{base64::Base64, serde_as};
use std::fmt;

/// A 32-byte SHA-256 hash.
pub type Hash = [u8; 32];

macro_rules! string_name {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_name!(
    /// Channel name, e.g. `oem-channel`.
    ChannelId
);
string_name!(
    /// Deployed chaincode name, e.g. `oemcc`.
    ChaincodeId
);
string_name!(
    /// Peer name as it appears in the connection profile.
    PeerName
);
string_name!(
    /// Membership service provider id of an organization.
    MspId
);

// =============================================================================
// INVOCATION
// =============================================================================

/// A chaincode function call with its ordered arguments.
///
/// The argument schema belongs to the chaincode; the client only keeps the
/// order and the bytes.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaincodeInvocation {
    pub chaincode_id: ChaincodeId,
    pub function: String,
    #[serde_as(as = "Vec<Base64>")]
    pub args: Vec<Vec<u8>>,
}

impl ChaincodeInvocation {
    pub fn new(chaincode_id: impl Into<ChaincodeId>, function: impl Into<String>) -> Self {
        Self {
            chaincode_id: chaincode_id.into(),
            function: function.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<Vec<u8>>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append string arguments in order.
    #[must_use]
    pub fn string_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args
            .extend(args.into_iter().map(|s| s.as_ref().as_bytes().to_vec()));
        self
    }

    /// Arguments decoded as UTF-8 (lossy), for logging.
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| String::from_utf8_lossy(a).into_owned())
            .collect()
    }
}

/// Chaincode-level response to a simulated invocation.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaincodeResponse {
    /// 200 on success, 500 on chaincode error.
    pub status: i32,
    pub message: String,
    #[serde_as(as = "Base64")]
    pub payload: Vec<u8>,
}

impl ChaincodeResponse {
    pub const OK: i32 = 200;
    pub const ERROR: i32 = 500;

    pub fn success(payload: Vec<u8>) -> Self {
        Self {
            status: Self::OK,
            message: String::new(),
            payload,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Self::ERROR,
            message: message.into(),
            payload: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..400).contains(&self.status)
    }
}

// =============================================================================
// READ/WRITE SETS
// =============================================================================

/// Ledger version of a key: the block and transaction that last wrote it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version {
    pub block_num: u64,
    pub tx_num: u64,
}

impl Version {
    pub fn new(block_num: u64, tx_num: u64) -> Self {
        Self { block_num, tx_num }
    }
}

/// A key read during simulation. `version` is `None` when the key did not exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KvRead {
    pub key: String,
    pub version: Option<Version>,
}

/// A key written during simulation. `value` is `None` for a delete.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KvWrite {
    pub key: String,
    #[serde_as(as = "Option<Base64>")]
    pub value: Option<Vec<u8>>,
}

/// The simulated effect of a transaction on world state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadWriteSet {
    pub reads: Vec<KvRead>,
    pub writes: Vec<KvWrite>,
}

impl ReadWriteSet {
    /// Record a read, keeping only the first read of each key.
    pub fn record_read(&mut self, key: &str, version: Option<Version>) {
        if self.reads.iter().any(|r| r.key == key) {
            return;
        }
        self.reads.push(KvRead {
            key: key.to_string(),
            version,
        });
    }

    /// Record a write, replacing an earlier write of the same key.
    pub fn record_write(&mut self, key: &str, value: Option<Vec<u8>>) {
        if let Some(existing) = self.writes.iter_mut().find(|w| w.key == key) {
            existing.value = value;
            return;
        }
        self.writes.push(KvWrite {
            key: key.to_string(),
            value,
        });
    }

    pub fn is_read_only(&self) -> bool {
        self.writes.is_empty()
    }
}

// =============================================================================
// EVENTS
// =============================================================================

/// An event set by chaincode during simulation.
///
/// At most one event per transaction; a later `set_event` replaces an earlier one.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaincodeEvent {
    pub chaincode_id: ChaincodeId,
    pub tx_id: TransactionId,
    pub event_name: String,
    #[serde_as(as = "Base64")]
    pub payload: Vec<u8>,
}

impl ChaincodeEvent {
    pub fn payload_lossy(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}
