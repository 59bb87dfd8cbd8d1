//! # FC-DEVNET: In-Process Development Network
//!
//! A channel that runs inside the client process: endorsing peers with the
//! OEM requirements chaincode installed, a one-block-per-envelope ordering
//! service, and a shared ledger whose blocks feed every peer's deliver
//! service.
//!
//! ```text
//! DevTransport ──→ DevNetwork
//!                    ├── DevPeer × N ──→ ChaincodeStub ──→ OemContract
//!                    ├── DevOrderer  ──→ Ledger::commit (MVCC, duplicates, policy)
//!                    └── Ledger      ──→ deliver streams (replay + live)
//! ```
//!
//! ## Architecture
//!
//! - **Domain**: `Ledger`, `ChaincodeStub`, `ChaincodeError`, `DevnetError`
//! - **Ports**: Outbound `Chaincode` (what a peer can run)
//! - **Adapters**: `OemContract`
//! - **Application**: `DevPeer`, `DevOrderer`, `DevNetwork`, `DevTransport`
//!
//! Commit validation follows a Fabric peer: a transaction is invalid when
//! its id was committed before, when too few distinct endorsers signed it,
//! or when any key it read has changed since simulation. Invalid
//! transactions still occupy a block.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use adapters::OemContract;
pub use application::{DevNetwork, DevNetworkBuilder, DevOrderer, DevPeer, DevTransport, PeerBehaviour};
pub use config::DevnetConfig;
pub use domain::errors::{ChaincodeError, DevnetError};
pub use domain::ledger::Ledger;
pub use domain::stub::ChaincodeStub;
pub use ports::outbound::Chaincode;
