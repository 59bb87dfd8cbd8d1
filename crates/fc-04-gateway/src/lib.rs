//! # FC-04: Gateway
//!
//! The high-level client API: connect once, pick a channel, call a
//! contract.
//!
//! ```text
//! Gateway::connect(profile, options)
//!     └── network("oem-channel")          endorsers + submitter + event hub
//!           └── contract("oemcc")
//!                 ├── evaluate_transaction("GetAsset", ..)    one query peer
//!                 ├── submit_transaction("NewAsset", ..)      endorse, order, await commit
//!                 ├── create_transaction(..).submit(..)       id readable afterwards
//!                 └── add_contract_listener("newAsset")       chaincode event stream
//! ```
//!
//! ## Architecture
//!
//! - **Domain**: `GatewayOptions`, `CommitStrategy`, `DiscoveryOptions`, `GatewayError`
//! - **Ports**: Outbound `NetworkTransport` (endorsers, orderer, event sources)
//! - **Application**: `Gateway`, `Network`, `Contract`, `Transaction`, `ContractListener`
//!
//! Connecting does no network I/O. A network's event hub is opened when the
//! commit strategy needs it or on the first contract listener.

pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use application::{Contract, ContractEvent, ContractListener, Gateway, Network, Transaction};
pub use config::GatewayConfig;
pub use domain::errors::GatewayError;
pub use domain::options::{CommitStrategy, DiscoveryOptions, GatewayOptions};
pub use ports::outbound::NetworkTransport;
