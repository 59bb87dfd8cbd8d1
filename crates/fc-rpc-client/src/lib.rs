//! # FC-RPC-CLIENT: JSON-RPC Network Transport
//!
//! Reaches the peers and ordering service of a remote channel over
//! JSON-RPC 2.0 on HTTP, implementing the same outbound ports the
//! in-process development network does.
//!
//! ```text
//! RpcTransport (NetworkTransport)
//!     ├── EndorsementTransport ──→ peer_processProposal, one peer at a time
//!     ├── OrderingService      ──→ orderer_broadcast
//!     └── RpcEventSource       ──→ peer_blockHeight, then peer_blocksFrom polls
//! ```
//!
//! Endpoints come from the connection profile. With `as_localhost` (the
//! default) every host is rewritten to `localhost`, keeping ports.

pub mod application;
pub mod config;
pub mod domain;

pub use application::{RpcClient, RpcEventSource, RpcTransport};
pub use config::RpcConfig;
pub use domain::errors::RpcError;
