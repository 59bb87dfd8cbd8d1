//! Application layer: gateway, network and contract handles.

pub mod contract;
pub mod gateway;
pub mod network;

pub use contract::{Contract, ContractEvent, ContractListener, Transaction};
pub use gateway::Gateway;
pub use network::Network;
