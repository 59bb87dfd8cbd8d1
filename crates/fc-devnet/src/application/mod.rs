//! Application layer: peers, ordering service and the network that wires them.

pub mod network;
pub mod orderer;
pub mod peer;

pub use network::{DevNetwork, DevNetworkBuilder, DevTransport};
pub use orderer::{DevOrderer, OrdererStats};
pub use peer::{ChaincodeRegistry, DevPeer, PeerBehaviour};
