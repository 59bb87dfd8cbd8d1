//! Application layer: the JSON-RPC client and the port implementations on top of it.

pub mod client;
pub mod events;
pub mod transport;

pub use client::RpcClient;
pub use events::RpcEventSource;
pub use transport::RpcTransport;
