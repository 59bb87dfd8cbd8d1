//! Domain layer: JSON-RPC envelopes and errors.

pub mod errors;
pub mod jsonrpc;
