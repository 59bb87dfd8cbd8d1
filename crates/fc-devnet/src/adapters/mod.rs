//! Chaincode implementations.

pub mod oem_contract;

pub use oem_contract::OemContract;
