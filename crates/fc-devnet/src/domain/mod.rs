//! Domain layer: world state and the chaincode stub.

pub mod errors;
pub mod ledger;
pub mod stub;
