//! Domain layer: typestate transaction, endorsement classification, policy, errors.

pub mod endorsement;
pub mod errors;
pub mod policy;
pub mod registry;
pub mod transaction;
pub mod value_objects;
