//! Application layer: the submission service.

pub mod service;

pub use service::TransactionSubmitter;
