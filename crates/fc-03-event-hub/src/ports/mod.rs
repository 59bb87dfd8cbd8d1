//! Ports (hexagonal architecture boundaries).

pub mod outbound;
