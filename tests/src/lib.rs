//! # OEM Client Test Suite
//!
//! End-to-end flows across the identity, submission, event hub and gateway
//! crates, run against the in-process development network.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/
//! │   ├── lib.rs                  # This file
//! │   ├── fixtures.rs             # Two-org network, recording orderer, seeding
//! │   └── integration/
//! │       ├── submission_flow.rs  # Propose, policy gate, order, commit wait
//! │       ├── event_flow.rs       # Registration, activation, replay, teardown
//! │       ├── gateway_flow.rs     # Gateway, contracts, listeners
//! │       └── runtime_flow.rs     # Profile and wallet on disk to a session
//! └── benches/
//!     └── submission_benchmarks.rs
//! ```
//!
//! The development network commits each ordered envelope as its own block,
//! numbered from 0, so block numbers in assertions count submissions.

pub mod fixtures;
pub mod integration;
