//! # FC-03: Channel Event Hub
//!
//! Chaincode, block and transaction events from one peer's deliver service,
//! exposed as cancellable subscription streams.
//!
//! ## Lifecycle
//!
//! ```text
//! register_*() ──→ EventRegistration { id, stream }     (nothing flows yet)
//! connect()    ──→ pump task starts, events flow to matching streams
//! unregister() ──→ that stream ends with None
//! disconnect() ──→ every stream yields Err(Disconnected), then None
//! ```
//!
//! ## Architecture
//!
//! - **Domain**: `RegistrationId`, `EventRegistration`, `ConnectOptions`, errors
//! - **Ports**: Outbound `EventSource` (a peer's deliver service)
//! - **Application**: `ChannelEventHub`, `EventSubscription`, `CommitTracker`
//!
//! `CommitTracker` implements the submission crate's `CommitNotifier`, so a
//! connected hub is what makes "wait for commit" possible.

pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use application::{
    ChannelEventHub, CommitTracker, CommitTrackerStats, EventSubscription, RegistrationStream,
};
pub use application::subscription::EventResult;
pub use config::EventHubConfig;
pub use domain::errors::{DeliverError, EventHubError};
pub use domain::registration::{ConnectOptions, EventRegistration, RegistrationId};
pub use ports::outbound::{BlockStream, EventSource};
pub use shared_bus::ChannelEvent;
