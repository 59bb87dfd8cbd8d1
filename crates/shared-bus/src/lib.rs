//! # Shared Bus - Channel Event Bus
//!
//! In-memory broadcast bus that carries the events a peer's deliver service
//! produces to every registration made on a channel event hub.
//!
//! ## Fan-out
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │ Event Source │                    │ Registration │
//! │ (deliver)    │    publish()       │   stream     │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe(filter)
//! ```
//!
//! ## Delivery
//!
//! - Best effort: a subscriber that falls more than the channel capacity
//!   behind loses the oldest events.
//! - A subscription only sees events published after it was created.
//! - `Disconnected` lifecycle events reach every subscriber regardless of
//!   its filter.

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::{ChannelEvent, EventFilter, EventTopic};
pub use publisher::{BusStats, ChannelEventBus, EventPublisher};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Events buffered per subscription before the oldest are dropped. A block
/// of `n` transactions publishes up to `2n + 1` events.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 4096;
