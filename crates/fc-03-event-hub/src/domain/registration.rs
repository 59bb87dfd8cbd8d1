//! Registration handles and connection options.

use crate::application::subscription::EventSubscription;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifies one registration on one hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegistrationId(Uuid);

impl RegistrationId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for RegistrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of a `register_*` call: the handle to unregister with, and the
/// stream of matching events.
pub struct EventRegistration {
    pub id: RegistrationId,
    pub stream: EventSubscription,
}

/// How the hub activates its event source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectOptions {
    /// Deliver chaincode event payloads. When false, events carry names only.
    pub full_block: bool,
    /// First block to deliver. `None` delivers only blocks committed after
    /// the connection is made.
    pub start_block: Option<u64>,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            full_block: true,
            start_block: None,
        }
    }
}

impl ConnectOptions {
    /// Replay from `block` onwards.
    #[must_use]
    pub fn from_block(block: u64) -> Self {
        Self {
            start_block: Some(block),
            ..Self::default()
        }
    }
}
