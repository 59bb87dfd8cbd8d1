//! # Event Hub Configuration

use crate::domain::registration::ConnectOptions;
use serde::{Deserialize, Serialize};
use shared_bus::DEFAULT_CHANNEL_CAPACITY;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventHubConfig {
    /// Events buffered per registration before the oldest are dropped.
    pub bus_capacity: usize,

    /// Deliver chaincode event payloads, not just names.
    pub full_block: bool,

    /// First block to replay on connect; unset means new blocks only.
    pub start_block: Option<u64>,
}

impl Default for EventHubConfig {
    fn default() -> Self {
        Self {
            bus_capacity: DEFAULT_CHANNEL_CAPACITY,
            full_block: true,
            start_block: None,
        }
    }
}

impl EventHubConfig {
    #[must_use]
    pub fn connect_options(&self) -> ConnectOptions {
        ConnectOptions {
            full_block: self.full_block,
            start_block: self.start_block,
        }
    }
}
