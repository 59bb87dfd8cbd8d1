//! Outbound Ports (Driven Ports / SPI)

use fc_02_submission::{EndorsementTransport, OrderingService};
use fc_03_event_hub::EventSource;
use shared_types::PeerName;
use std::sync::Arc;

/// Everything a gateway needs to reach one network.
pub trait NetworkTransport: Send + Sync {
    fn endorser(&self) -> Arc<dyn EndorsementTransport>;

    fn orderer(&self) -> Arc<dyn OrderingService>;

    /// Deliver service of `peer`, if the transport can reach it.
    fn event_source(&self, peer: &PeerName) -> Option<Arc<dyn EventSource>>;
}
