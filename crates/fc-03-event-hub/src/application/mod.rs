//! Application layer: the hub, its subscription handles and the commit tracker.

pub mod commit_tracker;
pub mod hub;
pub mod subscription;

pub use commit_tracker::{CommitTracker, CommitTrackerStats};
pub use hub::ChannelEventHub;
pub use subscription::{EventSubscription, RegistrationStream};
