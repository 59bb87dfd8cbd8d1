//! # FC-01: Client and Identity Bootstrap
//!
//! Turns a connection profile and a wallet into the explicit context
//! objects the rest of the client works with.
//!
//! ## Architecture
//!
//! - **Domain**: `ConnectionProfile`, `ClientProfile`, `WalletIdentity`, errors
//! - **Ports**: Outbound `Wallet`
//! - **Adapters**: `FileSystemWallet`, `InMemoryWallet`
//! - **Application**: `ClientContext`, `ChannelContext`
//!
//! ## Failure Modes
//!
//! Bootstrap is deterministic: it either yields a ready `ClientContext` or a
//! `BootstrapError` whose [`exit_code`](BootstrapError::exit_code) tells the
//! binary how to exit. Nothing touches the network here.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use adapters::{FileSystemWallet, InMemoryWallet};
pub use application::context::{ChannelContext, ChannelPeer, ClientContext, OrdererEndpoint};
pub use config::BootstrapConfig;
pub use domain::errors::{exit_codes, BootstrapError, ProfileError, WalletError};
pub use domain::profile::{
    ChannelConfig, ChannelPeerRoles, ClientProfile, ClientSection, ConnectionProfile,
    CredentialStore, EndpointConfig, OrganizationConfig,
};
pub use domain::wallet::WalletIdentity;
pub use ports::outbound::Wallet;
