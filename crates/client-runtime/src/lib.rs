//! # OEM Client Runtime
//!
//! Library half of the `oemctl` binary: configuration, logging, command
//! line and the commands themselves.
//!
//! ```text
//! oemctl.toml ─┐
//! OEM_* env  ──┼──→ RuntimeConfig ──→ Session ──→ invoke / query / listen
//! flags      ──┘          │
//!                         └──────────→ Gateway ──→ gateway submit / evaluate
//! ```
//!
//! ## Modules
//!
//! - `config`: layered configuration (file, environment, flags)
//! - `cli`: clap command definitions
//! - `logging`: tracing subscriber on stderr, text or JSON
//! - `transport`: remote RPC or in-process development network
//! - `commands`: one module per subcommand
//! - `exit`: error chain to process exit code

pub mod cli;
pub mod commands;
pub mod config;
pub mod exit;
pub mod logging;
pub mod transport;

pub use cli::Cli;
pub use config::{ConfigError, NetworkMode, RuntimeConfig};
