//! # Runtime Configuration
//!
//! One TOML file, then `OEM_*` environment variables, then command line
//! flags; each layer overrides the one before. `validate()` runs last.
//!
//! ```toml
//! channel = "oem-channel"
//! chaincode = "oemcc"
//! peer = "peer0.oem.requirements.com"
//! network = "rpc"
//!
//! [bootstrap]
//! connection_profile = "../profiles/aws-dev-connection.yaml"
//! client_profile = "../profiles/requirements-client.yaml"
//! identity = "Admin@requirements.oem.com"
//!
//! [submission]
//! policy = "1"
//! wait_for_commit = true
//!
//! [log]
//! level = "info"
//! ```

use crate::cli::GlobalArgs;
use clap::ValueEnum;
use fc_01_identity::BootstrapConfig;
use fc_02_submission::{EndorsementPolicy, SubmissionConfig};
use fc_03_event_hub::EventHubConfig;
use fc_04_gateway::GatewayConfig;
use fc_devnet::DevnetConfig;
use fc_rpc_client::RpcConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Cannot parse config file {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("Invalid value for {var}: {reason}")]
    InvalidEnv { var: String, reason: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Where endorsements, ordering and events go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NetworkMode {
    /// Remote peers and orderer from the connection profile, over JSON-RPC.
    #[default]
    Rpc,
    /// An in-process network built from the connection profile. Its ledger
    /// lives as long as the command.
    Devnet,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive, e.g. `info` or `fc_02_submission=debug`.
    pub level: String,
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub channel: String,
    pub chaincode: String,
    /// Target peer for client-level invokes, queries and listeners.
    pub peer: String,
    pub network: NetworkMode,
    pub bootstrap: BootstrapConfig,
    pub submission: SubmissionConfig,
    pub event_hub: EventHubConfig,
    /// Discovery, commit strategy and policy for `gateway` commands.
    /// Identity, channel and chaincode always come from the top level.
    pub gateway: GatewayConfig,
    pub rpc: RpcConfig,
    pub devnet: DevnetConfig,
    pub log: LogConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            channel: "oem-channel".to_string(),
            chaincode: "oemcc".to_string(),
            peer: "peer0.oem.requirements.com".to_string(),
            network: NetworkMode::default(),
            bootstrap: BootstrapConfig::default(),
            submission: SubmissionConfig::default(),
            event_hub: EventHubConfig::default(),
            gateway: GatewayConfig::default(),
            rpc: RpcConfig::default(),
            devnet: DevnetConfig::default(),
            log: LogConfig::default(),
        }
    }
}

fn parse_env<T: std::str::FromStr>(var: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::InvalidEnv {
        var: var.to_string(),
        reason: e.to_string(),
    })
}

impl RuntimeConfig {
    /// Full resolution for the binary: file, process environment, flags.
    pub fn resolve(args: &GlobalArgs) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_env(|var| std::env::var(var).ok())?;
        config.apply_args(args);
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&text).map_err(|e| match e {
            ConfigError::Parse { reason, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse {
            path: "<inline>".to_string(),
            reason: e.to_string(),
        })
    }

    /// Apply `OEM_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("OEM_PROFILE") {
            self.bootstrap.connection_profile = PathBuf::from(v);
        }
        if let Some(v) = lookup("OEM_CLIENT_PROFILE") {
            self.bootstrap.client_profile = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("OEM_WALLET") {
            self.bootstrap.wallet_path = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("OEM_IDENTITY") {
            self.bootstrap.identity = v;
        }
        if let Some(v) = lookup("OEM_CHANNEL") {
            self.channel = v;
        }
        if let Some(v) = lookup("OEM_CHAINCODE") {
            self.chaincode = v;
        }
        if let Some(v) = lookup("OEM_PEER") {
            self.peer = v;
        }
        if let Some(v) = lookup("OEM_NETWORK") {
            self.network = NetworkMode::from_str(&v, true).map_err(|reason| {
                ConfigError::InvalidEnv {
                    var: "OEM_NETWORK".to_string(),
                    reason,
                }
            })?;
        }
        if let Some(v) = lookup("OEM_POLICY") {
            let policy: EndorsementPolicy = parse_env("OEM_POLICY", &v)?;
            self.submission.policy = policy;
            self.gateway.policy = policy;
        }
        if let Some(v) = lookup("OEM_COMMIT_TIMEOUT_MS") {
            self.submission.commit_timeout_ms = parse_env("OEM_COMMIT_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = lookup("OEM_LOG_LEVEL") {
            self.log.level = v;
        }
        if let Some(v) = lookup("OEM_LOG_JSON") {
            self.log.json = parse_env("OEM_LOG_JSON", &v)?;
        }
        Ok(())
    }

    /// Apply flags given on the command line.
    pub fn apply_args(&mut self, args: &GlobalArgs) {
        if let Some(v) = &args.profile {
            self.bootstrap.connection_profile = v.clone();
        }
        if let Some(v) = &args.client_profile {
            self.bootstrap.client_profile = Some(v.clone());
        }
        if let Some(v) = &args.wallet {
            self.bootstrap.wallet_path = Some(v.clone());
        }
        if let Some(v) = &args.identity {
            self.bootstrap.identity = v.clone();
        }
        if let Some(v) = &args.channel {
            self.channel = v.clone();
        }
        if let Some(v) = &args.chaincode {
            self.chaincode = v.clone();
        }
        if let Some(v) = &args.peer {
            self.peer = v.clone();
        }
        if let Some(v) = args.network {
            self.network = v;
        }
        if let Some(v) = args.policy {
            self.submission.policy = v;
            self.gateway.policy = v;
        }
        if args.log_json {
            self.log.json = true;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("channel", &self.channel),
            ("chaincode", &self.chaincode),
            ("peer", &self.peer),
            ("bootstrap.identity", &self.bootstrap.identity),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{name} must not be empty")));
            }
        }
        if self.submission.wait_for_commit && self.submission.commit_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "submission.commit_timeout_ms must be positive when waiting for commit".into(),
            ));
        }
        if self.rpc.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("rpc.poll_interval_ms must be positive".into()));
        }
        Ok(())
    }

    /// Gateway settings with the top-level identity, channel and chaincode.
    #[must_use]
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            identity: self.bootstrap.identity.clone(),
            channel: self.channel.clone(),
            chaincode: self.chaincode.clone(),
            ..self.gateway.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = RuntimeConfig::default();
        assert_eq!(config.network, NetworkMode::Rpc);
        config.validate().unwrap();
    }

    #[test]
    fn test_toml_sections_override_defaults() {
        let config = RuntimeConfig::from_toml_str(
            r#"
            channel = "oem-channel"
            network = "devnet"

            [bootstrap]
            connection_profile = "/etc/oem/connection.yaml"
            identity = "User1@designgroup.oem.com"

            [submission]
            policy = "majority"
            wait_for_commit = true

            [gateway.commit_strategy]
            strategy = "none"
            "#,
        )
        .unwrap();
        assert_eq!(config.network, NetworkMode::Devnet);
        assert_eq!(config.bootstrap.identity, "User1@designgroup.oem.com");
        assert_eq!(config.submission.policy, EndorsementPolicy::Majority);
        assert_eq!(config.gateway.commit_strategy, fc_04_gateway::CommitStrategy::None);
        assert_eq!(config.chaincode, "oemcc");
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = RuntimeConfig::from_toml_str(r#"channel = "from-file""#).unwrap();
        config
            .apply_env(env(&[
                ("OEM_CHANNEL", "from-env"),
                ("OEM_POLICY", "2"),
                ("OEM_LOG_LEVEL", "debug"),
            ]))
            .unwrap();
        assert_eq!(config.channel, "from-env");
        assert_eq!(config.submission.policy, EndorsementPolicy::AtLeast(2));
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn test_invalid_env_value_rejected() {
        let mut config = RuntimeConfig::default();
        let err = config
            .apply_env(env(&[("OEM_COMMIT_TIMEOUT_MS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { var, .. } if var == "OEM_COMMIT_TIMEOUT_MS"));
    }

    #[test]
    fn test_args_override_env() {
        let mut config = RuntimeConfig::default();
        config.apply_env(env(&[("OEM_PEER", "peer-from-env")])).unwrap();
        config.apply_args(&GlobalArgs {
            peer: Some("peer-from-flag".into()),
            ..GlobalArgs::default()
        });
        assert_eq!(config.peer, "peer-from-flag");
    }

    #[test]
    fn test_empty_channel_invalid() {
        let config = RuntimeConfig {
            channel: " ".into(),
            ..RuntimeConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_gateway_config_uses_top_level_names() {
        let mut config = RuntimeConfig::default();
        config.chaincode = "simcc".into();
        assert_eq!(config.gateway_config().chaincode, "simcc");
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = RuntimeConfig::load(Path::new("/nonexistent/oemctl.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
