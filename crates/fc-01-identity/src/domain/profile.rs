//! # Connection and Client Profiles
//!
//! The network description a client boots from. Profiles are YAML or JSON
//! documents with camelCase keys, in the layout the platform tooling
//! generates:
//!
//! ```yaml
//! name: oem-network
//! client:
//!   organization: Requirements
//!   credentialStore:
//!     path: ./user-wallet
//! channels:
//!   oem-channel:
//!     orderers: [orderer.oem.com]
//!     peers:
//!       peer0.oem.requirements.com:
//!         endorsingPeer: true
//!         eventSource: true
//! organizations:
//!   Requirements:
//!     mspid: RequirementsMSP
//!     peers: [peer0.oem.requirements.com]
//! orderers:
//!   orderer.oem.com:
//!     url: http://localhost:7050
//! peers:
//!   peer0.oem.requirements.com:
//!     url: http://localhost:7051
//! ```

use crate::domain::errors::ProfileError;
use serde::{Deserialize, Serialize};
use shared_types::{MspId, PeerName};
use std::collections::BTreeMap;
use std::path::Path;

fn default_true() -> bool {
    true
}

/// Client section: which organization the client acts for and where its
/// credentials live.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSection {
    #[serde(default)]
    pub organization: Option<String>,
    #[serde(default)]
    pub credential_store: Option<CredentialStore>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialStore {
    pub path: String,
}

/// Roles a peer plays on one channel. Every role defaults to enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelPeerRoles {
    #[serde(default = "default_true")]
    pub endorsing_peer: bool,
    #[serde(default = "default_true")]
    pub chaincode_query: bool,
    #[serde(default = "default_true")]
    pub ledger_query: bool,
    #[serde(default = "default_true")]
    pub event_source: bool,
}

impl Default for ChannelPeerRoles {
    fn default() -> Self {
        Self {
            endorsing_peer: true,
            chaincode_query: true,
            ledger_query: true,
            event_source: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelConfig {
    #[serde(default)]
    pub orderers: Vec<String>,
    #[serde(default)]
    pub peers: BTreeMap<String, ChannelPeerRoles>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationConfig {
    pub mspid: String,
    #[serde(default)]
    pub peers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub url: String,
}

/// A full connection profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub client: ClientSection,
    #[serde(default)]
    pub channels: BTreeMap<String, ChannelConfig>,
    #[serde(default)]
    pub organizations: BTreeMap<String, OrganizationConfig>,
    #[serde(default)]
    pub orderers: BTreeMap<String, EndpointConfig>,
    #[serde(default)]
    pub peers: BTreeMap<String, EndpointConfig>,
}

/// A per-organization client profile, merged over a connection profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientProfile {
    #[serde(default)]
    pub name: Option<String>,
    pub client: ClientSection,
}

// =============================================================================
// LOADING
// =============================================================================

enum Format {
    Yaml,
    Json,
}

fn format_of(path: &Path) -> Result<Format, ProfileError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => Ok(Format::Yaml),
        Some("json") => Ok(Format::Json),
        _ => Err(ProfileError::UnsupportedFormat {
            path: path.display().to_string(),
        }),
    }
}

fn read(path: &Path) -> Result<String, ProfileError> {
    std::fs::read_to_string(path).map_err(|e| ProfileError::Read {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn parse<T: serde::de::DeserializeOwned>(path: &Path, text: &str) -> Result<T, ProfileError> {
    let parsed = match format_of(path)? {
        Format::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
        Format::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
    };
    parsed.map_err(|reason| ProfileError::Parse {
        path: path.display().to_string(),
        reason,
    })
}

impl ConnectionProfile {
    /// Load a profile, choosing the parser by file extension.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProfileError> {
        let path = path.as_ref();
        let profile: Self = parse(path, &read(path)?)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ProfileError> {
        let profile: Self = serde_yaml::from_str(text).map_err(|e| ProfileError::Parse {
            path: "<inline>".into(),
            reason: e.to_string(),
        })?;
        profile.validate()?;
        Ok(profile)
    }

    /// Merge a client profile: its client section replaces this one's.
    pub fn merge_client(&mut self, client: ClientProfile) {
        if client.client.organization.is_some() {
            self.client.organization = client.client.organization;
        }
        if client.client.credential_store.is_some() {
            self.client.credential_store = client.client.credential_store;
        }
    }

    /// Every peer and orderer a channel or organization names must be defined.
    pub fn validate(&self) -> Result<(), ProfileError> {
        for (channel, config) in &self.channels {
            for peer in config.peers.keys() {
                if !self.peers.contains_key(peer) {
                    return Err(ProfileError::UndefinedPeer {
                        peer: peer.clone(),
                        referenced_by: channel.clone(),
                    });
                }
            }
            for orderer in &config.orderers {
                if !self.orderers.contains_key(orderer) {
                    return Err(ProfileError::UndefinedOrderer {
                        orderer: orderer.clone(),
                        referenced_by: channel.clone(),
                    });
                }
            }
        }
        for (org, config) in &self.organizations {
            for peer in &config.peers {
                if !self.peers.contains_key(peer) {
                    return Err(ProfileError::UndefinedPeer {
                        peer: peer.clone(),
                        referenced_by: org.clone(),
                    });
                }
            }
        }
        if let Some(org) = &self.client.organization {
            if !self.organizations.contains_key(org) {
                return Err(ProfileError::UndefinedOrganization(org.clone()));
            }
        }
        Ok(())
    }

    /// The organization the client acts for.
    pub fn client_organization(&self) -> Option<(&str, &OrganizationConfig)> {
        let name = self.client.organization.as_deref()?;
        self.organizations
            .get_key_value(name)
            .map(|(k, v)| (k.as_str(), v))
    }

    pub fn client_msp_id(&self) -> Option<MspId> {
        self.client_organization()
            .map(|(_, org)| MspId::new(org.mspid.clone()))
    }

    pub fn channel(&self, name: &str) -> Option<&ChannelConfig> {
        self.channels.get(name)
    }

    pub fn peer_url(&self, peer: &PeerName) -> Option<&str> {
        self.peers.get(peer.as_str()).map(|p| p.url.as_str())
    }

    pub fn orderer_url(&self, orderer: &str) -> Option<&str> {
        self.orderers.get(orderer).map(|o| o.url.as_str())
    }

    /// The organization that lists `peer`, if any.
    pub fn organization_of(&self, peer: &PeerName) -> Option<&str> {
        self.organizations
            .iter()
            .find(|(_, org)| org.peers.iter().any(|p| p == peer.as_str()))
            .map(|(name, _)| name.as_str())
    }
}

impl ClientProfile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProfileError> {
        let path = path.as_ref();
        parse(path, &read(path)?)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    pub const PROFILE_YAML: &str = r#"
name: oem-network
version: "1.0"
client:
  organization: Requirements
  credentialStore:
    path: ./user-wallet
channels:
  oem-channel:
    orderers:
      - orderer.oem.com
    peers:
      peer0.oem.requirements.com:
        endorsingPeer: true
        eventSource: true
      peer0.oem.designgroup.com:
        eventSource: false
organizations:
  Requirements:
    mspid: RequirementsMSP
    peers:
      - peer0.oem.requirements.com
  DesignGroup:
    mspid: DesignGroupMSP
    peers:
      - peer0.oem.designgroup.com
orderers:
  orderer.oem.com:
    url: http://localhost:7050
peers:
  peer0.oem.requirements.com:
    url: http://localhost:7051
  peer0.oem.designgroup.com:
    url: http://localhost:9051
"#;
}
