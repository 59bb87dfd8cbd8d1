//! # OEM Chaincode Payloads
//!
//! JSON shapes produced by the OEM requirements chaincode: world-state
//! records and chaincode event payloads. Field names match the deployed
//! chaincode byte for byte, including its `createime` spelling and the
//! capitalised `CreateTime` key on stored requirements.

use crate::entities::ChaincodeEvent;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Event names emitted by the OEM chaincode.
pub mod event_names {
    pub const NEW_ASSET: &str = "newAsset";
    pub const ASSET_SHARED: &str = "assetShared";
    pub const ASSET_MODIFIED: &str = "assetModified";
    pub const ASSET_ACCESSED: &str = "assetAccessed";
}

/// Full name of an asset owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    #[serde(rename = "firstname")]
    pub first_name: String,
    #[serde(rename = "lastname")]
    pub last_name: String,
}

impl Owner {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }
}

/// Lifecycle status of a requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequirementStatus {
    Created,
    Shared,
}

/// A requirement asset as stored in world state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub id: String,
    pub owner: Owner,
    #[serde(rename = "contentid")]
    pub content_id: String,
    pub status: RequirementStatus,
    #[serde(rename = "CreateTime")]
    pub create_time: String,
    #[serde(rename = "sharetime", default)]
    pub share_time: String,
    #[serde(rename = "accesstime", default)]
    pub access_time: String,
    #[serde(rename = "depid")]
    pub dep_id: String,
    #[serde(rename = "isaccessed")]
    pub is_accessed: bool,
}

/// Text content of a requirement, stored under its own key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    #[serde(rename = "contentid")]
    pub id: String,
    pub text: String,
}

/// Dependent ids of a requirement, stored under their own key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependents {
    #[serde(rename = "depid")]
    pub id: String,
    #[serde(rename = "depids")]
    pub dep_ids: Vec<String>,
}

// =============================================================================
// EVENT PAYLOADS
// =============================================================================

/// Payload of `newAsset`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAssetPayload {
    #[serde(rename = "assetid")]
    pub asset_id: String,
    #[serde(rename = "createime")]
    pub create_time: String,
}

/// Payload of `assetAccessed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadAssetPayload {
    #[serde(rename = "assetid")]
    pub asset_id: String,
    #[serde(rename = "sharetime")]
    pub share_time: String,
    #[serde(rename = "readtime")]
    pub read_time: String,
}

/// Payload of `assetShared`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareAssetPayload {
    #[serde(rename = "assetid")]
    pub asset_id: String,
    #[serde(rename = "sharetime")]
    pub share_time: String,
    pub dependents: Vec<String>,
}

/// Payload of `assetModified`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependentsPayload {
    #[serde(rename = "source")]
    pub source_id: String,
    pub dependents: Vec<String>,
}

/// Decode a chaincode event payload as JSON.
pub fn decode_event<T: DeserializeOwned>(event: &ChaincodeEvent) -> Result<T, serde_json::Error> {
    serde_json::from_slice(&event.payload)
}
