//! # OEM Requirements Contract
//!
//! The requirements chaincode the OEM clients talk to. A requirement is
//! stored under its id and points at two side records: its text
//! (`Content`) and its dependent ids (`Dependents`).
//!
//! | Function          | Arguments                 | Event           |
//! |-------------------|---------------------------|-----------------|
//! | `NewAsset`        | id, owner JSON, text      | `newAsset`      |
//! | `ShareAsset`      | id, owner JSON            |                 |
//! | `ShareAssetsBulk` | ids JSON array, owner JSON| `assetShared`   |
//! | `CreateDependent` | from id, to ids JSON array|                 |
//! | `UpdateValue`     | id, text                  | `assetModified` |
//! | `ReadAsset`       | id                        | `assetAccessed` (first read only) |
//! | `GetAsset`        | id                        |                 |
//!
//! Side records are keyed by the proposal timestamp and the owning id, so
//! every endorser derives the same keys and two assets created in the same
//! second never share a record.

use crate::domain::errors::ChaincodeError;
use crate::domain::stub::ChaincodeStub;
use crate::ports::outbound::Chaincode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::payloads::{
    event_names, Content, Dependents, DependentsPayload, NewAssetPayload, Owner, ReadAssetPayload,
    Requirement, RequirementStatus, ShareAssetPayload,
};
use shared_types::ChaincodeId;

pub struct OemContract {
    id: ChaincodeId,
}

impl OemContract {
    pub const DEFAULT_ID: &'static str = "oemcc";

    pub fn new(id: impl Into<ChaincodeId>) -> Self {
        Self { id: id.into() }
    }
}

impl Default for OemContract {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ID)
    }
}

fn content_key(timestamp: i64, id: &str) -> String {
    format!("content-{timestamp}-{id}")
}

fn dependents_key(timestamp: i64, id: &str) -> String {
    format!("deps-{timestamp}-{id}")
}

// =============================================================================
// ARGUMENTS
// =============================================================================

fn expect_args(args: &[Vec<u8>], expected: usize) -> Result<(), ChaincodeError> {
    if args.len() != expected {
        return Err(ChaincodeError::ArgumentCount {
            expected,
            received: args.len(),
        });
    }
    Ok(())
}

fn arg_str(args: &[Vec<u8>], index: usize) -> Result<&str, ChaincodeError> {
    std::str::from_utf8(&args[index]).map_err(|e| ChaincodeError::InvalidArgument {
        position: index,
        reason: e.to_string(),
    })
}

fn arg_json<T: DeserializeOwned>(args: &[Vec<u8>], index: usize) -> Result<T, ChaincodeError> {
    serde_json::from_slice(&args[index]).map_err(|e| ChaincodeError::InvalidArgument {
        position: index,
        reason: format!("Value did not match schema: {e}"),
    })
}

fn to_json<T: Serialize>(value: &T) -> Result<Vec<u8>, ChaincodeError> {
    serde_json::to_vec(value).map_err(|_| ChaincodeError::failed("Unable to marshal to JSON"))
}

fn emit<T: Serialize>(stub: &mut ChaincodeStub<'_>, name: &str, payload: &T) -> Result<(), ChaincodeError> {
    let bytes = serde_json::to_vec(payload)
        .map_err(|_| ChaincodeError::failed("Unable to marshal event payload to JSON"))?;
    stub.set_event(name, bytes)
}

// =============================================================================
// STATE HELPERS
// =============================================================================

fn load_requirement(
    stub: &mut ChaincodeStub<'_>,
    id: &str,
    missing: impl FnOnce() -> String,
) -> Result<Requirement, ChaincodeError> {
    let bytes = stub
        .get_state(id)?
        .ok_or_else(|| ChaincodeError::Failed(missing()))?;
    serde_json::from_slice(&bytes).map_err(|_| {
        ChaincodeError::failed(format!(
            "Data retrieved from world state for key {id} was not of type Requirement"
        ))
    })
}

fn store_requirement(stub: &mut ChaincodeStub<'_>, requirement: &Requirement) -> Result<(), ChaincodeError> {
    let bytes = to_json(requirement)?;
    stub.put_state(&requirement.id, bytes)
}

/// Dependent ids behind `key`; none when the record is missing or unreadable.
fn load_dependents(stub: &mut ChaincodeStub<'_>, key: &str) -> Result<Vec<String>, ChaincodeError> {
    if key.is_empty() {
        return Ok(Vec::new());
    }
    Ok(stub
        .get_state(key)?
        .and_then(|bytes| serde_json::from_slice::<Dependents>(&bytes).ok())
        .map(|d| d.dep_ids)
        .unwrap_or_default())
}

// =============================================================================
// TRANSACTIONS
// =============================================================================

impl OemContract {
    fn new_asset(
        &self,
        stub: &mut ChaincodeStub<'_>,
        id: &str,
        owner: Owner,
        text: &str,
    ) -> Result<(), ChaincodeError> {
        if stub.get_state(id)?.is_some() {
            return Err(ChaincodeError::failed(format!(
                "Asset with id {id}, already exists"
            )));
        }

        let timestamp = stub.tx_timestamp();
        let content = Content {
            id: content_key(timestamp, id),
            text: text.to_string(),
        };
        stub.put_state(&content.id, to_json(&content)?)?;

        let dependents = Dependents {
            id: dependents_key(timestamp, id),
            dep_ids: Vec::new(),
        };
        stub.put_state(&dependents.id, to_json(&dependents)?)?;

        let create_time = timestamp.to_string();
        store_requirement(
            stub,
            &Requirement {
                id: id.to_string(),
                owner,
                content_id: content.id,
                status: RequirementStatus::Created,
                create_time: create_time.clone(),
                share_time: String::new(),
                access_time: String::new(),
                dep_id: dependents.id,
                is_accessed: false,
            },
        )?;

        emit(
            stub,
            event_names::NEW_ASSET,
            &NewAssetPayload {
                asset_id: id.to_string(),
                create_time,
            },
        )
    }

    /// Hand `id` to `owner`; returns the asset's dependent ids.
    fn share_asset(
        &self,
        stub: &mut ChaincodeStub<'_>,
        id: &str,
        owner: &Owner,
    ) -> Result<Vec<String>, ChaincodeError> {
        let mut requirement =
            load_requirement(stub, id, || format!("Unable to find asset with id {id}"))?;
        requirement.owner = owner.clone();
        requirement.status = RequirementStatus::Shared;
        requirement.share_time = stub.tx_timestamp().to_string();
        store_requirement(stub, &requirement)?;

        load_dependents(stub, &requirement.dep_id)
    }

    /// Share every id in one transaction. Each share sets `assetShared`, so
    /// the committed event describes the last id.
    fn share_assets_bulk(
        &self,
        stub: &mut ChaincodeStub<'_>,
        ids: &[String],
        owner: &Owner,
    ) -> Result<(), ChaincodeError> {
        for id in ids {
            let dependents = self.share_asset(stub, id, owner)?;
            let payload = ShareAssetPayload {
                asset_id: id.clone(),
                share_time: stub.tx_timestamp().to_string(),
                dependents,
            };
            emit(stub, event_names::ASSET_SHARED, &payload)?;
        }
        Ok(())
    }

    fn create_dependent(
        &self,
        stub: &mut ChaincodeStub<'_>,
        from_id: &str,
        to_ids: Vec<String>,
    ) -> Result<Requirement, ChaincodeError> {
        let mut start =
            load_requirement(stub, from_id, || format!("Unable to find the asset with {from_id}"))?;

        let dependents = Dependents {
            id: dependents_key(stub.tx_timestamp(), from_id),
            dep_ids: to_ids,
        };
        stub.put_state(&dependents.id, to_json(&dependents)?)?;

        start.dep_id = dependents.id;
        store_requirement(stub, &start)?;
        Ok(start)
    }

    fn update_value(
        &self,
        stub: &mut ChaincodeStub<'_>,
        id: &str,
        text: &str,
    ) -> Result<(), ChaincodeError> {
        let requirement =
            load_requirement(stub, id, || format!("Unable to find asset with id {id}"))?;

        let mut content = stub
            .get_state(&requirement.content_id)?
            .and_then(|bytes| serde_json::from_slice::<Content>(&bytes).ok())
            .unwrap_or_else(|| Content {
                id: requirement.content_id.clone(),
                text: String::new(),
            });
        content.text = text.to_string();
        stub.put_state(&requirement.content_id, to_json(&content)?)?;

        let dependents = load_dependents(stub, &requirement.dep_id)?;
        emit(
            stub,
            event_names::ASSET_MODIFIED,
            &DependentsPayload {
                source_id: requirement.id,
                dependents,
            },
        )
    }

    /// Return the asset; the first read after creation marks it accessed
    /// and raises `assetAccessed`.
    fn read_asset(&self, stub: &mut ChaincodeStub<'_>, id: &str) -> Result<Requirement, ChaincodeError> {
        let mut requirement = load_requirement(stub, id, || {
            format!("Cannot read world state pair with key {id}. Does not exist")
        })?;

        if !requirement.is_accessed {
            let read_time = stub.tx_timestamp().to_string();
            requirement.is_accessed = true;
            requirement.access_time = read_time.clone();
            store_requirement(stub, &requirement)?;
            emit(
                stub,
                event_names::ASSET_ACCESSED,
                &ReadAssetPayload {
                    asset_id: requirement.id.clone(),
                    share_time: requirement.share_time.clone(),
                    read_time,
                },
            )?;
        }
        Ok(requirement)
    }

    fn get_asset(&self, stub: &mut ChaincodeStub<'_>, id: &str) -> Result<Requirement, ChaincodeError> {
        load_requirement(stub, id, || {
            format!("Cannot read world state pair with key {id}. Does not exist")
        })
    }
}

impl Chaincode for OemContract {
    fn id(&self) -> &ChaincodeId {
        &self.id
    }

    fn invoke(
        &self,
        stub: &mut ChaincodeStub<'_>,
        function: &str,
        args: &[Vec<u8>],
    ) -> Result<Vec<u8>, ChaincodeError> {
        match function {
            "NewAsset" => {
                expect_args(args, 3)?;
                let owner = arg_json(args, 1)?;
                self.new_asset(stub, arg_str(args, 0)?, owner, arg_str(args, 2)?)?;
                Ok(Vec::new())
            }
            "ShareAsset" => {
                expect_args(args, 2)?;
                let owner: Owner = arg_json(args, 1)?;
                let dependents = self.share_asset(stub, arg_str(args, 0)?, &owner)?;
                to_json(&dependents)
            }
            "ShareAssetsBulk" => {
                expect_args(args, 2)?;
                let ids: Vec<String> = arg_json(args, 0)?;
                let owner: Owner = arg_json(args, 1)?;
                self.share_assets_bulk(stub, &ids, &owner)?;
                Ok(Vec::new())
            }
            "CreateDependent" => {
                expect_args(args, 2)?;
                let to_ids = arg_json(args, 1)?;
                let start = self.create_dependent(stub, arg_str(args, 0)?, to_ids)?;
                to_json(&start)
            }
            "UpdateValue" => {
                expect_args(args, 2)?;
                self.update_value(stub, arg_str(args, 0)?, arg_str(args, 1)?)?;
                Ok(Vec::new())
            }
            "ReadAsset" => {
                expect_args(args, 1)?;
                let requirement = self.read_asset(stub, arg_str(args, 0)?)?;
                to_json(&requirement)
            }
            "GetAsset" => {
                expect_args(args, 1)?;
                let requirement = self.get_asset(stub, arg_str(args, 0)?)?;
                to_json(&requirement)
            }
            other => Err(ChaincodeError::UnknownFunction {
                chaincode: self.id.to_string(),
                function: other.to_string(),
            }),
        }
    }
}
