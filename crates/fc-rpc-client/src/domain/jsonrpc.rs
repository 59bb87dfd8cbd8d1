//! # JSON-RPC 2.0 Envelopes
//!
//! Method names served by peers and ordering services:
//!
//! | Method                 | Params                      | Result                 |
//! |------------------------|-----------------------------|------------------------|
//! | `peer_processProposal` | `[SignedProposal]`          | `ProposalResponse`     |
//! | `peer_blockHeight`     | `[]`                        | `u64`                  |
//! | `peer_blocksFrom`      | `[start, max]`              | `[Block]`              |
//! | `orderer_broadcast`    | `[TransactionEnvelope]`     | `BroadcastAck`         |

use crate::domain::errors::RpcError;
use serde::{Deserialize, Serialize};

pub const JSONRPC_VERSION: &str = "2.0";

pub mod methods {
    pub const PROCESS_PROPOSAL: &str = "peer_processProposal";
    pub const BLOCK_HEIGHT: &str = "peer_blockHeight";
    pub const BLOCKS_FROM: &str = "peer_blocksFrom";
    pub const BROADCAST: &str = "orderer_broadcast";
}

#[derive(Debug, Serialize)]
pub struct RpcRequest<'a, P: Serialize> {
    pub jsonrpc: &'static str,
    pub method: &'a str,
    pub params: P,
    pub id: u64,
}

impl<'a, P: Serialize> RpcRequest<'a, P> {
    pub fn new(id: u64, method: &'a str, params: P) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            method,
            params,
            id,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcErrorObject {
    pub code: i32,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct RpcResponse<T> {
    #[serde(default)]
    pub id: Option<u64>,
    pub result: Option<T>,
    pub error: Option<RpcErrorObject>,
}

impl<T> RpcResponse<T> {
    /// The result, or the remote error. An error object wins over a result.
    pub fn into_result(self, endpoint: &str) -> Result<T, RpcError> {
        if let Some(error) = self.error {
            return Err(RpcError::Remote {
                code: error.code,
                message: error.message,
            });
        }
        self.result.ok_or_else(|| RpcError::MissingResult {
            endpoint: endpoint.to_string(),
        })
    }
}
