//! # JSON-RPC Client
//!
//! One `reqwest::Client` shared by every endpoint of a network. Calls are
//! plain request/response; ids are a per-client counter.

use crate::config::RpcConfig;
use crate::domain::errors::RpcError;
use crate::domain::jsonrpc::{RpcRequest, RpcResponse};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

pub struct RpcClient {
    http: Client,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(config: &RpcConfig) -> Result<Self, RpcError> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| RpcError::Http {
                endpoint: "<client>".to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self::with_client(http))
    }

    pub fn with_client(http: Client) -> Self {
        Self {
            http,
            next_id: AtomicU64::new(1),
        }
    }

    pub async fn call<P, R>(&self, endpoint: &Url, method: &str, params: P) -> Result<R, RpcError>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = RpcRequest::new(id, method, params);
        trace!(%endpoint, method, id, "RPC call");

        let response = self
            .http
            .post(endpoint.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| RpcError::Http {
                endpoint: endpoint.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let body: RpcResponse<R> = response.json().await.map_err(|e| RpcError::Decode {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        body.into_result(endpoint.as_str())
    }
}
