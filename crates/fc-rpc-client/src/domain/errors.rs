//! RPC transport errors.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RpcError {
    #[error("Invalid endpoint URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Connection refused, timed out or reset.
    #[error("HTTP request to {endpoint} failed: {reason}")]
    Http { endpoint: String, reason: String },

    #[error("{endpoint} answered HTTP {status}")]
    Status { endpoint: String, status: u16 },

    /// The server answered with a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Remote { code: i32, message: String },

    #[error("Malformed response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },

    #[error("Response from {endpoint} has neither result nor error")]
    MissingResult { endpoint: String },
}

impl RpcError {
    /// True when the endpoint was never reached.
    #[must_use]
    pub fn is_connection_failure(&self) -> bool {
        matches!(self, Self::Http { .. } | Self::InvalidUrl { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_failure_classification() {
        let http = RpcError::Http {
            endpoint: "http://localhost:7051".into(),
            reason: "connection refused".into(),
        };
        assert!(http.is_connection_failure());
        assert!(!RpcError::Remote {
            code: -32601,
            message: "Method not found".into()
        }
        .is_connection_failure());
    }
}
