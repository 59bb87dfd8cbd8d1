//! # Development Network Configuration

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevnetConfig {
    /// Distinct valid endorsements a transaction needs to commit as valid.
    pub min_endorsements: usize,

    /// Blocks buffered per live deliver stream before it lags.
    pub block_capacity: usize,

    /// Id the OEM contract is installed under.
    pub chaincode: String,
}

impl Default for DevnetConfig {
    fn default() -> Self {
        Self {
            min_endorsements: 1,
            block_capacity: 256,
            chaincode: "oemcc".to_string(),
        }
    }
}

impl DevnetConfig {
    /// Small buffers so lag paths are reachable in tests.
    pub fn for_testing() -> Self {
        Self {
            block_capacity: 16,
            ..Self::default()
        }
    }
}
