//! Minimum-endorsement policy gating the ordering phase.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How many target peers must endorse before a transaction is ordered.
///
/// Never fewer than one: a transaction without endorsements is never ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EndorsementPolicy {
    AtLeast(usize),
    Majority,
    All,
}

impl Default for EndorsementPolicy {
    fn default() -> Self {
        EndorsementPolicy::AtLeast(1)
    }
}

impl EndorsementPolicy {
    /// Endorsements required out of `targets`.
    #[must_use]
    pub fn required(&self, targets: usize) -> usize {
        let required = match self {
            EndorsementPolicy::AtLeast(n) => *n,
            EndorsementPolicy::Majority => targets / 2 + 1,
            EndorsementPolicy::All => targets,
        };
        required.max(1)
    }

    #[must_use]
    pub fn is_satisfied(&self, endorsed: usize, targets: usize) -> bool {
        endorsed >= self.required(targets)
    }
}

impl fmt::Display for EndorsementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndorsementPolicy::AtLeast(n) => write!(f, "{n}"),
            EndorsementPolicy::Majority => f.write_str("majority"),
            EndorsementPolicy::All => f.write_str("all"),
        }
    }
}

impl FromStr for EndorsementPolicy {
    type Err = String;

    /// Accepts `all`, `majority`, `any` (one) or a number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(EndorsementPolicy::All),
            "majority" => Ok(EndorsementPolicy::Majority),
            "any" => Ok(EndorsementPolicy::AtLeast(1)),
            other => match other.parse::<usize>() {
                Ok(0) => Err("endorsement policy must require at least one endorsement".into()),
                Ok(n) => Ok(EndorsementPolicy::AtLeast(n)),
                Err(_) => Err(format!(
                    "invalid endorsement policy {s:?}: expected all, majority, any or a number"
                )),
            },
        }
    }
}

impl TryFrom<String> for EndorsementPolicy {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EndorsementPolicy> for String {
    fn from(policy: EndorsementPolicy) -> Self {
        policy.to_string()
    }
}
