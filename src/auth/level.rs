//! Authorization tiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ranked credential tier.
///
/// The derive order is the ranking: `Anonymous < Function < System < Admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorizationLevel {
    Anonymous,
    Function,
    System,
    Admin,
}

impl AuthorizationLevel {
    /// Returns true if a caller holding `self` may access an operation requiring `required`.
    pub fn satisfies(self, required: AuthorizationLevel) -> bool {
        self >= required
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AuthorizationLevel::Anonymous => "anonymous",
            AuthorizationLevel::Function => "function",
            AuthorizationLevel::System => "system",
            AuthorizationLevel::Admin => "admin",
        }
    }
}

impl fmt::Display for AuthorizationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A route declared a required level that does not exist.
///
/// Raised while the route table is built, never per request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized authorization level '{level}'")]
pub struct MisconfiguredRequirement {
    pub level: String,
}

impl FromStr for AuthorizationLevel {
    type Err = MisconfiguredRequirement;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anonymous" => Ok(AuthorizationLevel::Anonymous),
            "function" => Ok(AuthorizationLevel::Function),
            "system" => Ok(AuthorizationLevel::System),
            "admin" => Ok(AuthorizationLevel::Admin),
            _ => Err(MisconfiguredRequirement { level: s.to_string() }),
        }
    }
}
