//! Secret store boundary.
//!
//! # Data Flow
//! ```text
//! LevelResolver
//!     → SecretStore::host_secrets()          (every resolution with a key)
//!     → SecretStore::function_secrets(name)  (only if host tiers missed)
//!
//! Providers:
//!     → memory.rs (in-process, replace-on-write)
//!     → file.rs   (JSON files re-read on each call)
//! ```
//!
//! # Design Decisions
//! - Stores must tolerate concurrent reads; resolvers share one `Arc<dyn SecretStore>`
//! - No caching at this layer; a provider may cache internally if it wants to
//! - `Debug` output of secret sets lists key names only

pub mod file;
pub mod memory;

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

pub use file::FileSecretStore;
pub use memory::InMemorySecretStore;

/// Errors a secret backend can report.
#[derive(Debug, Error)]
pub enum SecretStoreError {
    /// Reading the backing storage failed.
    #[error("secret storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored secrets could not be decoded.
    #[error("malformed secret document: {0}")]
    Parse(#[from] serde_json::Error),

    /// Host secrets have never been provisioned.
    #[error("host secrets not found")]
    HostSecretsNotFound,

    /// The backend is unreachable or refused the request.
    #[error("secret backend unavailable: {0}")]
    Unavailable(String),
}

/// Process-wide secrets.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct HostSecrets {
    pub master_key: Option<String>,
    pub system_keys: HashMap<String, String>,
    pub function_keys: HashMap<String, String>,
}

impl HostSecrets {
    pub fn with_master_key(mut self, key: impl Into<String>) -> Self {
        self.master_key = Some(key.into());
        self
    }

    pub fn with_system_key(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.system_keys.insert(name.into(), value.into());
        self
    }

    pub fn with_function_key(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.function_keys.insert(name.into(), value.into());
        self
    }
}

impl fmt::Debug for HostSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostSecrets")
            .field("master_key", &self.master_key.as_ref().map(|_| "[REDACTED]"))
            .field("system_keys", &self.system_keys.keys().collect::<Vec<_>>())
            .field("function_keys", &self.function_keys.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Secrets scoped to one named function.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct FunctionSecrets {
    pub keys: HashMap<String, String>,
}

impl FunctionSecrets {
    pub fn with_key(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.keys.insert(name.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl fmt::Debug for FunctionSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionSecrets")
            .field("keys", &self.keys.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Source of host and per-function secrets.
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Fetch the process-wide secret set.
    async fn host_secrets(&self) -> Result<HostSecrets, SecretStoreError>;

    /// Fetch the secrets for one function. Unknown functions yield an empty set.
    async fn function_secrets(&self, function_name: &str) -> Result<FunctionSecrets, SecretStoreError>;
}
