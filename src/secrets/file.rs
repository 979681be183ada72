//! File-backed secret store.
//!
//! # Layout
//! ```text
//! <dir>/host.json        {"masterKey": {...}, "systemKeys": [...], "functionKeys": [...]}
//! <dir>/<function>.json  {"keys": [{"name": "default", "value": "..."}]}
//! ```
//!
//! Files are re-read on every call, so a rotated file takes effect on the next
//! request without a restart.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::secrets::{FunctionSecrets, HostSecrets, SecretStore, SecretStoreError};

const HOST_SECRETS_FILE: &str = "host.json";

/// One named key as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyEntry {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct HostSecretsDocument {
    master_key: Option<KeyEntry>,
    system_keys: Vec<KeyEntry>,
    function_keys: Vec<KeyEntry>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct FunctionSecretsDocument {
    keys: Vec<KeyEntry>,
}

/// Reads secrets from JSON documents in a directory.
#[derive(Debug, Clone)]
pub struct FileSecretStore {
    dir: PathBuf,
}

impl FileSecretStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write host secrets in the on-disk layout.
    pub async fn write_host_secrets(&self, host: &HostSecrets) -> Result<(), SecretStoreError> {
        let doc = HostSecretsDocument {
            master_key: host.master_key.as_ref().map(|value| KeyEntry {
                name: "master".to_string(),
                value: value.clone(),
            }),
            system_keys: to_entries(&host.system_keys),
            function_keys: to_entries(&host.function_keys),
        };
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(HOST_SECRETS_FILE), serde_json::to_vec_pretty(&doc)?).await?;
        Ok(())
    }

    /// Write the secrets of one function in the on-disk layout.
    pub async fn write_function_secrets(
        &self,
        function_name: &str,
        secrets: &FunctionSecrets,
    ) -> Result<(), SecretStoreError> {
        if !is_valid_function_name(function_name) {
            return Err(SecretStoreError::Io(std::io::Error::new(
                ErrorKind::InvalidInput,
                format!("invalid function name '{}'", function_name),
            )));
        }
        let doc = FunctionSecretsDocument {
            keys: to_entries(&secrets.keys),
        };
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.function_path(function_name), serde_json::to_vec_pretty(&doc)?).await?;
        Ok(())
    }

    fn function_path(&self, function_name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", function_name.to_ascii_lowercase()))
    }
}

#[async_trait]
impl SecretStore for FileSecretStore {
    async fn host_secrets(&self) -> Result<HostSecrets, SecretStoreError> {
        let path = self.dir.join(HOST_SECRETS_FILE);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SecretStoreError::HostSecretsNotFound)
            }
            Err(e) => return Err(e.into()),
        };
        let doc: HostSecretsDocument = serde_json::from_slice(&bytes)?;

        Ok(HostSecrets {
            master_key: doc.master_key.map(|k| k.value),
            system_keys: doc.system_keys.into_iter().map(|k| (k.name, k.value)).collect(),
            function_keys: doc.function_keys.into_iter().map(|k| (k.name, k.value)).collect(),
        })
    }

    async fn function_secrets(&self, function_name: &str) -> Result<FunctionSecrets, SecretStoreError> {
        if !is_valid_function_name(function_name) {
            tracing::warn!(function = %function_name, "Rejected function name for secret lookup");
            return Ok(FunctionSecrets::default());
        }

        let bytes = match tokio::fs::read(self.function_path(function_name)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(FunctionSecrets::default()),
            Err(e) => return Err(e.into()),
        };
        let doc: FunctionSecretsDocument = serde_json::from_slice(&bytes)?;

        Ok(FunctionSecrets {
            keys: doc.keys.into_iter().map(|k| (k.name, k.value)).collect(),
        })
    }
}

/// Function names map to file names; anything that could escape the directory is refused.
fn is_valid_function_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn to_entries(map: &std::collections::HashMap<String, String>) -> Vec<KeyEntry> {
    let mut entries: Vec<KeyEntry> = map
        .iter()
        .map(|(name, value)| KeyEntry {
            name: name.clone(),
            value: value.clone(),
        })
        .collect();
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    entries
}
