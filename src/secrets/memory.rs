//! In-process secret store.

use std::sync::Arc;

use arc_swap::ArcSwap;
use async_trait::async_trait;
use dashmap::DashMap;

use crate::secrets::{FunctionSecrets, HostSecrets, SecretStore, SecretStoreError};

/// A thread-safe secret store held entirely in memory.
///
/// Host secrets are swapped atomically as a whole; readers never observe a
/// partially written set.
#[derive(Clone)]
pub struct InMemorySecretStore {
    host: Arc<ArcSwap<HostSecrets>>,
    functions: Arc<DashMap<String, FunctionSecrets>>,
}

impl InMemorySecretStore {
    /// Create a store seeded with the given host secrets.
    pub fn new(host: HostSecrets) -> Self {
        Self {
            host: Arc::new(ArcSwap::from_pointee(host)),
            functions: Arc::new(DashMap::new()),
        }
    }

    /// Replace the host secret set.
    pub fn set_host_secrets(&self, host: HostSecrets) {
        self.host.store(Arc::new(host));
    }

    /// Replace the secret set of one function.
    pub fn set_function_secrets(&self, function_name: impl Into<String>, secrets: FunctionSecrets) {
        self.functions.insert(function_name.into(), secrets);
    }

    /// Drop every secret of one function.
    pub fn remove_function(&self, function_name: &str) {
        self.functions.remove(function_name);
    }

    /// Names of functions that have secrets registered.
    pub fn function_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.iter().map(|r| r.key().clone()).collect();
        names.sort();
        names
    }
}

impl Default for InMemorySecretStore {
    fn default() -> Self {
        Self::new(HostSecrets::default())
    }
}

#[async_trait]
impl SecretStore for InMemorySecretStore {
    async fn host_secrets(&self) -> Result<HostSecrets, SecretStoreError> {
        Ok((**self.host.load()).clone())
    }

    async fn function_secrets(&self, function_name: &str) -> Result<FunctionSecrets, SecretStoreError> {
        Ok(self
            .functions
            .get(function_name)
            .map(|r| r.value().clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_operations() {
        let store = InMemorySecretStore::new(HostSecrets::default().with_master_key("m1"));
        assert_eq!(store.host_secrets().await.unwrap().master_key.as_deref(), Some("m1"));

        // Unknown function
        assert!(store.function_secrets("F1").await.unwrap().is_empty());

        store.set_function_secrets("F1", FunctionSecrets::default().with_key("default", "k1"));
        let secrets = store.function_secrets("F1").await.unwrap();
        assert_eq!(secrets.keys.get("default").map(String::as_str), Some("k1"));
        assert_eq!(store.function_names(), vec!["F1".to_string()]);

        // Rotation replaces the whole set
        store.set_host_secrets(HostSecrets::default().with_master_key("m2"));
        assert_eq!(store.host_secrets().await.unwrap().master_key.as_deref(), Some("m2"));

        store.remove_function("F1");
        assert!(store.function_secrets("F1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = InMemorySecretStore::default();
        let other = store.clone();
        other.set_host_secrets(HostSecrets::default().with_system_key("s", "v"));
        assert_eq!(store.host_secrets().await.unwrap().system_keys.len(), 1);
    }
}
