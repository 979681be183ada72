//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the configured secret store
//! - Construct the HTTP server (route table, resolver)
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Misconfigured route levels are startup errors, never request errors

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{SecretProviderKind, SecretsConfig};
use crate::secrets::{
    FileSecretStore, FunctionSecrets, HostSecrets, InMemorySecretStore, SecretStore,
};

/// Build the secret store selected by configuration.
pub fn build_secret_store(config: &SecretsConfig) -> Arc<dyn SecretStore> {
    match config.provider {
        SecretProviderKind::File => {
            let dir = config.path.clone().unwrap_or_else(|| "secrets".to_string());
            tracing::info!(path = %dir, "Using file secret store");
            Arc::new(FileSecretStore::new(dir))
        }
        SecretProviderKind::Memory => {
            let store = InMemorySecretStore::new(HostSecrets {
                master_key: config.host.master_key.clone(),
                system_keys: config.host.system_keys.clone(),
                function_keys: config.host.function_keys.clone(),
            });
            for (name, keys) in &config.functions {
                store.set_function_secrets(name.clone(), to_function_secrets(keys));
            }
            tracing::info!(functions = config.functions.len(), "Using in-memory secret store");
            Arc::new(store)
        }
    }
}

fn to_function_secrets(keys: &HashMap<String, String>) -> FunctionSecrets {
    FunctionSecrets { keys: keys.clone() }
}
