//! Shared utilities for integration tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use function_keyauth::config::{HostConfig, RouteConfig};
use function_keyauth::secrets::{FunctionSecrets, HostSecrets, SecretStore, SecretStoreError};

pub const MASTER_KEY: &str = "masterKeyValue";
pub const SYSTEM_KEY: &str = "systemKeyValue";
pub const HOST_FUNCTION_KEY: &str = "hostFunctionKeyValue";
pub const F1_KEY: &str = "f1KeyValue";

/// A secret store that counts calls and can be told to fail or stall.
#[allow(dead_code)]
#[derive(Default)]
pub struct TestStore {
    host: HostSecrets,
    functions: HashMap<String, FunctionSecrets>,
    host_calls: AtomicUsize,
    function_calls: AtomicUsize,
    fail_host: AtomicBool,
    fail_function: AtomicBool,
    delay: Option<Duration>,
}

#[allow(dead_code)]
impl TestStore {
    pub fn new(host: HostSecrets) -> Self {
        Self {
            host,
            ..Self::default()
        }
    }

    /// Master, one system key, one host function key, and `F1`-scoped secrets.
    pub fn standard() -> Self {
        Self::new(
            HostSecrets::default()
                .with_master_key(MASTER_KEY)
                .with_system_key("durabletask_extension", SYSTEM_KEY)
                .with_function_key("default", HOST_FUNCTION_KEY),
        )
        .with_function("F1", FunctionSecrets::default().with_key("default", F1_KEY))
    }

    pub fn with_function(mut self, name: &str, secrets: FunctionSecrets) -> Self {
        self.functions.insert(name.to_string(), secrets);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn fail_host(&self, fail: bool) {
        self.fail_host.store(fail, Ordering::SeqCst);
    }

    pub fn fail_function(&self, fail: bool) {
        self.fail_function.store(fail, Ordering::SeqCst);
    }

    pub fn host_calls(&self) -> usize {
        self.host_calls.load(Ordering::SeqCst)
    }

    pub fn function_calls(&self) -> usize {
        self.function_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.host_calls() + self.function_calls()
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl SecretStore for TestStore {
    async fn host_secrets(&self) -> Result<HostSecrets, SecretStoreError> {
        self.host_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_host.load(Ordering::SeqCst) {
            return Err(SecretStoreError::Unavailable("injected host failure".into()));
        }
        Ok(self.host.clone())
    }

    async fn function_secrets(&self, function_name: &str) -> Result<FunctionSecrets, SecretStoreError> {
        self.function_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_function.load(Ordering::SeqCst) {
            return Err(SecretStoreError::Unavailable("injected function failure".into()));
        }
        Ok(self.functions.get(function_name).cloned().unwrap_or_default())
    }
}

/// Host config with one route per required level, plus `F1` scoped routes.
#[allow(dead_code)]
pub fn host_config() -> HostConfig {
    let mut config = HostConfig::default();
    let mut route = |path: &str, function: Option<&str>, level: &str, bypass: bool| {
        config.routes.push(RouteConfig {
            path: path.to_string(),
            function: function.map(str::to_string),
            level: level.to_string(),
            bypass,
        });
    };
    route("/api/f1", Some("F1"), "function", false);
    route("/api/f2", Some("F2"), "function", false);
    route("/api/system", None, "system", false);
    route("/api/public", None, "anonymous", false);
    route("/api/open-admin", None, "admin", true);
    config
}
