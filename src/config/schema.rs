//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Root configuration for the function host.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct HostConfig {
    /// Listener configuration.
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Where secrets come from.
    pub secrets: SecretsConfig,

    /// Protected operations and their requirements.
    pub routes: Vec<RouteConfig>,

    pub admin: AdminConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:7071").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:7071".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Total request timeout in seconds.
    pub request_secs: u64,

    /// Per-fetch secret store timeout in milliseconds.
    pub secret_store_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            secret_store_ms: 2000,
        }
    }
}

/// Secret provider selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SecretProviderKind {
    /// JSON documents in `secrets.path`.
    #[default]
    File,
    /// Inline secrets from this file.
    Memory,
}

/// Secret source configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecretsConfig {
    pub provider: SecretProviderKind,

    /// Directory holding `host.json` and per-function documents.
    pub path: Option<String>,

    /// Inline host secrets (memory provider).
    pub host: InlineHostSecrets,

    /// Inline per-function secrets keyed by function name (memory provider).
    pub functions: HashMap<String, HashMap<String, String>>,
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            provider: SecretProviderKind::File,
            path: Some("secrets".to_string()),
            host: InlineHostSecrets::default(),
            functions: HashMap::new(),
        }
    }
}

/// Host secrets written directly in the config file.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct InlineHostSecrets {
    pub master_key: Option<String>,
    pub system_keys: HashMap<String, String>,
    pub function_keys: HashMap<String, String>,
}

/// One protected operation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Request path (axum syntax, e.g. "/api/orders").
    pub path: String,

    /// Function whose scoped keys are accepted on this route.
    #[serde(default)]
    pub function: Option<String>,

    /// Required level: anonymous, function, system or admin.
    #[serde(default = "default_level")]
    pub level: String,

    /// Exempt the route from authorization.
    #[serde(default)]
    pub bypass: bool,
}

fn default_level() -> String {
    "function".to_string()
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Mount the `/admin/host/*` routes (master key required).
    pub enabled: bool,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
