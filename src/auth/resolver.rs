//! Authorization level resolution.
//!
//! # Responsibilities
//! - Match a candidate key against the secret tiers, highest first
//! - Keep backend calls to the minimum the tiers require
//! - Report backend failure and cancellation as errors, never as a level
//!
//! # Tier Order
//! ```text
//! master key       → Admin
//! system keys      → System
//! host fn keys     → Function
//! function keys    → Function   (second fetch, only when a name is known)
//! nothing matched  → Anonymous
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::auth::comparer::{matches_any, secure_equals};
use crate::auth::level::AuthorizationLevel;
use crate::observability::metrics;
use crate::secrets::{SecretStore, SecretStoreError};

/// Reasons a resolution produced no level.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// A secret fetch failed or timed out. Callers must deny.
    #[error("secret store unavailable: {0}")]
    SecretStoreUnavailable(String),

    /// The request was aborted while a fetch was in flight.
    #[error("authorization resolution cancelled")]
    Cancelled,
}

/// Which secret tier produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchedTier {
    Master,
    System,
    HostFunction,
    FunctionScoped,
}

/// How a successful resolution arrived at its level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// No key was presented.
    NoCredential,
    /// A key was presented but matched no tier.
    InvalidCredential,
    Matched(MatchedTier),
}

impl ResolutionOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            ResolutionOutcome::NoCredential => "no_credential",
            ResolutionOutcome::InvalidCredential => "invalid_credential",
            ResolutionOutcome::Matched(MatchedTier::Master) => "matched_master",
            ResolutionOutcome::Matched(MatchedTier::System) => "matched_system",
            ResolutionOutcome::Matched(MatchedTier::HostFunction) => "matched_host_function",
            ResolutionOutcome::Matched(MatchedTier::FunctionScoped) => "matched_function",
        }
    }
}

/// Result of a successful resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub level: AuthorizationLevel,
    pub outcome: ResolutionOutcome,
}

impl Resolution {
    fn anonymous(outcome: ResolutionOutcome) -> Self {
        Self {
            level: AuthorizationLevel::Anonymous,
            outcome,
        }
    }

    fn matched(level: AuthorizationLevel, tier: MatchedTier) -> Self {
        Self {
            level,
            outcome: ResolutionOutcome::Matched(tier),
        }
    }
}

/// Resolves candidate keys to authorization levels against a [`SecretStore`].
#[derive(Clone)]
pub struct LevelResolver {
    store: Arc<dyn SecretStore>,
    fetch_timeout: Option<Duration>,
}

impl LevelResolver {
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self {
            store,
            fetch_timeout: None,
        }
    }

    /// Bound every secret fetch. A fetch that overruns counts as the store being unavailable.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = Some(timeout);
        self
    }

    /// Resolve the level of `candidate_key`, optionally scoped to `function_name`.
    pub async fn resolve(
        &self,
        candidate_key: Option<&str>,
        function_name: Option<&str>,
    ) -> Result<AuthorizationLevel, AuthError> {
        self.resolve_detailed(candidate_key, function_name)
            .await
            .map(|r| r.level)
    }

    /// Like [`resolve`](Self::resolve), but aborts with [`AuthError::Cancelled`]
    /// as soon as `cancel` fires. The in-flight fetch is dropped.
    pub async fn resolve_cancellable(
        &self,
        candidate_key: Option<&str>,
        function_name: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<Resolution, AuthError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::warn!("Authorization resolution cancelled");
                metrics::record_resolution("cancelled");
                Err(AuthError::Cancelled)
            }
            result = self.resolve_detailed(candidate_key, function_name) => result,
        }
    }

    /// Resolve and report which tier matched.
    pub async fn resolve_detailed(
        &self,
        candidate_key: Option<&str>,
        function_name: Option<&str>,
    ) -> Result<Resolution, AuthError> {
        let result = self.resolve_tiers(candidate_key, function_name).await;
        match &result {
            Ok(resolution) => {
                tracing::debug!(
                    outcome = resolution.outcome.as_str(),
                    level = %resolution.level,
                    function = ?function_name,
                    "Authorization level resolved"
                );
                metrics::record_resolution(resolution.outcome.as_str());
            }
            Err(e) => {
                tracing::warn!(error = %e, function = ?function_name, "Authorization level unresolved");
                metrics::record_resolution("store_unavailable");
            }
        }
        result
    }

    async fn resolve_tiers(
        &self,
        candidate_key: Option<&str>,
        function_name: Option<&str>,
    ) -> Result<Resolution, AuthError> {
        let candidate = match candidate_key {
            Some(key) if !key.is_empty() => key,
            _ => return Ok(Resolution::anonymous(ResolutionOutcome::NoCredential)),
        };

        let host = self.fetch("host", self.store.host_secrets()).await?;

        // An empty master key is treated as unset.
        if let Some(master) = host.master_key.as_deref().filter(|m| !m.is_empty()) {
            if secure_equals(candidate, master) {
                return Ok(Resolution::matched(AuthorizationLevel::Admin, MatchedTier::Master));
            }
        }

        if matches_any(candidate, host.system_keys.values()) {
            return Ok(Resolution::matched(AuthorizationLevel::System, MatchedTier::System));
        }

        if matches_any(candidate, host.function_keys.values()) {
            return Ok(Resolution::matched(AuthorizationLevel::Function, MatchedTier::HostFunction));
        }

        if let Some(name) = function_name.filter(|n| !n.is_empty()) {
            let scoped = self.fetch("function", self.store.function_secrets(name)).await?;
            if matches_any(candidate, scoped.keys.values()) {
                return Ok(Resolution::matched(AuthorizationLevel::Function, MatchedTier::FunctionScoped));
            }
        }

        Ok(Resolution::anonymous(ResolutionOutcome::InvalidCredential))
    }

    async fn fetch<T, F>(&self, kind: &'static str, fut: F) -> Result<T, AuthError>
    where
        F: Future<Output = Result<T, SecretStoreError>>,
    {
        let start = Instant::now();
        let result = match self.fetch_timeout {
            Some(limit) => match tokio::time::timeout(limit, fut).await {
                Ok(result) => result,
                Err(_) => Err(SecretStoreError::Unavailable(format!(
                    "{} secrets fetch timed out after {}ms",
                    kind,
                    limit.as_millis()
                ))),
            },
            None => fut.await,
        };
        metrics::record_secret_fetch(kind, result.is_ok(), start);

        result.map_err(|e| {
            tracing::warn!(kind = kind, error = %e, "Secret store fetch failed");
            AuthError::SecretStoreUnavailable(e.to_string())
        })
    }
}
