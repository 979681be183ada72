//! Per-request memo of the resolved level.
//!
//! ```text
//! Unchecked → Resolving → Resolved(level)
//!                       → Failed(error)
//!                       → Unchecked   (request dropped mid-resolution)
//! ```
//!
//! The slot lives in the request's extensions and records the function scope
//! it resolves under. Nested authorization layers with the same scope share
//! it, so the secret store is consulted at most once per request and scope.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::auth::level::AuthorizationLevel;
use crate::auth::resolver::{AuthError, Resolution};

/// Observable state of an [`AuthorizationSlot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotState {
    Unchecked,
    Resolving,
    Resolved(AuthorizationLevel),
    Failed(AuthError),
}

#[derive(Default)]
struct SlotInner {
    started: AtomicBool,
    result: OnceCell<Result<Resolution, AuthError>>,
}

/// Set-once holder for one request's resolution result.
#[derive(Clone, Default)]
pub struct AuthorizationSlot {
    inner: Arc<SlotInner>,
    scope: Option<String>,
}

impl AuthorizationSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// A slot whose result only applies to checks for `function_name`.
    pub fn for_scope(function_name: Option<&str>) -> Self {
        Self {
            inner: Arc::default(),
            scope: function_name.map(str::to_string),
        }
    }

    /// Function name the memoized level was resolved under.
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// Return the memoized result, running `resolve` only if no result exists yet.
    ///
    /// Concurrent callers wait on the first one; `resolve` runs at most once to completion.
    pub async fn get_or_resolve<F, Fut>(&self, resolve: F) -> Result<Resolution, AuthError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Resolution, AuthError>>,
    {
        self.inner
            .result
            .get_or_init(|| async {
                let _resolving = ResolvingGuard::enter(&self.inner.started);
                resolve().await
            })
            .await
            .clone()
    }

    /// `Resolving` only while an initializer is actually running; an aborted
    /// request leaves the slot `Unchecked`.
    pub fn state(&self) -> SlotState {
        match self.inner.result.get() {
            Some(Ok(resolution)) => SlotState::Resolved(resolution.level),
            Some(Err(e)) => SlotState::Failed(e.clone()),
            None if self.inner.started.load(Ordering::SeqCst) => SlotState::Resolving,
            None => SlotState::Unchecked,
        }
    }

    /// The resolved level, if resolution has completed successfully.
    pub fn level(&self) -> Option<AuthorizationLevel> {
        match self.inner.result.get() {
            Some(Ok(resolution)) => Some(resolution.level),
            _ => None,
        }
    }
}

/// Marks a resolution in progress for as long as its future is alive.
struct ResolvingGuard<'a>(&'a AtomicBool);

impl<'a> ResolvingGuard<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for ResolvingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl std::fmt::Debug for AuthorizationSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationSlot")
            .field("scope", &self.scope)
            .field("state", &self.state())
            .finish()
    }
}
