//! Route requirements and allow/deny decisions.
//!
//! # Responsibilities
//! - Hold the requirement declared for each operation at registration time
//! - Skip resolution for bypassed and anonymous routes
//! - Compare a resolved level against the requirement
//!
//! # Design Decisions
//! - Fail closed: a resolution error always denies
//! - Every deny maps to the same 401; `DenyReason` exists for logs only

use std::future::Future;

use crate::auth::level::{AuthorizationLevel, MisconfiguredRequirement};
use crate::auth::resolver::AuthError;
use crate::observability::metrics;

/// Authorization requirement of one registered operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRequirement {
    pub required_level: AuthorizationLevel,
    pub bypass: bool,
    pub function_name: Option<String>,
}

impl RouteRequirement {
    pub fn new(required_level: AuthorizationLevel) -> Self {
        Self {
            required_level,
            bypass: false,
            function_name: None,
        }
    }

    /// A route exempt from authorization entirely.
    pub fn bypassed() -> Self {
        Self {
            required_level: AuthorizationLevel::Anonymous,
            bypass: true,
            function_name: None,
        }
    }

    /// Scope per-function secret lookups to `name`.
    pub fn for_function(mut self, name: impl Into<String>) -> Self {
        self.function_name = Some(name.into());
        self
    }

    /// Build a requirement from a declared level string.
    pub fn from_declared(
        level: &str,
        bypass: bool,
        function_name: Option<String>,
    ) -> Result<Self, MisconfiguredRequirement> {
        Ok(Self {
            required_level: level.parse()?,
            bypass,
            function_name,
        })
    }

    /// True if the route needs a resolved level before it can be allowed.
    pub fn needs_resolution(&self) -> bool {
        !self.bypass && self.required_level != AuthorizationLevel::Anonymous
    }
}

/// Why a request was denied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DenyReason {
    /// The caller's level is below the route's requirement.
    InsufficientLevel {
        required: AuthorizationLevel,
        resolved: AuthorizationLevel,
    },
    /// The level could not be determined.
    ResolutionFailed(AuthError),
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Allowed. Carries the resolved level when resolution ran.
    Allow(Option<AuthorizationLevel>),
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow(_))
    }
}

/// Decide whether a request satisfies `requirement`.
///
/// `fetch_level` is only invoked when the requirement needs a resolved level.
pub async fn authorize<F, Fut>(requirement: &RouteRequirement, fetch_level: F) -> Decision
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<AuthorizationLevel, AuthError>>,
{
    if !requirement.needs_resolution() {
        metrics::record_decision("allow", requirement.required_level.as_str());
        return Decision::Allow(None);
    }

    let decision = match fetch_level().await {
        Ok(resolved) if resolved.satisfies(requirement.required_level) => Decision::Allow(Some(resolved)),
        Ok(resolved) => Decision::Deny(DenyReason::InsufficientLevel {
            required: requirement.required_level,
            resolved,
        }),
        Err(e) => Decision::Deny(DenyReason::ResolutionFailed(e)),
    };

    let label = if decision.is_allowed() { "allow" } else { "deny" };
    metrics::record_decision(label, requirement.required_level.as_str());
    decision
}
