//! Configuration validation.
//!
//! # Responsibilities
//! - Reject unknown required levels before any route is registered
//! - Check route paths (router syntax, no overlapping shapes, host-reserved paths)
//! - Validate value ranges and provider settings
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function: HostConfig → Result<(), Vec<ValidationError>>

use std::collections::HashSet;
use std::fmt;

use crate::auth::{AuthorizationLevel, MisconfiguredRequirement};
use crate::config::schema::{HostConfig, SecretProviderKind};
use crate::http::routes::HEALTH_PATH;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    MisconfiguredRequirement { path: String, source: MisconfiguredRequirement },
    InvalidPath(String),
    ReservedPath(String),
    DuplicatePath(String),
    ZeroTimeout(&'static str),
    MissingSecretsPath,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::MisconfiguredRequirement { path, source } => {
                write!(f, "route '{}': {}", path, source)
            }
            ValidationError::InvalidPath(path) => {
                write!(
                    f,
                    "route path '{}' must start with '/' and use whole-segment '{{param}}' or trailing '{{*rest}}' captures",
                    path
                )
            }
            ValidationError::ReservedPath(path) => write!(f, "route path '{}' is reserved by the host", path),
            ValidationError::DuplicatePath(path) => {
                write!(f, "route path '{}' overlaps a previously declared route", path)
            }
            ValidationError::ZeroTimeout(name) => write!(f, "timeout '{}' must be greater than zero", name),
            ValidationError::MissingSecretsPath => write!(f, "file secret provider requires secrets.path"),
        }
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &HostConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for route in &config.routes {
        if let Err(source) = route.level.parse::<AuthorizationLevel>() {
            errors.push(ValidationError::MisconfiguredRequirement {
                path: route.path.clone(),
                source,
            });
        }
        match route_shape(&route.path) {
            None => errors.push(ValidationError::InvalidPath(route.path.clone())),
            Some(_) if route.path == HEALTH_PATH || route.path.starts_with("/admin/") => {
                errors.push(ValidationError::ReservedPath(route.path.clone()))
            }
            Some(shape) => {
                if !seen.insert(shape) {
                    errors.push(ValidationError::DuplicatePath(route.path.clone()));
                }
            }
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }
    if config.timeouts.secret_store_ms == 0 {
        errors.push(ValidationError::ZeroTimeout("secret_store_ms"));
    }

    if config.secrets.provider == SecretProviderKind::File
        && config.secrets.path.as_deref().map_or(true, str::is_empty)
    {
        errors.push(ValidationError::MissingSecretsPath);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Path with every capture replaced by `{}`, or `None` if the router would refuse it.
///
/// Two routes with the same shape collide in the router even when their
/// capture names differ.
fn route_shape(path: &str) -> Option<String> {
    let segments: Vec<&str> = path.strip_prefix('/')?.split('/').collect();
    let mut shape = String::with_capacity(path.len());

    for (i, segment) in segments.iter().enumerate() {
        shape.push('/');
        match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(capture) => {
                let (name, catch_all) = match capture.strip_prefix('*') {
                    Some(name) => (name, true),
                    None => (capture, false),
                };
                if name.is_empty() || name.contains(['{', '}', '*']) {
                    return None;
                }
                // catch-alls only at the end
                if catch_all && i + 1 != segments.len() {
                    return None;
                }
                shape.push_str("{}");
            }
            None => {
                if segment.starts_with(':') || segment.starts_with('*') || segment.contains(['{', '}']) {
                    return None;
                }
                shape.push_str(segment);
            }
        }
    }
    Some(shape)
}
