//! Route table.
//!
//! Requirements are parsed once from configuration. Per request, the
//! authorization layer only reads the `Arc<RouteRequirement>` it was built with.

use std::sync::Arc;

use crate::auth::{AuthorizationLevel, RouteRequirement};
use crate::config::{RouteConfig, ValidationError};

/// Path of the liveness check, registered with `bypass = true`.
pub const HEALTH_PATH: &str = "/health";

/// A registered operation.
#[derive(Debug, Clone)]
pub struct RegisteredRoute {
    pub path: String,
    pub requirement: Arc<RouteRequirement>,
}

/// All operations known to the host, fixed at startup.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<RegisteredRoute>,
}

impl RouteTable {
    /// Build the table from configured routes.
    pub fn from_config(configs: &[RouteConfig]) -> Result<Self, ValidationError> {
        let mut table = Self::default();
        for config in configs {
            let requirement =
                RouteRequirement::from_declared(&config.level, config.bypass, config.function.clone())
                    .map_err(|source| ValidationError::MisconfiguredRequirement {
                        path: config.path.clone(),
                        source,
                    })?;
            table.register(config.path.clone(), requirement);
        }
        Ok(table)
    }

    pub fn register(&mut self, path: impl Into<String>, requirement: RouteRequirement) {
        self.routes.push(RegisteredRoute {
            path: path.into(),
            requirement: Arc::new(requirement),
        });
    }

    pub fn get(&self, path: &str) -> Option<&RegisteredRoute> {
        self.routes.iter().find(|r| r.path == path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisteredRoute> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Number of routes that never resolve a level.
    pub fn open_route_count(&self) -> usize {
        self.routes
            .iter()
            .filter(|r| !r.requirement.needs_resolution())
            .count()
    }

    /// Highest level any route demands.
    pub fn max_required_level(&self) -> AuthorizationLevel {
        self.routes
            .iter()
            .map(|r| r.requirement.required_level)
            .max()
            .unwrap_or(AuthorizationLevel::Anonymous)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        let configs = vec![
            RouteConfig {
                path: "/api/orders".into(),
                function: Some("Orders".into()),
                level: "function".into(),
                bypass: false,
            },
            RouteConfig {
                path: "/api/public".into(),
                function: None,
                level: "anonymous".into(),
                bypass: false,
            },
        ];
        let table = RouteTable::from_config(&configs).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.open_route_count(), 1);
        assert_eq!(table.max_required_level(), AuthorizationLevel::Function);

        let orders = table.get("/api/orders").unwrap();
        assert_eq!(orders.requirement.function_name.as_deref(), Some("Orders"));
        assert!(table.get("/api/missing").is_none());
    }

    #[test]
    fn test_misconfigured_level() {
        let configs = vec![RouteConfig {
            path: "/api/x".into(),
            function: None,
            level: "everyone".into(),
            bypass: false,
        }];
        let err = RouteTable::from_config(&configs).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::MisconfiguredRequirement { ref path, ref source }
                if path == "/api/x" && source.level == "everyone"
        ));
    }
}
