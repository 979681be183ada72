//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Build the route table once from configuration
//! - Attach each route's authorization layer at registration time
//! - Wire up middleware (request ID, tracing, timeout)
//! - Serve until the shutdown token fires

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::Request,
    middleware,
    routing::{any, get},
    Router,
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::admin::{self, handlers::AdminState};
use crate::auth::{LevelResolver, RouteRequirement};
use crate::config::{validate_config, ConfigError, HostConfig};
use crate::http::function::{health, invoke_function};
use crate::http::middleware::{authorization_middleware, RouteAuthState};
use crate::http::request::MakeRequestUuid;
use crate::http::routes::{RouteTable, HEALTH_PATH};
use crate::secrets::SecretStore;

/// HTTP server for the function host.
pub struct HttpServer {
    router: Router,
    config: HostConfig,
    routes: Arc<RouteTable>,
    shutdown: CancellationToken,
}

impl HttpServer {
    /// Create a new HTTP server.
    ///
    /// The configuration is validated again here, so a route the router
    /// cannot register is reported as [`ConfigError::Validation`].
    pub fn new(
        config: HostConfig,
        store: Arc<dyn SecretStore>,
        shutdown: CancellationToken,
    ) -> Result<Self, ConfigError> {
        validate_config(&config).map_err(ConfigError::Validation)?;
        let mut routes =
            RouteTable::from_config(&config.routes).map_err(|e| ConfigError::Validation(vec![e]))?;
        routes.register(HEALTH_PATH, RouteRequirement::bypassed());
        if config.admin.enabled {
            routes.register(admin::STATUS_PATH, admin::admin_requirement());
            routes.register(admin::KEYS_PATH, admin::admin_requirement());
        }
        let routes = Arc::new(routes);

        let resolver = LevelResolver::new(store.clone())
            .with_fetch_timeout(Duration::from_millis(config.timeouts.secret_store_ms));

        let router = Self::build_router(&config, &routes, store, resolver, &shutdown);

        tracing::info!(
            routes = routes.len(),
            open_routes = routes.open_route_count(),
            "Route table built"
        );

        Ok(Self {
            router,
            config,
            routes,
            shutdown,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(
        config: &HostConfig,
        routes: &Arc<RouteTable>,
        store: Arc<dyn SecretStore>,
        resolver: LevelResolver,
        shutdown: &CancellationToken,
    ) -> Router {
        let protect = |router: Router, requirement: Arc<RouteRequirement>| {
            let state = RouteAuthState {
                resolver: resolver.clone(),
                requirement,
                cancel: shutdown.clone(),
            };
            router.route_layer(middleware::from_fn_with_state(state, authorization_middleware))
        };

        let mut app = Router::new();
        for route in routes.iter() {
            let path = route.path.as_str();
            if path == admin::STATUS_PATH || path == admin::KEYS_PATH {
                continue;
            }

            let router = if path == HEALTH_PATH {
                Router::new().route(HEALTH_PATH, get(health))
            } else {
                let function = route.requirement.function_name.clone();
                Router::new().route(
                    path,
                    any(move |req: Request<Body>| invoke_function(function.clone(), req)),
                )
            };
            app = app.merge(protect(router, route.requirement.clone()));
        }

        if let Some(admin_route) = routes.get(admin::STATUS_PATH) {
            let admin_router = admin::setup_admin_router(AdminState {
                store,
                routes: routes.clone(),
            });
            app = app.merge(protect(admin_router, admin_route.requirement.clone()));
        }

        app.layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let shutdown = self.shutdown.clone();
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
