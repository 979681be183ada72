//! Host admin API. Every route requires the master key.

pub mod handlers;

use axum::{routing::get, Router};

use self::handlers::*;
use crate::auth::{AuthorizationLevel, RouteRequirement};

pub const STATUS_PATH: &str = "/admin/host/status";
pub const KEYS_PATH: &str = "/admin/host/keys";

/// Requirement shared by all admin routes.
pub fn admin_requirement() -> RouteRequirement {
    RouteRequirement::new(AuthorizationLevel::Admin)
}

/// Admin routes without their authorization layer; the server attaches it.
pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route(STATUS_PATH, get(get_status))
        .route(KEYS_PATH, get(get_keys))
        .with_state(state)
}
