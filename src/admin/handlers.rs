use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::http::routes::RouteTable;
use crate::secrets::SecretStore;

/// State shared by the admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub store: Arc<dyn SecretStore>,
    pub routes: Arc<RouteTable>,
}

#[derive(Serialize)]
pub struct HostStatus {
    pub version: &'static str,
    pub state: &'static str,
    pub routes: usize,
    pub open_routes: usize,
}

/// Key names only. Values never leave the host through this API.
#[derive(Serialize)]
pub struct HostKeyNames {
    pub has_master_key: bool,
    pub system_keys: Vec<String>,
    pub function_keys: Vec<String>,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<HostStatus> {
    Json(HostStatus {
        version: env!("CARGO_PKG_VERSION"),
        state: "running",
        routes: state.routes.len(),
        open_routes: state.routes.open_route_count(),
    })
}

pub async fn get_keys(State(state): State<AdminState>) -> Response {
    match state.store.host_secrets().await {
        Ok(host) => {
            let mut system_keys: Vec<String> = host.system_keys.into_keys().collect();
            let mut function_keys: Vec<String> = host.function_keys.into_keys().collect();
            system_keys.sort();
            function_keys.sort();
            Json(HostKeyNames {
                has_master_key: host.master_key.is_some_and(|k| !k.is_empty()),
                system_keys,
                function_keys,
            })
            .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to read host secrets for admin listing");
            (StatusCode::SERVICE_UNAVAILABLE, "Secret store unavailable").into_response()
        }
    }
}
