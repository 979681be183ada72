//! Function invocation handler.
//!
//! Stands in for the user code behind a protected route: it reports which
//! function was invoked and the level the caller was granted.

use axum::{body::Body, http::Request, Json};
use serde::{Deserialize, Serialize};

use crate::auth::AuthorizationLevel;

#[derive(Debug, Serialize, Deserialize)]
pub struct InvocationResponse {
    pub function: Option<String>,
    pub path: String,
    /// Absent when the route never resolved a level (bypass or anonymous).
    pub level: Option<AuthorizationLevel>,
}

pub async fn invoke_function(function: Option<String>, req: Request<Body>) -> Json<InvocationResponse> {
    let level = req.extensions().get::<AuthorizationLevel>().copied();
    tracing::debug!(function = ?function, level = ?level, "Function invoked");

    Json(InvocationResponse {
        function,
        path: req.uri().path().to_string(),
        level,
    })
}

pub async fn health() -> &'static str {
    "ok"
}
