//! Authorization middleware.
//! Enforces the route's declared requirement.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tokio_util::sync::CancellationToken;

use crate::auth::{
    authorize, extract_from_request, AuthorizationSlot, Decision, DenyReason, LevelResolver,
    RouteRequirement,
};
use crate::http::request::request_id;

/// State attached to one route's authorization layer.
#[derive(Clone)]
pub struct RouteAuthState {
    pub resolver: LevelResolver,
    pub requirement: Arc<RouteRequirement>,
    /// Fires on shutdown; in-flight resolutions fail as cancelled.
    pub cancel: CancellationToken,
}

pub async fn authorization_middleware(
    State(state): State<RouteAuthState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    // 1. Reuse the request's memo slot if it was resolved for the same function,
    //    otherwise start a new one for this scope.
    let function_name = state.requirement.function_name.as_deref();
    let existing = req
        .extensions()
        .get::<AuthorizationSlot>()
        .filter(|slot| slot.scope() == function_name)
        .cloned();
    let slot = match existing {
        Some(slot) => slot,
        None => {
            let slot = AuthorizationSlot::for_scope(function_name);
            req.extensions_mut().insert(slot.clone());
            slot
        }
    };

    // 2. Evaluate. The key is only looked up against the store if the route needs it.
    let candidate = extract_from_request(&req);
    let decision = authorize(&state.requirement, || async {
        slot.get_or_resolve(|| {
            state
                .resolver
                .resolve_cancellable(candidate.as_deref(), function_name, &state.cancel)
        })
        .await
        .map(|resolution| resolution.level)
    })
    .await;

    // 3. Allow with the level attached, or answer 401.
    match decision {
        Decision::Allow(level) => {
            if let Some(level) = level {
                req.extensions_mut().insert(level);
            }
            next.run(req).await
        }
        Decision::Deny(reason) => {
            match &reason {
                DenyReason::InsufficientLevel { required, resolved } => tracing::debug!(
                    request_id = %request_id(&req),
                    path = %req.uri().path(),
                    required = %required,
                    resolved = %resolved,
                    "Request denied"
                ),
                DenyReason::ResolutionFailed(e) => tracing::warn!(
                    request_id = %request_id(&req),
                    path = %req.uri().path(),
                    error = %e,
                    "Request denied, authorization could not be evaluated"
                ),
            }
            (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
        }
    }
}
