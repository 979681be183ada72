//! Router-level authorization tests.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware,
    response::Response,
    routing::get,
    Router,
};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use function_keyauth::auth::{AuthorizationLevel, AuthorizationSlot, LevelResolver, RouteRequirement, SlotState};
use function_keyauth::config::{ConfigError, ValidationError};
use function_keyauth::http::middleware::{authorization_middleware, RouteAuthState};
use function_keyauth::HttpServer;

mod common;
use common::{host_config, TestStore, F1_KEY, HOST_FUNCTION_KEY, MASTER_KEY, SYSTEM_KEY};

fn server(store: &Arc<TestStore>) -> Router {
    HttpServer::new(host_config(), store.clone(), CancellationToken::new())
        .unwrap()
        .router()
}

async fn send(router: &Router, uri: &str, header_key: Option<&str>) -> Response {
    let mut builder = Request::builder().uri(uri);
    if let Some(key) = header_key {
        builder = builder.header("x-functions-key", key);
    }
    router
        .clone()
        .oneshot(builder.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_is_bypassed() {
    let store = TestStore::standard().shared();
    let router = server(&store);

    let res = send(&router, "/health", None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(store.total_calls(), 0);
}

#[tokio::test]
async fn test_bypassed_admin_route_skips_store() {
    let store = TestStore::standard().shared();
    store.fail_host(true);
    let router = server(&store);

    let res = send(&router, "/api/open-admin", None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json(res).await["level"], Value::Null);
    assert_eq!(store.total_calls(), 0);
}

#[tokio::test]
async fn test_anonymous_route_skips_store() {
    let store = TestStore::standard().shared();
    let router = server(&store);

    let res = send(&router, "/api/public", Some("whatever")).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(store.total_calls(), 0);
}

#[tokio::test]
async fn test_function_route() {
    let store = TestStore::standard().shared();
    let router = server(&store);

    // No key
    let res = send(&router, "/api/f1", None).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(store.total_calls(), 0);

    // Wrong key
    let res = send(&router, "/api/f1", Some("wrong")).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Scoped key, via header and via query
    let res = send(&router, "/api/f1", Some(F1_KEY)).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = json(res).await;
    assert_eq!(body["function"], "F1");
    assert_eq!(body["level"], "function");

    let res = send(&router, &format!("/api/f1?code={}", F1_KEY), None).await;
    assert_eq!(res.status(), StatusCode::OK);

    // F1's key does not open F2
    let res = send(&router, "/api/f2", Some(F1_KEY)).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    // Host-level keys open every function
    let res = send(&router, "/api/f2", Some(HOST_FUNCTION_KEY)).await;
    assert_eq!(res.status(), StatusCode::OK);
    let res = send(&router, "/api/f2", Some(MASTER_KEY)).await;
    assert_eq!(json(res).await["level"], "admin");
}

#[tokio::test]
async fn test_system_route_levels() {
    let store = TestStore::standard().shared();
    let router = server(&store);

    assert_eq!(send(&router, "/api/system", Some(HOST_FUNCTION_KEY)).await.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(send(&router, "/api/system", Some(SYSTEM_KEY)).await.status(), StatusCode::OK);
    assert_eq!(send(&router, "/api/system", Some(MASTER_KEY)).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_header_precedence_on_route() {
    let store = TestStore::standard().shared();
    let router = server(&store);

    let res = send(&router, "/api/system?code=someOtherValue", Some(MASTER_KEY)).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json(res).await["level"], "admin");
}

#[tokio::test]
async fn test_store_failure_denies() {
    let store = TestStore::standard().shared();
    store.fail_host(true);
    let router = server(&store);

    // Even the master key cannot get through when secrets cannot be read.
    let res = send(&router, "/api/f1", Some(MASTER_KEY)).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(store.host_calls(), 1);
}

#[tokio::test]
async fn test_admin_routes() {
    let store = TestStore::standard().shared();
    let router = server(&store);

    assert_eq!(send(&router, "/admin/host/status", None).await.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(send(&router, "/admin/host/status", Some(SYSTEM_KEY)).await.status(), StatusCode::UNAUTHORIZED);

    let res = send(&router, "/admin/host/status", Some(MASTER_KEY)).await;
    assert_eq!(res.status(), StatusCode::OK);
    let status = json(res).await;
    // five configured routes, /health, two admin routes
    assert_eq!(status["routes"], 8);
    assert_eq!(status["open_routes"], 3);

    let res = send(&router, "/admin/host/keys", Some(MASTER_KEY)).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("durabletask_extension"));
    assert!(!text.contains(SYSTEM_KEY));
    assert!(!text.contains(MASTER_KEY));
}

#[tokio::test]
async fn test_admin_routes_can_be_disabled() {
    let store = TestStore::standard().shared();
    let mut config = host_config();
    config.admin.enabled = false;
    let router = HttpServer::new(config, store.clone(), CancellationToken::new())
        .unwrap()
        .router();

    let res = send(&router, "/admin/host/status", Some(MASTER_KEY)).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_misconfigured_requirement_rejected_at_registration() {
    let store = TestStore::standard().shared();
    let mut config = host_config();
    config.routes[0].level = "owner".into();

    let err = HttpServer::new(config, store, CancellationToken::new()).err().unwrap();
    match err {
        ConfigError::Validation(errors) => assert!(matches!(
            &errors[..],
            [ValidationError::MisconfiguredRequirement { source, .. }] if source.level == "owner"
        )),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_unregistrable_paths_are_config_errors() {
    let store = TestStore::standard().shared();

    let mut config = host_config();
    config.routes[1].path = "/api/{name}".into();
    config.routes[2].path = "/api/{id}".into();
    let err = HttpServer::new(config, store.clone(), CancellationToken::new()).err().unwrap();
    assert!(matches!(
        err,
        ConfigError::Validation(ref errors) if errors == &[ValidationError::DuplicatePath("/api/{id}".into())]
    ));

    let mut config = host_config();
    config.routes[1].path = "/api/*rest".into();
    let err = HttpServer::new(config, store, CancellationToken::new()).err().unwrap();
    assert!(matches!(
        err,
        ConfigError::Validation(ref errors) if errors == &[ValidationError::InvalidPath("/api/*rest".into())]
    ));
}

#[tokio::test]
async fn test_nested_layers_resolve_once() {
    let store = TestStore::standard().shared();
    let resolver = LevelResolver::new(store.clone());
    let layer_state = |requirement: RouteRequirement| RouteAuthState {
        resolver: resolver.clone(),
        requirement: Arc::new(requirement),
        cancel: CancellationToken::new(),
    };

    let router = Router::new()
        .route(
            "/nested",
            get(|req: Request<Body>| async move {
                let slot = req.extensions().get::<AuthorizationSlot>().cloned().unwrap();
                assert_eq!(slot.state(), SlotState::Resolved(AuthorizationLevel::Function));
                "ok"
            }),
        )
        .route_layer(middleware::from_fn_with_state(
            layer_state(RouteRequirement::new(AuthorizationLevel::Function).for_function("F1")),
            authorization_middleware,
        ))
        .route_layer(middleware::from_fn_with_state(
            layer_state(RouteRequirement::new(AuthorizationLevel::Function).for_function("F1")),
            authorization_middleware,
        ));

    let res = send(&router, "/nested", Some(F1_KEY)).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(store.host_calls(), 1);
    assert_eq!(store.function_calls(), 1);
}

#[tokio::test]
async fn test_nested_layers_with_different_functions_resolve_separately() {
    let store = TestStore::standard().shared();
    let resolver = LevelResolver::new(store.clone());
    let layer_state = |function: &str| RouteAuthState {
        resolver: resolver.clone(),
        requirement: Arc::new(RouteRequirement::new(AuthorizationLevel::Function).for_function(function)),
        cancel: CancellationToken::new(),
    };

    // The last layer added runs first: F1 outside, F2 inside.
    let router = Router::new()
        .route("/nested", get(|| async { "ok" }))
        .route_layer(middleware::from_fn_with_state(layer_state("F2"), authorization_middleware))
        .route_layer(middleware::from_fn_with_state(layer_state("F1"), authorization_middleware));

    // F1's scoped key passes the outer layer but not the inner one.
    let res = send(&router, "/nested", Some(F1_KEY)).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(store.host_calls(), 2);
    assert_eq!(store.function_calls(), 2);

    // A host-level function key satisfies both scopes.
    let res = send(&router, "/nested", Some(HOST_FUNCTION_KEY)).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_shutdown_cancels_resolution() {
    let store = TestStore::standard().shared();
    let token = CancellationToken::new();
    let router = HttpServer::new(host_config(), store.clone(), token.clone())
        .unwrap()
        .router();
    token.cancel();

    let res = send(&router, "/api/f1", Some(MASTER_KEY)).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}
