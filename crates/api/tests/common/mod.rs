#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use warden_api::auth::jwt::JwtConfig;
use warden_api::auth::AuthService;
use warden_api::router::build_app_router;
use warden_api::state::AppState;
use warden_db::store::MemoryCredentialStore;

pub const TEST_SECRET: &str = "integration-test-secret";

/// Token settings used by every test app: one hour lifetime.
pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: TEST_SECRET.to_string(),
        token_ttl: Duration::from_secs(3600),
    }
}

/// Build the full application router over the given in-memory store.
///
/// Uses the same builder as `main.rs`, so tests exercise the production
/// middleware stack (request id, timeout, tracing, panic recovery).
pub fn build_test_app(store: MemoryCredentialStore) -> Router {
    let state = AppState {
        auth: AuthService::new(Arc::new(store), test_jwt_config()),
    };
    build_app_router(state, Duration::from_secs(30))
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
