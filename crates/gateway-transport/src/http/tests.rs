// crates/gateway-transport/src/http/tests.rs
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;
use axum::http::StatusCode;
use tower::ServiceExt;

use super::*;
use crate::EchoMethodHandler;

fn app(sessions: Option<Arc<SessionStore>>) -> Router {
    let state = Arc::new(GatewayState {
        handler: Arc::new(EchoMethodHandler),
        sessions,
        correlation: CorrelationIdGenerator::new(),
    });
    router("/mcp", state)
}

async fn post(app: Router, body: &'static str) -> Response {
    app.oneshot(
        Request::builder()
            .method("POST")
            .uri("/mcp")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap(),
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn happy_path_ping_returns_200_with_the_result() {
    let response = post(app(None), r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn notification_returns_204_with_an_empty_body() {
    let response = post(app(None), r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn wrong_content_type_is_rejected_with_415() {
    let state = Arc::new(GatewayState {
        handler: Arc::new(EchoMethodHandler),
        sessions: None,
        correlation: CorrelationIdGenerator::new(),
    });
    let response = router("/mcp", state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/mcp")
                .header("content-type", "text/plain")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn oversize_body_is_rejected_with_413() {
    let oversized = "x".repeat(MAX_REQUEST_BODY_BYTES + 1);
    let state = Arc::new(GatewayState {
        handler: Arc::new(EchoMethodHandler),
        sessions: None,
        correlation: CorrelationIdGenerator::new(),
    });
    let response = router("/mcp", state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/mcp")
                .header("content-type", "application/json")
                .body(Body::from(oversized))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn non_post_non_delete_method_is_405_with_allow_header() {
    let response = app(None)
        .oneshot(Request::builder().method("GET").uri("/mcp").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.headers().get(ALLOW).unwrap(), "POST, DELETE");
}

#[tokio::test]
async fn initialize_sets_the_session_header_with_a_64_char_id() {
    let sessions = SessionStore::new();
    let body = r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2025-03-26","capabilities":{},"clientInfo":{"name":"t","version":"1"}}}"#;
    let response = post(app(Some(sessions)), body).await;
    assert_eq!(response.status(), StatusCode::OK);
    let header = response.headers().get(SESSION_HEADER_NAME).unwrap().to_str().unwrap();
    assert_eq!(header.len(), 64);
}

#[tokio::test]
async fn delete_with_unknown_session_id_still_returns_204() {
    let sessions = SessionStore::new();
    let state = Arc::new(GatewayState {
        handler: Arc::new(EchoMethodHandler),
        sessions: Some(sessions),
        correlation: CorrelationIdGenerator::new(),
    });
    let response = router("/mcp", state)
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/mcp")
                .header(SESSION_HEADER_NAME, "does-not-exist")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
