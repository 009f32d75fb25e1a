// crates/gateway-proxy/tests/forward.rs
// ============================================================================
// Module: Forward Integration Tests
// Description: End-to-end tests for forward() against a local HTTP server.
// Purpose: Exercise status passthrough, truncation, auth header injection,
//          and cancellation against a real dial rather than a unit mock.
// Dependencies: gateway-proxy, tiny_http, tokio, tokio-util
// ============================================================================

use std::thread;
use std::time::Duration;

use gateway_proxy::AuthType;
use gateway_proxy::ProxyConfig;
use gateway_proxy::ProxyError;
use gateway_proxy::ProxyRequest;
use serde_json::json;
use tiny_http::Response;
use tiny_http::Server;
use tokio_util::sync::CancellationToken;

fn spawn_server(body: &'static str, status: u16) -> (String, thread::JoinHandle<()>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let url = format!("http://{addr}/");

    let handle = thread::spawn(move || {
        if let Ok(request) = server.recv() {
            let response = Response::from_string(body).with_status_code(status);
            let _ = request.respond(response);
        }
    });

    (url, handle)
}

/// Spawns a server that asserts the inbound request carries `expected_header`
/// before responding, letting a test verify auth injection actually reaches
/// the wire rather than only checking the client-side request builder.
fn spawn_asserting_server(
    expected_header: &'static str,
    expected_value: &'static str,
) -> (String, thread::JoinHandle<bool>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let url = format!("http://{addr}/");

    let handle = thread::spawn(move || {
        let Ok(request) = server.recv() else {
            return false;
        };
        let wanted = format!("{expected_header}: {expected_value}").to_ascii_lowercase();
        let matched = request.headers().iter().any(|h| h.to_string().to_ascii_lowercase() == wanted);
        let response = Response::from_string("{}").with_status_code(200);
        let _ = request.respond(response);
        matched
    });

    (url, handle)
}

fn request(endpoint: &str) -> ProxyRequest {
    ProxyRequest {
        server_endpoint: endpoint.to_string(),
        tool_name: "fs/read".to_string(),
        arguments: json!({"path": "/tmp/x"}),
        auth_type: AuthType::None,
        auth_credential: None,
    }
}

fn local_config() -> ProxyConfig {
    ProxyConfig {
        allow_private_ips: true,
        ..ProxyConfig::default()
    }
}

#[tokio::test]
async fn status_code_and_body_pass_through_on_success() {
    let (url, handle) = spawn_server(r#"{"ok":true}"#, 200);
    let response =
        gateway_proxy::forward(&request(&url), &local_config(), &CancellationToken::new()).await.unwrap();
    assert_eq!(response.status_code, 200);
    assert_eq!(response.body, br#"{"ok":true}"#);
    assert_eq!(response.response_size, response.body.len());
    handle.join().unwrap();
}

#[tokio::test]
async fn non_2xx_status_is_not_a_proxy_error() {
    let (url, handle) = spawn_server("not found", 404);
    let response =
        gateway_proxy::forward(&request(&url), &local_config(), &CancellationToken::new()).await.unwrap();
    assert_eq!(response.status_code, 404);
    handle.join().unwrap();
}

#[tokio::test]
async fn oversized_body_is_truncated_to_max_response_bytes() {
    let body: &'static str = Box::leak("a".repeat(4096).into_boxed_str());
    let (url, handle) = spawn_server(body, 200);
    let config = ProxyConfig {
        max_response_bytes: 16,
        ..local_config()
    };
    let response = gateway_proxy::forward(&request(&url), &config, &CancellationToken::new()).await.unwrap();
    assert_eq!(response.body.len(), 16);
    assert_eq!(response.response_size, 16);
    handle.join().unwrap();
}

#[tokio::test]
async fn bearer_credential_reaches_the_upstream_request() {
    let (url, handle) = spawn_asserting_server("authorization", "Bearer s3cr3t");
    let mut req = request(&url);
    req.auth_type = AuthType::Bearer;
    req.auth_credential = Some("s3cr3t".to_string());
    let response =
        gateway_proxy::forward(&req, &local_config(), &CancellationToken::new()).await.unwrap();
    assert_eq!(response.status_code, 200);
    assert!(handle.join().unwrap(), "upstream never observed the expected Authorization header");
}

#[tokio::test]
async fn latency_and_request_size_are_populated() {
    let (url, handle) = spawn_server("{}", 200);
    let response =
        gateway_proxy::forward(&request(&url), &local_config(), &CancellationToken::new()).await.unwrap();
    assert!(response.request_size > 0);
    assert!(response.latency < Duration::from_secs(5));
    handle.join().unwrap();
}

#[tokio::test]
async fn cancelling_mid_flight_aborts_the_read() {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let url = format!("http://{addr}/");

    let cancel = CancellationToken::new();
    let cancel_for_server = cancel.clone();
    let handle = thread::spawn(move || {
        // Never responds; the client must abort on cancellation rather than
        // hang waiting for a dial that will never complete.
        let _request = server.recv();
        cancel_for_server.cancel();
    });

    let err = gateway_proxy::forward(&request(&url), &local_config(), &cancel).await.unwrap_err();
    assert!(matches!(err, ProxyError::Cancelled));
    handle.join().unwrap();
}
