// crates/gateway-transport/src/http.rs
// ============================================================================
// Module: HTTP Binding
// Description: Wires the dispatch core to an axum router.
// Purpose: Own the framing-layer HTTP concerns (status codes, headers,
//          method/content-type/size rejection) that dispatch() does not.
// Dependencies: axum, tokio
// ============================================================================

//! ## Overview
//! Everything here is about the HTTP envelope, not JSON-RPC semantics:
//! method filtering, `Content-Type` checks, the 1 MiB body cap, and the
//! `Mcp-Session-Id` header. The actual JSON-RPC logic lives in [`crate::dispatch`].

use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::HeaderValue;
use axum::http::Method;
use axum::http::StatusCode;
use axum::http::header::ALLOW;
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::MethodRouter;

use crate::MAX_REQUEST_BODY_BYTES;
use crate::MethodHandler;
use crate::SESSION_HEADER_NAME;
use crate::SessionStore;
use crate::dispatch;
use crate::dispatch::DispatchOutcome;
use crate::telemetry::CorrelationIdGenerator;
use crate::telemetry::SERVER_CORRELATION_HEADER;

/// Shared state for the gateway's HTTP endpoint.
pub struct GatewayState {
    /// Domain method dispatch.
    pub handler: Arc<dyn MethodHandler>,
    /// Session registry; `None` disables the `initialize` session path.
    pub sessions: Option<Arc<SessionStore>>,
    /// Issues a correlation ID for every request, attached as a response header.
    pub correlation: CorrelationIdGenerator,
}

/// Builds the router exposing the gateway's single JSON-RPC endpoint at `path`.
#[must_use]
pub fn router(path: &str, state: Arc<GatewayState>) -> Router {
    Router::new().route(path, endpoint()).with_state(state)
}

fn endpoint() -> MethodRouter<Arc<GatewayState>> {
    axum::routing::on(
        axum::routing::MethodFilter::POST.or(axum::routing::MethodFilter::DELETE),
        handle_request,
    )
}

async fn handle_request(
    State(state): State<Arc<GatewayState>>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let mut response = match method {
        Method::POST => handle_post(&state, &headers, &body).await,
        Method::DELETE => handle_delete(&state, &headers).await,
        _ => method_not_allowed(),
    };
    if let Ok(value) = HeaderValue::from_str(&state.correlation.issue()) {
        response.headers_mut().insert(SERVER_CORRELATION_HEADER, value);
    }
    response
}

async fn handle_post(state: &GatewayState, headers: &HeaderMap, body: &[u8]) -> Response {
    if !content_type_is_json(headers) {
        return StatusCode::UNSUPPORTED_MEDIA_TYPE.into_response();
    }
    if body.len() > MAX_REQUEST_BODY_BYTES {
        return StatusCode::PAYLOAD_TOO_LARGE.into_response();
    }

    let trimmed = trim_leading_whitespace(body);
    let sessions = state.sessions.as_deref();

    if gateway_protocol::is_batch(trimmed) {
        let response = dispatch::dispatch_batch(trimmed, state.handler.as_ref()).await;
        return json_response(StatusCode::OK, &response, None);
    }

    match dispatch::dispatch(trimmed, state.handler.as_ref(), sessions).await {
        DispatchOutcome::Response(body) => json_response(StatusCode::OK, &body, None),
        DispatchOutcome::NoContent => StatusCode::NO_CONTENT.into_response(),
        DispatchOutcome::Initialized { body, session_id } => {
            json_response(StatusCode::OK, &body, Some(session_id))
        }
    }
}

async fn handle_delete(state: &GatewayState, headers: &HeaderMap) -> Response {
    if let Some(sessions) = &state.sessions {
        if let Some(id) = headers.get(SESSION_HEADER_NAME).and_then(|value| value.to_str().ok()) {
            if !id.is_empty() {
                sessions.delete(id).await;
            }
        }
    }
    StatusCode::NO_CONTENT.into_response()
}

fn method_not_allowed() -> Response {
    let mut response = StatusCode::METHOD_NOT_ALLOWED.into_response();
    response.headers_mut().insert(ALLOW, HeaderValue::from_static("POST, DELETE"));
    response
}

fn content_type_is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.to_ascii_lowercase().starts_with("application/json"))
}

fn trim_leading_whitespace(body: &[u8]) -> &[u8] {
    let start = body.iter().position(|byte| !byte.is_ascii_whitespace()).unwrap_or(body.len());
    &body[start..]
}

fn json_response(status: StatusCode, body: &serde_json::Value, session_id: Option<String>) -> Response {
    let mut response = (status, axum::Json(body.clone())).into_response();
    if let Some(session_id) = session_id {
        if let Ok(value) = HeaderValue::from_str(&session_id) {
            response.headers_mut().insert(SESSION_HEADER_NAME, value);
        }
    }
    response
}

#[cfg(test)]
mod tests;
