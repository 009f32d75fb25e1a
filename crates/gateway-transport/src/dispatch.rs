// crates/gateway-transport/src/dispatch.rs
// ============================================================================
// Module: Dispatch
// Description: Transport-framework-agnostic JSON-RPC request handling.
// Purpose: Parse, validate, and route a single request or batch, leaving
//          HTTP specifics (status codes, headers) to the caller.
// Dependencies: gateway-protocol
// ============================================================================

//! ## Overview
//! [`dispatch`] and [`dispatch_batch`] take raw request bytes and a
//! [`MethodHandler`] and return a [`DispatchOutcome`] describing exactly
//! what the caller should do: emit a body, emit nothing (notification),
//! or run the `initialize` path. Keeping this independent of axum makes
//! it exercisable directly in tests.

use gateway_protocol::RawRequest;
use gateway_protocol::RequestParseError;
use gateway_protocol::ResponseEnvelope;
use gateway_protocol::RpcError;
use gateway_protocol::error_codes;
use serde_json::Value;
use serde_json::json;

use crate::MethodError;
use crate::MethodHandler;
use crate::PROTOCOL_VERSION;
use crate::SessionStore;

/// What the transport should do after dispatching one HTTP body.
pub enum DispatchOutcome {
    /// Respond 200 with this JSON body.
    Response(Value),
    /// Respond 204 with an empty body (the request was a notification, or
    /// its parent batch contained only notifications... see `EmptyBatch`).
    NoContent,
    /// Respond 200 with a freshly minted session id header and this body.
    Initialized {
        /// Body to serialize as the JSON-RPC response.
        body: Value,
        /// Newly created session id, to be set as the session header.
        session_id: String,
    },
}

/// Dispatches a single (non-batch) request body.
pub async fn dispatch(
    body: &[u8],
    handler: &dyn MethodHandler,
    sessions: Option<&SessionStore>,
) -> DispatchOutcome {
    let request = match RawRequest::parse(body) {
        Ok(request) => request,
        Err(RequestParseError::Syntax(_) | RequestParseError::NotAnObject) => {
            return DispatchOutcome::Response(serde_json::to_value(ResponseEnvelope::parse_error()).unwrap());
        }
    };

    if !request.has_valid_version() || !request.has_valid_method() {
        let response = ResponseEnvelope::invalid_request(request.id_or_null());
        return DispatchOutcome::Response(serde_json::to_value(response).unwrap());
    }

    let method = request.method().unwrap_or_default();

    if method == "initialize" {
        if let Some(sessions) = sessions {
            return dispatch_initialize(&request, sessions).await;
        }
    }

    let outcome = handler.handle_method(method, request.params()).await;

    if request.is_notification() {
        return DispatchOutcome::NoContent;
    }

    let response = match outcome {
        Ok(result) => ResponseEnvelope::success(request.id_or_null(), result),
        Err(MethodError { code, message, data }) => ResponseEnvelope::failure(
            request.id_or_null(),
            match data {
                Some(data) => RpcError::with_data(code, message, data),
                None => RpcError::new(code, message),
            },
        ),
    };
    DispatchOutcome::Response(serde_json::to_value(response).unwrap())
}

async fn dispatch_initialize(request: &RawRequest, sessions: &SessionStore) -> DispatchOutcome {
    let client_capabilities = request
        .params()
        .and_then(|params| params.get("capabilities"))
        .cloned();
    let session_id = sessions.create(client_capabilities).await;

    let body = json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {},
        "serverInfo": { "name": "mcp-gateway", "version": env!("CARGO_PKG_VERSION") },
    });

    if request.is_notification() {
        return DispatchOutcome::NoContent;
    }

    let response = ResponseEnvelope::success(request.id_or_null(), body);
    DispatchOutcome::Initialized {
        body: serde_json::to_value(response).unwrap(),
        session_id: session_id.into(),
    }
}

/// Dispatches a batch body (a JSON array of requests).
///
/// An empty array is an `InvalidRequest` at the envelope level. Otherwise
/// each element is dispatched independently; notifications contribute no
/// entry, everything else contributes exactly one entry in input order.
pub async fn dispatch_batch(body: &[u8], handler: &dyn MethodHandler) -> Value {
    let elements: Vec<Value> = match serde_json::from_slice(body) {
        Ok(Value::Array(elements)) => elements,
        _ => {
            return serde_json::to_value(ResponseEnvelope::invalid_request(Value::Null)).unwrap();
        }
    };

    if elements.is_empty() {
        return serde_json::to_value(ResponseEnvelope::invalid_request(Value::Null)).unwrap();
    }

    let mut responses = Vec::new();
    for element in elements {
        let Ok(bytes) = serde_json::to_vec(&element) else {
            responses.push(
                serde_json::to_value(ResponseEnvelope::failure(
                    Value::Null,
                    RpcError::new(error_codes::INTERNAL_ERROR, "failed to re-serialize batch element"),
                ))
                .unwrap(),
            );
            continue;
        };
        match dispatch(&bytes, handler, None).await {
            DispatchOutcome::Response(value) => responses.push(value),
            DispatchOutcome::NoContent => {}
            DispatchOutcome::Initialized { body, .. } => responses.push(body),
        }
    }

    Value::Array(responses)
}
