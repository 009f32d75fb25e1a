// crates/gateway-transport/src/method_handler.rs
// ============================================================================
// Module: Method Handler
// Description: The collaborator trait that owns domain method dispatch.
// Purpose: Let the transport stay ignorant of what methods mean.
// Dependencies: async-trait, serde_json
// ============================================================================

//! ## Overview
//! The transport's own error vocabulary is limited to the reserved
//! JSON-RPC range (parse/invalid-request/invalid-params/internal). Anything
//! domain-specific — method-not-found, a trust denial, an upstream failure
//! — is the method handler's concern, surfaced through [`MethodError`].

use async_trait::async_trait;
use serde_json::Value;

/// A domain-level error returned by a [`MethodHandler`].
#[derive(Debug, Clone)]
pub struct MethodError {
    /// JSON-RPC error code; outside the transport's reserved range unless
    /// the handler is reporting invalid params.
    pub code: i64,
    /// Human-readable message.
    pub message: String,
    /// Optional structured detail.
    pub data: Option<Value>,
}

impl MethodError {
    /// Builds a method error with no structured data.
    #[must_use]
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Builds a method-not-found error for `method`.
    #[must_use]
    pub fn method_not_found(method: &str) -> Self {
        Self::new(gateway_protocol::error_codes::METHOD_NOT_FOUND, format!("method not found: {method}"))
    }
}

/// Domain dispatch collaborator consumed by the transport.
///
/// # Invariants
/// - `params` is passed through unparsed; only the handler knows its schema.
#[async_trait]
pub trait MethodHandler: Send + Sync {
    /// Handles a single JSON-RPC method call, returning the `result` value
    /// on success.
    ///
    /// # Errors
    ///
    /// Returns [`MethodError`] for any domain-level failure.
    async fn handle_method(&self, method: &str, params: Option<&Value>) -> Result<Value, MethodError>;
}

/// Minimal reference handler: answers `ping` with `{}`, everything else is
/// method-not-found. Used by transport-only tests.
pub struct EchoMethodHandler;

#[async_trait]
impl MethodHandler for EchoMethodHandler {
    async fn handle_method(&self, method: &str, _params: Option<&Value>) -> Result<Value, MethodError> {
        match method {
            "ping" => Ok(serde_json::json!({})),
            other => Err(MethodError::method_not_found(other)),
        }
    }
}
