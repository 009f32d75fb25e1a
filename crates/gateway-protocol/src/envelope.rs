// crates/gateway-protocol/src/envelope.rs
// ============================================================================
// Module: JSON-RPC Envelope
// Description: Opaque request/response envelope types for the MCP transport.
// Purpose: Preserve request ids bit-for-bit and keep `params` unparsed.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! The request id must round-trip exactly: a client id of `1` must never
//! come back as `1.0`, and a present `"id": null` must be distinguishable
//! from an absent `id` field (the latter marks a notification). Deserializing
//! straight into `Option<serde_json::Value>` cannot make that distinction,
//! because serde's `Option` impl treats a JSON `null` the same as a missing
//! field. [`RawRequest`] instead holds the parsed top-level [`Value`] and
//! reads fields out of it directly, so presence and nullness stay separate.
//!
//! `params` is never unmarshalled here; only the method handler knows its
//! shape.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::error_codes;

/// Canonical JSON-RPC protocol version string.
pub const JSONRPC_VERSION: &str = "2.0";

// ============================================================================
// SECTION: Request
// ============================================================================

/// A single JSON-RPC request parsed to its raw top-level JSON value.
///
/// # Invariants
/// - The underlying value is always a JSON object.
/// - `id()` distinguishes "field absent" (`None`) from "field present and
///   `null`" (`Some(&Value::Null)`).
#[derive(Debug, Clone, PartialEq)]
pub struct RawRequest {
    raw: Value,
}

impl RawRequest {
    /// Wraps a pre-parsed JSON object as a raw request.
    ///
    /// # Errors
    ///
    /// Returns [`RequestParseError::NotAnObject`] when the value is not a
    /// JSON object.
    pub fn from_value(raw: Value) -> Result<Self, RequestParseError> {
        if !raw.is_object() {
            return Err(RequestParseError::NotAnObject);
        }
        Ok(Self {
            raw,
        })
    }

    /// Parses a single request from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`RequestParseError::Syntax`] on invalid JSON, or
    /// [`RequestParseError::NotAnObject`] when the top-level value is not an
    /// object.
    pub fn parse(bytes: &[u8]) -> Result<Self, RequestParseError> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|err| RequestParseError::Syntax(err.to_string()))?;
        Self::from_value(value)
    }

    /// Returns the request id, or `None` when the `id` field is absent
    /// (a notification).
    #[must_use]
    pub fn id(&self) -> Option<&Value> {
        self.raw.get("id")
    }

    /// Returns true when this request carries no `id` field.
    #[must_use]
    pub fn is_notification(&self) -> bool {
        self.id().is_none()
    }

    /// Returns the id for use in a response, defaulting to `null` when
    /// absent (used only for envelope-level errors emitted before
    /// notification status is checked).
    #[must_use]
    pub fn id_or_null(&self) -> Value {
        self.id().cloned().unwrap_or(Value::Null)
    }

    /// Returns the `jsonrpc` field value as a string, if present.
    #[must_use]
    pub fn jsonrpc(&self) -> Option<&str> {
        self.raw.get("jsonrpc").and_then(Value::as_str)
    }

    /// Returns true when `jsonrpc` is exactly the literal `"2.0"`.
    #[must_use]
    pub fn has_valid_version(&self) -> bool {
        self.jsonrpc() == Some(JSONRPC_VERSION)
    }

    /// Returns the `method` field value as a string, if present.
    #[must_use]
    pub fn method(&self) -> Option<&str> {
        self.raw.get("method").and_then(Value::as_str)
    }

    /// Returns true when `method` is present and non-empty.
    #[must_use]
    pub fn has_valid_method(&self) -> bool {
        self.method().is_some_and(|method| !method.is_empty())
    }

    /// Returns the opaque `params` blob, unparsed.
    #[must_use]
    pub fn params(&self) -> Option<&Value> {
        self.raw.get("params")
    }
}

/// Errors that can occur while parsing a raw JSON-RPC request.
#[derive(Debug, Error)]
pub enum RequestParseError {
    /// The body was not valid JSON.
    #[error("invalid json: {0}")]
    Syntax(String),
    /// The parsed value was not a JSON object.
    #[error("request is not a json object")]
    NotAnObject,
}

/// Splits a JSON-RPC body into either a single request or a batch.
///
/// Per the wire convention, a body is a batch when its first non-whitespace
/// byte is `[`.
#[must_use]
pub fn is_batch(trimmed_body: &[u8]) -> bool {
    trimmed_body.first() == Some(&b'[')
}

// ============================================================================
// SECTION: Response
// ============================================================================

/// A JSON-RPC response envelope: `result` XOR `error`, both optional so
/// that exactly one is serialized.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseEnvelope {
    /// Protocol version, always `"2.0"`.
    pub jsonrpc: &'static str,
    /// Echoes the request id bit-for-bit.
    pub id: Value,
    /// Successful result payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error payload, present only on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl ResponseEnvelope {
    /// Builds a successful response envelope.
    #[must_use]
    pub const fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Builds an error response envelope.
    #[must_use]
    pub const fn failure(id: Value, error: RpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: None,
            error: Some(error),
        }
    }

    /// Builds a transport-level parse error response (id is always `null`).
    #[must_use]
    pub fn parse_error() -> Self {
        Self::failure(Value::Null, RpcError::new(error_codes::PARSE_ERROR, "parse error"))
    }

    /// Builds a transport-level invalid-request error response.
    #[must_use]
    pub fn invalid_request(id: Value) -> Self {
        Self::failure(id, RpcError::new(error_codes::INVALID_REQUEST, "invalid request"))
    }

    /// Builds a transport-level internal error response.
    #[must_use]
    pub fn internal_error(id: Value) -> Self {
        Self::failure(id, RpcError::new(error_codes::INTERNAL_ERROR, "internal error"))
    }
}

/// A JSON-RPC error payload.
#[derive(Debug, Clone, Serialize)]
pub struct RpcError {
    /// Numeric error code.
    pub code: i64,
    /// Human-readable message.
    pub message: String,
    /// Optional structured error metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    /// Builds an error payload with no structured data.
    #[must_use]
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Builds an error payload with structured data attached.
    #[must_use]
    pub fn with_data(code: i64, message: impl Into<String>, data: Value) -> Self {
        Self {
            code,
            message: message.into(),
            data: Some(data),
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
