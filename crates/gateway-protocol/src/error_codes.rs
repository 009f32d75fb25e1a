// crates/gateway-protocol/src/error_codes.rs
// ============================================================================
// Module: JSON-RPC Error Codes
// Description: Reserved JSON-RPC 2.0 error codes the transport may emit.
// Purpose: Centralize the transport's own error taxonomy.
// Dependencies: none
// ============================================================================

//! ## Overview
//! These five codes are the only ones the transport itself emits. Method
//! handlers (and the gateway's own trust/breaker denials, surfaced as
//! handler-level errors) may use other codes; this module does not model
//! those.

/// Request body could not be parsed as JSON.
pub const PARSE_ERROR: i64 = -32700;
/// Request failed basic envelope validation (`jsonrpc`/`method`).
pub const INVALID_REQUEST: i64 = -32600;
/// The method handler does not recognize the requested method.
pub const METHOD_NOT_FOUND: i64 = -32601;
/// The method handler rejected the supplied parameters.
pub const INVALID_PARAMS: i64 = -32602;
/// An unrecoverable internal error occurred while producing a response.
pub const INTERNAL_ERROR: i64 = -32603;
