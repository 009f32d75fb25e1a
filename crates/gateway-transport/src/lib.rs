// crates/gateway-transport/src/lib.rs
// ============================================================================
// Module: MCP Transport
// Description: HTTP JSON-RPC 2.0 front door for the gateway.
// Purpose: Frame, validate, and dispatch JSON-RPC requests; own sessions.
// Dependencies: axum, gateway-protocol, gateway-trust, gateway-breaker,
//               gateway-proxy, tokio
// ============================================================================

//! ## Overview
//! The transport exposes a single endpoint accepting `POST` and `DELETE`.
//! Dispatch itself ([`dispatch`]) is transport-framework-agnostic — it
//! takes raw bytes and a [`MethodHandler`] and returns a [`DispatchOutcome`]
//! — so it can be exercised without spinning up an HTTP server. [`http`]
//! wires that core to axum.

pub mod classify_and_forward;
pub mod dispatch;
pub mod http;
pub mod method_handler;
pub mod session_store;
pub mod telemetry;
pub mod tool_resolver;

pub use classify_and_forward::ClassifyAndForwardHandler;
pub use dispatch::DispatchOutcome;
pub use dispatch::dispatch;
pub use dispatch::dispatch_batch;
pub use method_handler::EchoMethodHandler;
pub use method_handler::MethodError;
pub use method_handler::MethodHandler;
pub use session_store::SessionStore;
pub use telemetry::CorrelationIdGenerator;
pub use tool_resolver::ResolvedTool;
pub use tool_resolver::StaticToolResolver;
pub use tool_resolver::ToolResolver;

/// Hard cap on inbound request bodies; bodies over this size are rejected
/// with HTTP 413 before any JSON parsing is attempted.
pub const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;

/// The single protocol version string this gateway advertises.
pub const PROTOCOL_VERSION: &str = "2025-03-26";

/// `Mcp-Session-Id` header name, shared between the initialize response
/// writer and the DELETE handler.
pub const SESSION_HEADER_NAME: &str = "Mcp-Session-Id";
