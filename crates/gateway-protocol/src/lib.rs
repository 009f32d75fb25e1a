// crates/gateway-protocol/src/lib.rs
// ============================================================================
// Module: Gateway Protocol
// Description: Wire types shared by every gateway subsystem.
// Purpose: Define the JSON-RPC envelope, error taxonomy, trust tier, and
//          session record used by the transport, classifier, and proxy.
// Dependencies: serde, serde_json, rand
// ============================================================================

//! ## Overview
//! This crate has no I/O. It defines the opaque JSON-RPC envelope (request
//! ids are carried as raw [`serde_json::Value`] so they round-trip bit for
//! bit), the reserved JSON-RPC error code space the transport is allowed to
//! emit, the [`TrustTier`] enum, and the in-memory [`Session`] record.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod envelope;
pub mod error_codes;
pub mod session;
pub mod trust;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use envelope::RawRequest;
pub use envelope::RequestParseError;
pub use envelope::ResponseEnvelope;
pub use envelope::RpcError;
pub use envelope::is_batch;
pub use session::Session;
pub use session::SessionId;
pub use trust::TrustTier;
