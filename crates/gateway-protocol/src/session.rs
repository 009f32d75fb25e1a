// crates/gateway-protocol/src/session.rs
// ============================================================================
// Module: Session Record
// Description: The in-memory session record created by `initialize`.
// Purpose: Define the session id format and payload shared by the transport.
// Dependencies: rand, serde_json
// ============================================================================

//! ## Overview
//! A session is created only on `initialize` and lives for the process
//! lifetime — there is deliberately no TTL (see spec design notes); a long
//! -running gateway will retain sessions until deleted or until restart.
//! Session ids are 32 random bytes hex-encoded to a 64-character lowercase
//! string, generated with the OS RNG so they are unguessable and, in
//! practice, unique across the store's lifetime.

use rand::RngCore;
use rand::rngs::OsRng;
use serde_json::Value;

/// Number of random bytes backing a session id (64 hex chars).
const SESSION_ID_BYTES: usize = 32;

/// A session identifier: 64 lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Generates a new cryptographically random session id.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; SESSION_ID_BYTES];
        OsRng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Returns the session id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<SessionId> for String {
    fn from(value: SessionId) -> Self {
        value.0
    }
}

/// A live MCP session created by `initialize`.
///
/// # Invariants
/// - `id` is unique across the lifetime of the owning store.
/// - No TTL is enforced; sessions live until deleted or the process exits.
#[derive(Debug, Clone)]
pub struct Session {
    /// Session identifier.
    pub id: SessionId,
    /// Client capabilities supplied at `initialize`, opaque to the transport.
    pub client_capabilities: Option<Value>,
    /// Wall-clock creation time, for diagnostics only (not a TTL anchor).
    pub created_at: std::time::SystemTime,
}

impl Session {
    /// Creates a new session record with a freshly generated id.
    #[must_use]
    pub fn new(client_capabilities: Option<Value>) -> Self {
        Self {
            id: SessionId::generate(),
            client_capabilities,
            created_at: std::time::SystemTime::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SessionId;

    #[test]
    fn generated_id_is_64_lowercase_hex_chars() {
        let id = SessionId::generate();
        let raw = id.as_str();
        assert_eq!(raw.len(), 64, "{raw}");
        assert!(raw.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()), "{raw}");
    }

    #[test]
    fn ten_thousand_generations_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for _ in 0..10_000 {
            let id = SessionId::generate();
            assert!(seen.insert(id.as_str().to_string()), "duplicate session id generated");
        }
    }
}
