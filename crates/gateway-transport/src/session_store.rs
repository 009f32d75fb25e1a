// crates/gateway-transport/src/session_store.rs
// ============================================================================
// Module: Session Store
// Description: Process-wide, reader-writer-locked session registry.
// Purpose: Back the `initialize`/DELETE session lifecycle.
// Dependencies: gateway-protocol, tokio
// ============================================================================

//! ## Overview
//! One map, alive for the process lifetime. There is deliberately no TTL —
//! a session lives until an explicit DELETE or process restart. Reads
//! dominate writes in the expected workload, hence the reader-writer lock.

use std::collections::HashMap;
use std::sync::Arc;

use gateway_protocol::Session;
use gateway_protocol::SessionId;
use serde_json::Value;
use tokio::sync::RwLock;

/// Shared, process-wide session registry.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    /// Builds an empty session store.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Creates a new session for the given client capabilities and stores it.
    pub async fn create(&self, client_capabilities: Option<Value>) -> SessionId {
        let session = Session::new(client_capabilities);
        let id = session.id.clone();
        self.sessions.write().await.insert(id.as_str().to_string(), session);
        id
    }

    /// Looks up a session by id. Unknown ids return `None`, never an error.
    pub async fn get(&self, id: &str) -> Option<Session> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Deletes a session by id. Deleting an unknown id is a silent no-op.
    pub async fn delete(&self, id: &str) {
        self.sessions.write().await.remove(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn created_session_is_retrievable_by_id() {
        let store = SessionStore::new();
        let id = store.create(None).await;
        assert!(store.get(id.as_str()).await.is_some());
    }

    #[tokio::test]
    async fn lookup_of_unknown_id_is_none_not_an_error() {
        let store = SessionStore::new();
        assert!(store.get("does-not-exist").await.is_none());
    }

    #[tokio::test]
    async fn delete_of_unknown_id_is_a_silent_no_op() {
        let store = SessionStore::new();
        store.delete("does-not-exist").await;
    }

    #[tokio::test]
    async fn deleted_session_is_no_longer_retrievable() {
        let store = SessionStore::new();
        let id = store.create(None).await;
        store.delete(id.as_str()).await;
        assert!(store.get(id.as_str()).await.is_none());
    }

    #[tokio::test]
    async fn fifty_concurrent_creates_produce_fifty_distinct_retrievable_ids() {
        let store = SessionStore::new();
        let mut handles = Vec::new();
        for _ in 0..50 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move { store.create(None).await }));
        }
        let mut ids = std::collections::HashSet::new();
        for handle in handles {
            let id = handle.await.unwrap();
            assert!(ids.insert(id.as_str().to_string()));
        }
        for id in &ids {
            assert!(store.get(id).await.is_some());
        }
    }
}
