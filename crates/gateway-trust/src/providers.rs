// crates/gateway-trust/src/providers.rs
// ============================================================================
// Module: Trust Providers
// Description: Collaborator traits consumed by the classifier, plus static
//              in-memory reference implementations.
// Purpose: Decouple rule storage from evaluation so real deployments can
//          back these with a database while tests use fixtures.
// Dependencies: async-trait, thiserror
// ============================================================================

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::TrustRule;

/// Error surfaced by a trust collaborator provider.
#[derive(Debug, Error)]
pub enum TrustProviderError {
    /// The backing store could not be reached or returned malformed data.
    #[error("trust provider unavailable: {0}")]
    Unavailable(String),
}

/// Supplies per-agent tier overrides.
///
/// # Invariants
/// - The returned map is unordered; callers must not assume iteration order.
#[async_trait]
pub trait AgentTrustProvider: Send + Sync {
    /// Returns the `pattern -> tier` overrides configured for `agent_id`.
    ///
    /// # Errors
    ///
    /// Returns [`TrustProviderError`] when the overrides cannot be loaded.
    async fn get_agent_overrides(
        &self,
        agent_id: &str,
    ) -> Result<HashMap<String, String>, TrustProviderError>;
}

/// Supplies per-workspace rules in canonical `pattern ASC` order.
#[async_trait]
pub trait WorkspaceTrustProvider: Send + Sync {
    /// Returns the ordered rule list configured for `workspace_id`.
    ///
    /// # Errors
    ///
    /// Returns [`TrustProviderError`] when the rules cannot be loaded.
    async fn list_workspace_rules(
        &self,
        workspace_id: &str,
    ) -> Result<Vec<TrustRule>, TrustProviderError>;
}

/// Supplies the system-wide default rules, ordered by descending priority.
#[async_trait]
pub trait SystemTrustDefaultProvider: Send + Sync {
    /// Returns the default rule list, highest priority first.
    ///
    /// # Errors
    ///
    /// Returns [`TrustProviderError`] when the defaults cannot be loaded.
    async fn list_defaults(&self) -> Result<Vec<TrustRule>, TrustProviderError>;
}

/// In-memory [`AgentTrustProvider`] backed by a fixed map of agent ids to
/// their override maps. Suitable for tests and single-node deployments.
#[derive(Debug, Clone, Default)]
pub struct StaticAgentTrustProvider {
    overrides_by_agent: HashMap<String, HashMap<String, String>>,
}

impl StaticAgentTrustProvider {
    /// Builds a provider from a fixed `agent_id -> overrides` table.
    #[must_use]
    pub fn new(overrides_by_agent: HashMap<String, HashMap<String, String>>) -> Self {
        Self { overrides_by_agent }
    }
}

#[async_trait]
impl AgentTrustProvider for StaticAgentTrustProvider {
    async fn get_agent_overrides(
        &self,
        agent_id: &str,
    ) -> Result<HashMap<String, String>, TrustProviderError> {
        Ok(self.overrides_by_agent.get(agent_id).cloned().unwrap_or_default())
    }
}

/// In-memory [`WorkspaceTrustProvider`] backed by a fixed map of workspace
/// ids to their rule lists. Rules are re-sorted by pattern on construction
/// to match the canonical `ORDER BY tool_pattern ASC` contract.
#[derive(Debug, Clone, Default)]
pub struct StaticWorkspaceTrustProvider {
    rules_by_workspace: HashMap<String, Vec<TrustRule>>,
}

impl StaticWorkspaceTrustProvider {
    /// Builds a provider from a fixed `workspace_id -> rules` table.
    #[must_use]
    pub fn new(mut rules_by_workspace: HashMap<String, Vec<TrustRule>>) -> Self {
        for rules in rules_by_workspace.values_mut() {
            rules.sort_by(|a, b| a.pattern.cmp(&b.pattern));
        }
        Self { rules_by_workspace }
    }
}

#[async_trait]
impl WorkspaceTrustProvider for StaticWorkspaceTrustProvider {
    async fn list_workspace_rules(
        &self,
        workspace_id: &str,
    ) -> Result<Vec<TrustRule>, TrustProviderError> {
        Ok(self.rules_by_workspace.get(workspace_id).cloned().unwrap_or_default())
    }
}

/// In-memory [`SystemTrustDefaultProvider`] backed by a fixed rule list,
/// sorted by descending priority on construction.
#[derive(Debug, Clone, Default)]
pub struct SystemTrustDefaultProviderStatic {
    rules: Vec<(i64, TrustRule)>,
}

impl SystemTrustDefaultProviderStatic {
    /// Builds a provider from `(priority, rule)` pairs.
    #[must_use]
    pub fn new(mut rules: Vec<(i64, TrustRule)>) -> Self {
        rules.sort_by(|a, b| b.0.cmp(&a.0));
        Self { rules }
    }
}

#[async_trait]
impl SystemTrustDefaultProvider for SystemTrustDefaultProviderStatic {
    async fn list_defaults(&self) -> Result<Vec<TrustRule>, TrustProviderError> {
        Ok(self.rules.iter().map(|(_, rule)| rule.clone()).collect())
    }
}
