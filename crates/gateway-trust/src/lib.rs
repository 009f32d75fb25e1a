// crates/gateway-trust/src/lib.rs
// ============================================================================
// Module: Trust Classifier
// Description: Four-level precedence engine assigning auto/review/block.
// Purpose: Decide whether a tool invocation may be forwarded without review.
// Dependencies: gateway-protocol, globset, async-trait, thiserror
// ============================================================================

//! ## Overview
//! [`classify`] evaluates, in order, agent overrides, workspace rules, and
//! system defaults, falling back to [`TrustTier::Auto`] when nothing
//! matches. Each layer is backed by a collaborator trait so the gateway can
//! plug in whatever persistence it has (database, config file, in-memory
//! fixture) without the classifier knowing about it.
//! Security posture: a provider error aborts classification as a trust
//! denial, never silently as `auto`.

pub mod providers;

use gateway_protocol::TrustTier;
pub use providers::AgentTrustProvider;
pub use providers::StaticAgentTrustProvider;
pub use providers::StaticWorkspaceTrustProvider;
pub use providers::SystemTrustDefaultProvider;
pub use providers::SystemTrustDefaultProviderStatic;
pub use providers::TrustProviderError;
pub use providers::WorkspaceTrustProvider;

/// Evaluates the trust tier for `tool_name`, consulting `agent_id`'s
/// overrides and `workspace_id`'s rules first, then the system defaults.
///
/// # Errors
///
/// Returns [`TrustProviderError`] when a collaborator provider fails; the
/// caller must treat this as a trust denial, not as `auto`.
pub async fn classify(
    tool_name: &str,
    workspace_id: Option<&str>,
    agent_id: Option<&str>,
    agent_overrides: &dyn AgentTrustProvider,
    workspace_rules: &dyn WorkspaceTrustProvider,
    system_defaults: &dyn SystemTrustDefaultProvider,
) -> Result<TrustTier, TrustProviderError> {
    if let Some(agent_id) = agent_id {
        let overrides = agent_overrides.get_agent_overrides(agent_id).await?;
        if let Some(tier) = first_match_in_map(tool_name, &overrides) {
            return Ok(tier);
        }
    }

    if let Some(workspace_id) = workspace_id {
        let rules = workspace_rules.list_workspace_rules(workspace_id).await?;
        if let Some(tier) = first_match_in_ordered(tool_name, &rules) {
            return Ok(tier);
        }
    }

    let defaults = system_defaults.list_defaults().await?;
    if let Some(tier) = first_match_in_ordered(tool_name, &defaults) {
        return Ok(tier);
    }

    Ok(TrustTier::Auto)
}

/// A single rule: a glob pattern paired with a raw (unnormalized) tier.
#[derive(Debug, Clone)]
pub struct TrustRule {
    /// Shell-style glob, anchored to the full tool name.
    pub pattern: String,
    /// Raw tier string as stored by the provider; normalized on match.
    pub tier: String,
}

fn glob_matches(pattern: &str, tool_name: &str) -> bool {
    globset::Glob::new(pattern)
        .map(|glob| glob.compile_matcher().is_match(tool_name))
        .unwrap_or(false)
}

/// Agent overrides arrive as an unordered `pattern -> tier` map; multiple
/// matches are broken deterministically by sorting candidate patterns
/// lexicographically before taking the first.
fn first_match_in_map(
    tool_name: &str,
    overrides: &std::collections::HashMap<String, String>,
) -> Option<TrustTier> {
    let mut patterns: Vec<&String> = overrides.keys().collect();
    patterns.sort();
    patterns
        .into_iter()
        .find(|pattern| glob_matches(pattern, tool_name))
        .map(|pattern| TrustTier::parse_normalized(&overrides[pattern]))
}

/// Workspace rules and system defaults are already canonically ordered by
/// the provider; the first matching entry wins.
fn first_match_in_ordered(tool_name: &str, rules: &[TrustRule]) -> Option<TrustTier> {
    rules
        .iter()
        .find(|rule| glob_matches(&rule.pattern, tool_name))
        .map(|rule| TrustTier::parse_normalized(&rule.tier))
}

#[cfg(test)]
mod tests;
