// crates/gateway-trust/src/tests.rs
use std::collections::HashMap;

use gateway_protocol::TrustTier;

use super::*;

fn agent_provider(overrides: &[(&str, &str, &str)]) -> StaticAgentTrustProvider {
    let mut by_agent: HashMap<String, HashMap<String, String>> = HashMap::new();
    for (agent_id, pattern, tier) in overrides {
        by_agent
            .entry((*agent_id).to_string())
            .or_default()
            .insert((*pattern).to_string(), (*tier).to_string());
    }
    StaticAgentTrustProvider::new(by_agent)
}

fn workspace_provider(rules: &[(&str, &str, &str)]) -> StaticWorkspaceTrustProvider {
    let mut by_workspace: HashMap<String, Vec<TrustRule>> = HashMap::new();
    for (workspace_id, pattern, tier) in rules {
        by_workspace.entry((*workspace_id).to_string()).or_default().push(TrustRule {
            pattern: (*pattern).to_string(),
            tier: (*tier).to_string(),
        });
    }
    StaticWorkspaceTrustProvider::new(by_workspace)
}

fn default_provider(rules: &[(i64, &str, &str)]) -> SystemTrustDefaultProviderStatic {
    let rules = rules
        .iter()
        .map(|(priority, pattern, tier)| {
            (
                *priority,
                TrustRule {
                    pattern: (*pattern).to_string(),
                    tier: (*tier).to_string(),
                },
            )
        })
        .collect();
    SystemTrustDefaultProviderStatic::new(rules)
}

#[tokio::test]
async fn no_matching_rule_at_any_layer_falls_back_to_auto() {
    let agents = agent_provider(&[]);
    let workspaces = workspace_provider(&[]);
    let defaults = default_provider(&[]);

    let tier = classify("fs/read", Some("ws-1"), Some("agent-1"), &agents, &workspaces, &defaults)
        .await
        .unwrap();
    assert_eq!(tier, TrustTier::Auto);
}

#[tokio::test]
async fn agent_override_wins_over_workspace_and_system() {
    let agents = agent_provider(&[("agent-1", "fs/*", "block")]);
    let workspaces = workspace_provider(&[("ws-1", "fs/*", "auto")]);
    let defaults = default_provider(&[(10, "fs/*", "auto")]);

    let tier = classify("fs/write", Some("ws-1"), Some("agent-1"), &agents, &workspaces, &defaults)
        .await
        .unwrap();
    assert_eq!(tier, TrustTier::Block);
}

#[tokio::test]
async fn workspace_rule_wins_over_system_default_when_no_agent_override_matches() {
    let agents = agent_provider(&[("agent-1", "shell/*", "auto")]);
    let workspaces = workspace_provider(&[("ws-1", "fs/*", "review")]);
    let defaults = default_provider(&[(10, "fs/*", "auto")]);

    let tier = classify("fs/write", Some("ws-1"), Some("agent-1"), &agents, &workspaces, &defaults)
        .await
        .unwrap();
    assert_eq!(tier, TrustTier::Review);
}

#[tokio::test]
async fn system_defaults_are_evaluated_by_descending_priority() {
    let agents = agent_provider(&[]);
    let workspaces = workspace_provider(&[]);
    let defaults = default_provider(&[(1, "fs/*", "auto"), (100, "fs/write", "block")]);

    let tier = classify("fs/write", None, None, &agents, &workspaces, &defaults).await.unwrap();
    assert_eq!(tier, TrustTier::Block);
}

#[tokio::test]
async fn invalid_tier_string_on_a_matching_rule_fails_closed_to_block() {
    let agents = agent_provider(&[]);
    let workspaces = workspace_provider(&[]);
    let defaults = default_provider(&[(1, "fs/*", "allow-everything")]);

    let tier = classify("fs/write", None, None, &agents, &workspaces, &defaults).await.unwrap();
    assert_eq!(tier, TrustTier::Block);
}

#[tokio::test]
async fn agent_overrides_with_multiple_matches_resolve_deterministically() {
    let agents = agent_provider(&[("agent-1", "fs/*", "block"), ("agent-1", "fs/write", "auto")]);
    let workspaces = workspace_provider(&[]);
    let defaults = default_provider(&[]);

    let first = classify("fs/write", None, Some("agent-1"), &agents, &workspaces, &defaults)
        .await
        .unwrap();
    let second = classify("fs/write", None, Some("agent-1"), &agents, &workspaces, &defaults)
        .await
        .unwrap();
    assert_eq!(first, second, "classification of the same input must be deterministic");
    assert_eq!(first, TrustTier::Block, "lexicographically first pattern is \"fs/*\"");
}

#[tokio::test]
async fn invalid_glob_pattern_never_matches_and_never_aborts() {
    let agents = agent_provider(&[]);
    let workspaces = workspace_provider(&[]);
    let defaults = default_provider(&[(1, "fs/[", "block")]);

    let tier = classify("fs/[", None, None, &agents, &workspaces, &defaults).await.unwrap();
    assert_eq!(tier, TrustTier::Auto);
}

#[tokio::test]
async fn absent_agent_and_workspace_ids_skip_those_layers() {
    let agents = agent_provider(&[("agent-1", "fs/*", "block")]);
    let workspaces = workspace_provider(&[("ws-1", "fs/*", "block")]);
    let defaults = default_provider(&[(1, "fs/*", "auto")]);

    let tier = classify("fs/write", None, None, &agents, &workspaces, &defaults).await.unwrap();
    assert_eq!(tier, TrustTier::Auto);
}

proptest::proptest! {
    #[test]
    fn glob_matching_never_panics_on_arbitrary_patterns_or_names(
        pattern in ".{0,32}",
        tool_name in ".{0,32}",
    ) {
        let _ = glob_matches(&pattern, &tool_name);
    }

    #[test]
    fn a_literal_pattern_with_no_wildcards_only_matches_itself(
        tool_name in "[a-zA-Z0-9/_-]{1,24}",
        other in "[a-zA-Z0-9/_-]{1,24}",
    ) {
        proptest::prop_assert!(glob_matches(&tool_name, &tool_name));
        if tool_name != other {
            proptest::prop_assert!(!glob_matches(&other, &tool_name));
        }
    }
}
