// crates/gateway-transport/src/tool_resolver.rs
// ============================================================================
// Module: Tool Resolver
// Description: Maps a tool name to its upstream server and auth material.
// Purpose: Let the request-path handler ask "where does this tool live"
//          without owning the registry itself.
// Dependencies: gateway-proxy
// ============================================================================

//! ## Overview
//! The registry that actually stores tool-to-server mappings is an
//! external collaborator (database, config file, service discovery); this
//! trait is the seam. [`StaticToolResolver`] is the in-memory reference
//! implementation used by tests and single-node deployments.

use std::collections::HashMap;

use gateway_proxy::AuthType;

/// Everything the proxy client needs to reach a tool's upstream server.
#[derive(Debug, Clone)]
pub struct ResolvedTool {
    /// Opaque label identifying the upstream server for breaker bookkeeping.
    pub server_label: String,
    /// Absolute URL of the upstream MCP server.
    pub server_endpoint: String,
    /// Authentication scheme to inject on the outbound call.
    pub auth_type: AuthType,
    /// Plaintext credential (already decrypted), if any.
    pub auth_credential: Option<String>,
}

/// Resolves a tool name to its upstream server.
pub trait ToolResolver: Send + Sync {
    /// Returns the upstream registration for `tool_name`, or `None` when
    /// the tool is not registered anywhere.
    fn resolve(&self, tool_name: &str) -> Option<ResolvedTool>;
}

/// In-memory [`ToolResolver`] backed by a fixed `tool_name -> ResolvedTool` table.
#[derive(Debug, Clone, Default)]
pub struct StaticToolResolver {
    tools: HashMap<String, ResolvedTool>,
}

impl StaticToolResolver {
    /// Builds a resolver from a fixed tool table.
    #[must_use]
    pub fn new(tools: HashMap<String, ResolvedTool>) -> Self {
        Self { tools }
    }
}

impl ToolResolver for StaticToolResolver {
    fn resolve(&self, tool_name: &str) -> Option<ResolvedTool> {
        self.tools.get(tool_name).cloned()
    }
}
