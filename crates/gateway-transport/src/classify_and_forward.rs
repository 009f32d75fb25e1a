// crates/gateway-transport/src/classify_and_forward.rs
// ============================================================================
// Module: Classify-And-Forward Handler
// Description: Production MethodHandler gluing trust, breaker, and proxy.
// Purpose: Implement `tools/call` end to end; everything else is
//          delegated to an inner handler (or method-not-found).
// Dependencies: gateway-trust, gateway-breaker, gateway-proxy
// ============================================================================

//! ## Overview
//! `tools/call` is the only method this handler understands directly.
//! It resolves the tool's upstream via a [`ToolResolver`], classifies
//! trust, consults the breaker before dialing, and records the outcome
//! against the breaker afterward. A `block` classification and a
//! breaker-open state both surface as ordinary `MethodError`s — never as
//! HTTP 5xx — per the gateway's error design.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use gateway_breaker::BreakerConfig;
use gateway_breaker::CircuitBreaker;
use gateway_protocol::TrustTier;
use gateway_protocol::error_codes;
use gateway_proxy::ProxyConfig;
use gateway_proxy::ProxyRequest;
use gateway_trust::AgentTrustProvider;
use gateway_trust::SystemTrustDefaultProvider;
use gateway_trust::WorkspaceTrustProvider;
use serde::Deserialize;
use serde_json::Value;

use crate::MethodError;
use crate::MethodHandler;
use crate::ToolResolver;
use crate::telemetry::GatewayMetricEvent;
use crate::telemetry::GatewayMetrics;
use crate::telemetry::GatewayOutcome;
use crate::telemetry::NoopMetrics;

/// JSON-RPC error code used for a trust-denied call. Outside the
/// transport's reserved range since this is a domain-level rejection.
pub const TRUST_DENIED_CODE: i64 = -32001;
/// JSON-RPC error code used when the upstream's breaker is open.
pub const BREAKER_OPEN_CODE: i64 = -32002;
/// JSON-RPC error code used when the tool has no registered upstream.
pub const TOOL_NOT_REGISTERED_CODE: i64 = -32003;

#[derive(Debug, Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

/// Production `tools/call` handler: trust classification, breaker gate,
/// and SSRF-hardened forwarding, wired together.
pub struct ClassifyAndForwardHandler {
    resolver: Box<dyn ToolResolver>,
    agent_overrides: Box<dyn AgentTrustProvider>,
    workspace_rules: Box<dyn WorkspaceTrustProvider>,
    system_defaults: Box<dyn SystemTrustDefaultProvider>,
    breaker: CircuitBreaker,
    breaker_config: BreakerConfig,
    proxy_config: ProxyConfig,
    inner: Option<Box<dyn MethodHandler>>,
    metrics: Arc<dyn GatewayMetrics>,
}

impl ClassifyAndForwardHandler {
    /// Builds a handler with no fallback for non-`tools/call` methods
    /// (those become method-not-found).
    #[must_use]
    pub fn new(
        resolver: Box<dyn ToolResolver>,
        agent_overrides: Box<dyn AgentTrustProvider>,
        workspace_rules: Box<dyn WorkspaceTrustProvider>,
        system_defaults: Box<dyn SystemTrustDefaultProvider>,
        breaker_config: BreakerConfig,
        proxy_config: ProxyConfig,
    ) -> Self {
        Self {
            resolver,
            agent_overrides,
            workspace_rules,
            system_defaults,
            breaker: CircuitBreaker::new(),
            breaker_config,
            proxy_config,
            inner: None,
            metrics: Arc::new(NoopMetrics),
        }
    }

    /// Delegates every method other than `tools/call` to `inner`.
    #[must_use]
    pub fn with_fallback(mut self, inner: Box<dyn MethodHandler>) -> Self {
        self.inner = Some(inner);
        self
    }

    /// Records a request/latency event per `tools/call` to `metrics`.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn GatewayMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    async fn handle_tools_call(
        &self,
        params: Option<&Value>,
        workspace_id: Option<&str>,
        agent_id: Option<&str>,
    ) -> Result<Value, MethodError> {
        let started_at = Instant::now();
        let result = self.handle_tools_call_inner(params, workspace_id, agent_id).await;

        let (server_label, outcome) = match &result {
            Ok(_) => (None, GatewayOutcome::Ok),
            Err(err) if err.code == TRUST_DENIED_CODE => (None, GatewayOutcome::TrustDenied),
            Err(err) if err.code == BREAKER_OPEN_CODE => (None, GatewayOutcome::BreakerOpen),
            Err(_) => (None, GatewayOutcome::Error),
        };
        let event = GatewayMetricEvent {
            method: "tools/call".to_string(),
            server_label,
            outcome,
        };
        self.metrics.record_request(&event);
        self.metrics.record_latency(&event, started_at.elapsed());

        result
    }

    async fn handle_tools_call_inner(
        &self,
        params: Option<&Value>,
        workspace_id: Option<&str>,
        agent_id: Option<&str>,
    ) -> Result<Value, MethodError> {
        let params: ToolCallParams = params
            .cloned()
            .ok_or_else(|| MethodError::new(error_codes::INVALID_PARAMS, "missing params"))
            .and_then(|value| {
                serde_json::from_value(value)
                    .map_err(|err| MethodError::new(error_codes::INVALID_PARAMS, err.to_string()))
            })?;

        let tier = gateway_trust::classify(
            &params.name,
            workspace_id,
            agent_id,
            self.agent_overrides.as_ref(),
            self.workspace_rules.as_ref(),
            self.system_defaults.as_ref(),
        )
        .await
        .map_err(|err| MethodError::new(TRUST_DENIED_CODE, err.to_string()))?;

        if tier != TrustTier::Auto {
            return Err(MethodError::new(
                TRUST_DENIED_CODE,
                format!("tool call requires {}", tier.as_str()),
            ));
        }

        let tool = self
            .resolver
            .resolve(&params.name)
            .ok_or_else(|| MethodError::new(TOOL_NOT_REGISTERED_CODE, "tool not registered"))?;

        if !self.breaker.allow(&tool.server_label, &self.breaker_config) {
            return Err(MethodError::new(BREAKER_OPEN_CODE, "upstream unavailable"));
        }

        let request = ProxyRequest {
            server_endpoint: tool.server_endpoint,
            tool_name: params.name,
            arguments: params.arguments,
            auth_type: tool.auth_type,
            auth_credential: tool.auth_credential,
        };

        // No caller-supplied cancellation context reaches this handler yet
        // (`MethodHandler::handle_method` has none to thread through), so a
        // token that is never cancelled stands in for "forward to completion".
        let cancel = tokio_util::sync::CancellationToken::new();
        match gateway_proxy::forward(&request, &self.proxy_config, &cancel).await {
            Ok(response) if (200..300).contains(&response.status_code) => {
                self.breaker.record_success(&tool.server_label);
                Ok(serde_json::json!({
                    "status_code": response.status_code,
                    "body": String::from_utf8_lossy(&response.body),
                }))
            }
            Ok(response) => {
                self.breaker.record_failure(&tool.server_label, &self.breaker_config);
                Err(MethodError::new(
                    error_codes::INTERNAL_ERROR,
                    format!("upstream returned status {}", response.status_code),
                ))
            }
            Err(err) => {
                self.breaker.record_failure(&tool.server_label, &self.breaker_config);
                Err(MethodError::new(error_codes::INTERNAL_ERROR, err.to_string()))
            }
        }
    }
}

#[async_trait]
impl MethodHandler for ClassifyAndForwardHandler {
    async fn handle_method(&self, method: &str, params: Option<&Value>) -> Result<Value, MethodError> {
        match method {
            "tools/call" => self.handle_tools_call(params, None, None).await,
            other => match &self.inner {
                Some(inner) => inner.handle_method(other, params).await,
                None => Err(MethodError::method_not_found(other)),
            },
        }
    }
}
