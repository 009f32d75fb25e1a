// crates/gateway-transport/src/telemetry.rs
// ============================================================================
// Module: Gateway Telemetry
// Description: Observability hooks and correlation IDs for the request path.
// Purpose: Provide metric events and per-request correlation IDs without
//          forcing a specific metrics backend.
// Dependencies: rand
// ============================================================================

//! ## Overview
//! A thin, dependency-light metrics interface so a deployment can plug in
//! Prometheus or OpenTelemetry later without redesigning the request path,
//! plus the boot-scoped correlation ID generator every dispatched request
//! is tagged with. Living here (rather than in the CLI binary) lets the
//! transport emit both per request, regardless of which binary embeds it.
//! Security posture: labels are derived from the request but must never
//! include resolved private IPs or credentials.

use std::fmt;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;

use rand::RngCore;
use rand::rngs::OsRng;

/// Header a correlation ID is attached to on every response.
pub const SERVER_CORRELATION_HEADER: &str = "x-server-correlation-id";

/// Gateway request outcome classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayOutcome {
    /// The call was forwarded and completed.
    Ok,
    /// The call was denied by trust classification.
    TrustDenied,
    /// The call was denied because the upstream breaker was open.
    BreakerOpen,
    /// Any other failure (parse, transport, internal).
    Error,
}

impl GatewayOutcome {
    /// Returns a stable label for the outcome.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::TrustDenied => "trust_denied",
            Self::BreakerOpen => "breaker_open",
            Self::Error => "error",
        }
    }
}

/// A single request's metric event.
#[derive(Debug, Clone)]
pub struct GatewayMetricEvent {
    /// JSON-RPC method name.
    pub method: String,
    /// Upstream server label, when the call reached the proxy stage.
    pub server_label: Option<String>,
    /// Request outcome.
    pub outcome: GatewayOutcome,
}

/// Metrics sink for gateway requests and latencies.
pub trait GatewayMetrics: Send + Sync {
    /// Records a request counter event.
    fn record_request(&self, event: &GatewayMetricEvent);
    /// Records a latency observation for the request.
    fn record_latency(&self, event: &GatewayMetricEvent, latency: Duration);
}

/// No-op metrics sink.
pub struct NoopMetrics;

impl GatewayMetrics for NoopMetrics {
    fn record_request(&self, _event: &GatewayMetricEvent) {}

    fn record_latency(&self, _event: &GatewayMetricEvent, _latency: Duration) {}
}

/// Metrics sink that writes a one-line summary per event to stderr.
pub struct StderrMetrics;

impl GatewayMetrics for StderrMetrics {
    fn record_request(&self, event: &GatewayMetricEvent) {
        eprintln!(
            "method={} server={} outcome={}",
            event.method,
            event.server_label.as_deref().unwrap_or("-"),
            event.outcome.as_str()
        );
    }

    fn record_latency(&self, event: &GatewayMetricEvent, latency: Duration) {
        eprintln!(
            "method={} server={} outcome={} latency_ms={}",
            event.method,
            event.server_label.as_deref().unwrap_or("-"),
            event.outcome.as_str(),
            latency.as_millis()
        );
    }
}

/// Boot-scoped correlation ID generator: a random seed plus a monotonic
/// counter, formatted `gw-<boot_id>-<counter>`.
///
/// # Invariants
/// - Issued identifiers are unique within the process lifetime.
pub struct CorrelationIdGenerator {
    boot_id: u64,
    counter: AtomicU64,
}

impl fmt::Debug for CorrelationIdGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CorrelationIdGenerator").field("boot_id", &self.boot_id).finish_non_exhaustive()
    }
}

impl CorrelationIdGenerator {
    /// Creates a new generator seeded from the OS RNG.
    #[must_use]
    pub fn new() -> Self {
        let mut bytes = [0u8; 8];
        OsRng.fill_bytes(&mut bytes);
        Self {
            boot_id: u64::from_be_bytes(bytes),
            counter: AtomicU64::new(1),
        }
    }

    /// Issues a new correlation ID of the form `gw-<hex>-<hex>`.
    #[must_use]
    pub fn issue(&self) -> String {
        let seq = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("gw-{:016x}-{:016x}", self.boot_id, seq)
    }
}

impl Default for CorrelationIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_ids_carry_the_gw_prefix_and_are_unique() {
        let generator = CorrelationIdGenerator::new();
        let first = generator.issue();
        let second = generator.issue();
        assert!(first.starts_with("gw-"));
        assert_ne!(first, second);
    }

    #[test]
    fn issued_ids_share_a_boot_id_but_not_a_counter() {
        let generator = CorrelationIdGenerator::new();
        let first = generator.issue();
        let second = generator.issue();
        let boot_of = |id: &str| id.split('-').nth(1).unwrap().to_string();
        assert_eq!(boot_of(&first), boot_of(&second));
    }
}
