// crates/gateway-breaker/src/lib.rs
// ============================================================================
// Module: Circuit Breaker
// Description: Per-upstream three-state availability gate.
// Purpose: Protect upstream MCP servers from continued probing while they
//          are failing, and resume probing once the open window elapses.
// Dependencies: std
// ============================================================================

//! ## Overview
//! [`CircuitBreaker`] tracks one [`BreakerState`] per `server_label`. A label
//! that has never been seen is implicitly [`BreakerState::Closed`].
//! Invariants:
//! - `Allow` while `Open` returns `true` exactly once per open-window expiry
//!   (the single in-flight `HalfOpen` probe).
//! - All operations are safe for concurrent callers; the critical section
//!   held under the map mutex never blocks on I/O.
//!
//! Config (`fail_threshold`, `open_duration`) is supplied per call rather
//! than fixed at construction, matching the source: different callers may
//! gate different upstream classes with different thresholds using the
//! same breaker instance.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Circuit breaker state for a single upstream label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    /// Upstream is considered healthy; calls are allowed.
    Closed,
    /// Upstream has tripped; calls are denied until the open window elapses.
    Open,
    /// Open window elapsed; a single probe call is in flight.
    HalfOpen,
}

/// Per-call breaker configuration.
///
/// # Invariants
/// - `fail_threshold` is always `>= 1`.
#[derive(Debug, Clone, Copy)]
pub struct BreakerConfig {
    /// Consecutive failures required to trip from `Closed` to `Open`.
    pub fail_threshold: u32,
    /// How long the breaker stays `Open` before allowing a probe.
    pub open_duration: Duration,
}

impl BreakerConfig {
    /// Builds a breaker config, clamping `fail_threshold` to at least 1.
    #[must_use]
    pub fn new(fail_threshold: u32, open_duration: Duration) -> Self {
        Self {
            fail_threshold: fail_threshold.max(1),
            open_duration,
        }
    }
}

/// Internal per-label state tracked by the breaker.
struct LabelState {
    state: BreakerState,
    consecutive_failures: u32,
    opened_at: Instant,
}

impl LabelState {
    fn closed() -> Self {
        Self {
            state: BreakerState::Closed,
            consecutive_failures: 0,
            opened_at: Instant::now(),
        }
    }
}

// ============================================================================
// SECTION: Circuit Breaker
// ============================================================================

/// Per-label circuit breaker.
///
/// # Invariants
/// - An unknown label behaves as `Closed` without allocating an entry.
/// - The map mutex's critical sections are compare/increment/timestamp
///   reads only; no `.await` or blocking I/O occurs while held.
#[derive(Default)]
pub struct CircuitBreaker {
    labels: Mutex<HashMap<String, LabelState>>,
}

impl CircuitBreaker {
    /// Builds an empty breaker with no tracked labels.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether a call to `label` should be allowed right now.
    ///
    /// In the `Open` state, once `open_duration` has elapsed this
    /// transitions the label to `HalfOpen` and returns `true` for exactly
    /// one caller; all other concurrent or subsequent callers see `false`
    /// until the probe resolves via `record_success`/`record_failure`.
    #[must_use]
    pub fn allow(&self, label: &str, config: &BreakerConfig) -> bool {
        let Ok(mut labels) = self.labels.lock() else {
            return false;
        };
        let entry = labels.entry(label.to_string()).or_insert_with(LabelState::closed);
        match entry.state {
            BreakerState::Closed => true,
            BreakerState::HalfOpen => false,
            BreakerState::Open => {
                if entry.opened_at.elapsed() >= config.open_duration {
                    entry.state = BreakerState::HalfOpen;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Records a successful call against `label`.
    ///
    /// From `Closed`, resets the failure counter. From `HalfOpen`,
    /// transitions to `Closed` and resets the failure counter. A no-op on
    /// an unknown label.
    pub fn record_success(&self, label: &str) {
        let Ok(mut labels) = self.labels.lock() else {
            return;
        };
        if let Some(entry) = labels.get_mut(label) {
            entry.consecutive_failures = 0;
            if matches!(entry.state, BreakerState::HalfOpen) {
                entry.state = BreakerState::Closed;
            }
        }
    }

    /// Records a failed call against `label`.
    ///
    /// From `Closed`, increments the failure counter and trips to `Open`
    /// once `config.fail_threshold` consecutive failures are reached. From
    /// `HalfOpen`, re-opens immediately with a fresh `opened_at` stamp.
    pub fn record_failure(&self, label: &str, config: &BreakerConfig) {
        let Ok(mut labels) = self.labels.lock() else {
            return;
        };
        let entry = labels.entry(label.to_string()).or_insert_with(LabelState::closed);
        match entry.state {
            BreakerState::Closed => {
                entry.consecutive_failures = entry.consecutive_failures.saturating_add(1);
                if entry.consecutive_failures >= config.fail_threshold {
                    entry.state = BreakerState::Open;
                    entry.opened_at = Instant::now();
                }
            }
            BreakerState::HalfOpen => {
                entry.state = BreakerState::Open;
                entry.opened_at = Instant::now();
                entry.consecutive_failures = config.fail_threshold;
            }
            BreakerState::Open => {}
        }
    }

    /// Returns the current state for `label`; unknown labels are `Closed`.
    #[must_use]
    pub fn state(&self, label: &str) -> BreakerState {
        let Ok(labels) = self.labels.lock() else {
            return BreakerState::Closed;
        };
        labels.get(label).map_or(BreakerState::Closed, |entry| entry.state)
    }

    /// Removes all tracked per-label state.
    pub fn reset(&self) {
        if let Ok(mut labels) = self.labels.lock() {
            labels.clear();
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
