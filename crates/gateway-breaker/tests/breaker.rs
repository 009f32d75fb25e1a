// crates/gateway-breaker/tests/breaker.rs
// ============================================================================
// Module: Circuit Breaker Integration Tests
// Description: End-to-end Closed/Open/HalfOpen transitions via the public API.
// Purpose: Exercise CircuitBreaker the way a caller outside the crate would.
// Dependencies: gateway-breaker
// ============================================================================

use std::thread;
use std::time::Duration;

use gateway_breaker::BreakerConfig;
use gateway_breaker::BreakerState;
use gateway_breaker::CircuitBreaker;

#[test]
fn an_unknown_label_is_closed_and_allowed() {
    let breaker = CircuitBreaker::new();
    let config = BreakerConfig::new(3, Duration::from_millis(50));
    assert!(breaker.allow("fs-server", &config));
    assert_eq!(breaker.state("fs-server"), BreakerState::Closed);
}

#[test]
fn consecutive_failures_trip_the_breaker_at_the_threshold() {
    let breaker = CircuitBreaker::new();
    let config = BreakerConfig::new(3, Duration::from_secs(60));
    breaker.record_failure("fs-server", &config);
    breaker.record_failure("fs-server", &config);
    assert_eq!(breaker.state("fs-server"), BreakerState::Closed);
    breaker.record_failure("fs-server", &config);
    assert_eq!(breaker.state("fs-server"), BreakerState::Open);
    assert!(!breaker.allow("fs-server", &config));
}

#[test]
fn a_success_before_the_threshold_resets_the_failure_count() {
    let breaker = CircuitBreaker::new();
    let config = BreakerConfig::new(3, Duration::from_secs(60));
    breaker.record_failure("fs-server", &config);
    breaker.record_failure("fs-server", &config);
    breaker.record_success("fs-server");
    breaker.record_failure("fs-server", &config);
    breaker.record_failure("fs-server", &config);
    assert_eq!(breaker.state("fs-server"), BreakerState::Closed);
}

#[test]
fn open_breaker_transitions_to_half_open_after_the_window_and_reopens_on_failure() {
    let breaker = CircuitBreaker::new();
    let config = BreakerConfig::new(1, Duration::from_millis(20));
    breaker.record_failure("fs-server", &config);
    assert_eq!(breaker.state("fs-server"), BreakerState::Open);
    assert!(!breaker.allow("fs-server", &config));

    thread::sleep(Duration::from_millis(30));
    assert!(breaker.allow("fs-server", &config), "the single half-open probe must be allowed");
    assert_eq!(breaker.state("fs-server"), BreakerState::HalfOpen);
    assert!(!breaker.allow("fs-server", &config), "a second concurrent probe must be denied");

    breaker.record_failure("fs-server", &config);
    assert_eq!(breaker.state("fs-server"), BreakerState::Open);
}

#[test]
fn a_successful_probe_closes_the_breaker() {
    let breaker = CircuitBreaker::new();
    let config = BreakerConfig::new(1, Duration::from_millis(20));
    breaker.record_failure("fs-server", &config);
    thread::sleep(Duration::from_millis(30));
    assert!(breaker.allow("fs-server", &config));
    breaker.record_success("fs-server");
    assert_eq!(breaker.state("fs-server"), BreakerState::Closed);
    assert!(breaker.allow("fs-server", &config));
}

#[test]
fn reset_clears_every_tracked_label() {
    let breaker = CircuitBreaker::new();
    let config = BreakerConfig::new(1, Duration::from_secs(60));
    breaker.record_failure("fs-server", &config);
    assert_eq!(breaker.state("fs-server"), BreakerState::Open);
    breaker.reset();
    assert_eq!(breaker.state("fs-server"), BreakerState::Closed);
}

#[test]
fn breaker_config_clamps_a_zero_fail_threshold_to_one() {
    let config = BreakerConfig::new(0, Duration::from_secs(1));
    assert_eq!(config.fail_threshold, 1);
}
