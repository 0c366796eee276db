//! Logger, telemetry, and circuit breaker construction. These are the
//! singletons every adapter call shares: one sink, one breaker, built once
//! in the composition root and cloned by `Arc` into every call site.

use resumariner_adapters::log_sink::StderrLogSink;
use resumariner_adapters::logger::JsonLogger;
use resumariner_adapters::telemetry::JsonTelemetry;
use resumariner_config::CircuitBreakerTuning;
use resumariner_ports::{LoggerPort, TelemetryPort};
use resumariner_shared::{CircuitBreaker, CircuitBreakerConfig};
use std::sync::Arc;
use std::time::Duration;

/// Build the structured JSON logger, writing to stderr.
#[must_use]
pub fn build_logger() -> Arc<dyn LoggerPort> {
    Arc::new(JsonLogger::new(Arc::new(StderrLogSink)))
}

/// Build the structured JSON telemetry sink, writing to stderr.
#[must_use]
pub fn build_telemetry() -> Arc<dyn TelemetryPort> {
    Arc::new(JsonTelemetry::new(Arc::new(StderrLogSink)))
}

/// Build the circuit breaker shared by every outbound adapter call.
#[must_use]
pub fn build_circuit_breaker(tuning: &CircuitBreakerTuning) -> Arc<CircuitBreaker> {
    Arc::new(CircuitBreaker::new(CircuitBreakerConfig {
        failure_threshold: tuning.fail_max,
        recovery_timeout: Duration::from_millis(tuning.reset_timeout_ms),
    }))
}
