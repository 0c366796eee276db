//! Circuit breaker for guarding calls to unreliable external dependencies
//! (LLM providers, embedding providers, graph/vector stores).

use crate::errors::{ErrorClass, ErrorCode, ErrorEnvelope};
use std::future::Future;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Circuit breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    /// Calls pass through normally.
    Closed,
    /// Calls are rejected without attempting the underlying operation.
    Open,
    /// A single probe call is allowed to test recovery.
    HalfOpen,
}

/// Tuning for a [`CircuitBreaker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before the circuit opens.
    pub failure_threshold: u32,
    /// How long the circuit stays open before allowing a probe call.
    pub recovery_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            recovery_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug)]
struct CircuitBreakerState {
    state: CircuitState,
    failure_count: u32,
    last_failure_at: Option<Instant>,
}

/// Guards calls to a single unreliable dependency. Opens after
/// `failure_threshold` consecutive failures and rejects calls until
/// `recovery_timeout` elapses, at which point one probe call is allowed
/// through in the half-open state.
#[derive(Debug)]
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    state: Mutex<CircuitBreakerState>,
}

impl CircuitBreaker {
    /// Build a breaker in the closed state.
    #[must_use]
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            state: Mutex::new(CircuitBreakerState {
                state: CircuitState::Closed,
                failure_count: 0,
                last_failure_at: None,
            }),
        }
    }

    /// Current state, primarily for diagnostics and tests.
    #[must_use]
    pub fn state(&self) -> CircuitState {
        self.state.lock().map_or(CircuitState::Closed, |guard| guard.state)
    }

    fn should_attempt_reset(&self, guard: &CircuitBreakerState) -> bool {
        match guard.last_failure_at {
            Some(last_failure) => last_failure.elapsed() >= self.config.recovery_timeout,
            None => true,
        }
    }

    /// Check whether a call is currently allowed, transitioning
    /// open -> half-open when the recovery timeout has elapsed.
    fn admit(&self) -> Result<(), ErrorEnvelope> {
        let mut guard = self.state.lock().map_err(|_| poisoned_lock_error())?;
        match guard.state {
            CircuitState::Closed | CircuitState::HalfOpen => Ok(()),
            CircuitState::Open => {
                if self.should_attempt_reset(&guard) {
                    guard.state = CircuitState::HalfOpen;
                    Ok(())
                } else {
                    Err(circuit_open_error())
                }
            },
        }
    }

    fn record_success(&self) {
        if let Ok(mut guard) = self.state.lock() {
            guard.failure_count = 0;
            guard.last_failure_at = None;
            guard.state = CircuitState::Closed;
        }
    }

    fn record_failure(&self) {
        if let Ok(mut guard) = self.state.lock() {
            guard.failure_count = guard.failure_count.saturating_add(1);
            guard.last_failure_at = Some(Instant::now());
            if guard.failure_count >= self.config.failure_threshold {
                guard.state = CircuitState::Open;
            }
        }
    }

    /// Run `operation` under circuit-breaker protection. Rejects
    /// immediately with an `ErrorEnvelope` when the circuit is open;
    /// otherwise runs the operation and updates state from its outcome.
    pub async fn call<T, E, F, Fut>(&self, operation: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<ErrorEnvelope>,
    {
        self.admit().map_err(E::from)?;

        match operation().await {
            Ok(value) => {
                self.record_success();
                Ok(value)
            },
            Err(error) => {
                self.record_failure();
                Err(error)
            },
        }
    }
}

fn circuit_open_error() -> ErrorEnvelope {
    ErrorEnvelope::expected_with_class(
        ErrorCode::new("circuit_breaker", "open"),
        "circuit breaker is open",
        ErrorClass::Retriable,
    )
}

fn poisoned_lock_error() -> ErrorEnvelope {
    ErrorEnvelope::unexpected(
        ErrorCode::new("circuit_breaker", "poisoned_lock"),
        "circuit breaker state lock was poisoned",
        ErrorClass::NonRetriable,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn opens_after_threshold_failures() {
        let breaker = CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: 2,
            recovery_timeout: Duration::from_secs(60),
        });

        for _ in 0..2 {
            let result: Result<(), ErrorEnvelope> = breaker
                .call(|| async { Err(ErrorEnvelope::expected(ErrorCode::internal(), "boom")) })
                .await;
            assert!(result.is_err());
        }

        assert_eq!(breaker.state(), CircuitState::Open);

        let rejected: Result<(), ErrorEnvelope> = breaker.call(|| async { Ok(()) }).await;
        assert!(rejected.is_err());
    }

    #[tokio::test]
    async fn half_open_probe_closes_circuit_on_success() {
        let breaker = CircuitBreaker::new(CircuitBreakerConfig {
            failure_threshold: 1,
            recovery_timeout: Duration::from_millis(10),
        });

        let _: Result<(), ErrorEnvelope> = breaker
            .call(|| async { Err(ErrorEnvelope::expected(ErrorCode::internal(), "boom")) })
            .await;
        assert_eq!(breaker.state(), CircuitState::Open);

        tokio::time::sleep(Duration::from_millis(20)).await;

        let probe: Result<(), ErrorEnvelope> = breaker.call(|| async { Ok(()) }).await;
        assert!(probe.is_ok());
        assert_eq!(breaker.state(), CircuitState::Closed);
    }
}
