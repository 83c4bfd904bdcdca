//! # Circuit Breaker Module
//!
//! This module implements the circuit breaker pattern for translation calls.
//! When the translation service fails repeatedly, the breaker opens and the
//! adapter falls back to untranslated text immediately instead of waiting on
//! a service that is known to be down.

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::config::TranslatorConfig;

#[derive(Debug, Default)]
struct BreakerState {
    failure_count: u32,
    last_failure_time: Option<Instant>,
}

/// Circuit breaker guarding an external service
///
/// # State Machine
///
/// - **Closed**: Normal operation, requests pass through
/// - **Open**: Failure threshold exceeded, requests fail fast
/// - **Half-Open**: Reset window elapsed, the next request is let through as a probe
///
/// # Configuration
///
/// Uses `TranslatorConfig` for:
/// - `circuit_breaker_threshold`: Consecutive failures before opening (default: 5)
/// - `circuit_breaker_reset_secs`: Time before a probe is allowed (default: 60s)
#[derive(Debug)]
pub struct CircuitBreaker {
    state: Mutex<BreakerState>,
    threshold: u32,
    reset_after: Duration,
}

impl CircuitBreaker {
    /// Create a new circuit breaker with the given configuration
    ///
    /// # Examples
    ///
    /// ```rust
    /// use recipe_basket::config::TranslatorConfig;
    /// use recipe_basket::circuit_breaker::CircuitBreaker;
    ///
    /// let breaker = CircuitBreaker::new(&TranslatorConfig::default());
    /// assert!(!breaker.is_open());
    /// ```
    pub fn new(config: &TranslatorConfig) -> Self {
        Self::with_settings(
            config.circuit_breaker_threshold,
            Duration::from_secs(config.circuit_breaker_reset_secs),
        )
    }

    /// Create a circuit breaker with an explicit threshold and reset window
    pub fn with_settings(threshold: u32, reset_after: Duration) -> Self {
        Self {
            state: Mutex::new(BreakerState::default()),
            threshold: threshold.max(1),
            reset_after,
        }
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        // The state is two plain counters, a poisoned lock still holds usable data
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Check if circuit breaker is open (blocking requests)
    ///
    /// Returns `true` when the failure count reached the threshold and the reset
    /// window has not elapsed yet. Once the window elapses the breaker goes back
    /// to closed and the failure count is cleared.
    pub fn is_open(&self) -> bool {
        let mut state = self.lock();

        if state.failure_count >= self.threshold {
            if let Some(last_time) = state.last_failure_time {
                if last_time.elapsed() < self.reset_after {
                    return true;
                }
                state.failure_count = 0;
                state.last_failure_time = None;
            }
        }
        false
    }

    /// Record a failure to increment the failure counter
    pub fn record_failure(&self) {
        let mut state = self.lock();
        state.failure_count = state.failure_count.saturating_add(1);
        state.last_failure_time = Some(Instant::now());
    }

    /// Record a success to reset the failure counter
    pub fn record_success(&self) {
        let mut state = self.lock();
        state.failure_count = 0;
        state.last_failure_time = None;
    }

    pub fn failure_count(&self) -> u32 {
        self.lock().failure_count
    }
}
