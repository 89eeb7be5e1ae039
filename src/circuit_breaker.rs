//! # Circuit Breaker Module
//!
//! Stops calling the OCR service for a while after it fails repeatedly, so a
//! broken upstream costs one fast error per photo instead of a full retry
//! cycle.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::ocr_config::RecoveryConfig;

#[derive(Debug, Default)]
struct BreakerState {
    failure_count: u32,
    last_failure: Option<Instant>,
}

/// Circuit breaker for OCR operations
///
/// # State Machine
///
/// - **Closed**: Normal operation, requests pass through
/// - **Open**: `circuit_breaker_threshold` consecutive failures, requests fail fast
/// - After `circuit_breaker_reset_secs` the breaker closes again with a fresh count
#[derive(Debug)]
pub struct CircuitBreaker {
    state: Mutex<BreakerState>,
    config: RecoveryConfig,
}

impl CircuitBreaker {
    /// Create a new circuit breaker with the given configuration
    ///
    /// ```rust
    /// use quizlens::circuit_breaker::CircuitBreaker;
    /// use quizlens::ocr_config::RecoveryConfig;
    ///
    /// let breaker = CircuitBreaker::new(RecoveryConfig::default());
    /// assert!(!breaker.is_open());
    /// ```
    pub fn new(config: RecoveryConfig) -> Self {
        Self {
            state: Mutex::new(BreakerState::default()),
            config,
        }
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Check if circuit breaker is open (blocking requests)
    ///
    /// Resets to closed once the reset timeout has elapsed since the last failure.
    pub fn is_open(&self) -> bool {
        let mut state = self.lock();

        if state.failure_count < self.config.circuit_breaker_threshold {
            return false;
        }

        match state.last_failure {
            Some(last)
                if last.elapsed() < Duration::from_secs(self.config.circuit_breaker_reset_secs) =>
            {
                true
            }
            _ => {
                *state = BreakerState::default();
                false
            }
        }
    }

    /// Record a failed operation
    pub fn record_failure(&self) {
        let mut state = self.lock();
        state.failure_count += 1;
        state.last_failure = Some(Instant::now());
    }

    /// Record a successful operation, closing the breaker
    pub fn record_success(&self) {
        *self.lock() = BreakerState::default();
    }

    /// Current consecutive failure count
    pub fn failure_count(&self) -> u32 {
        self.lock().failure_count
    }
}
