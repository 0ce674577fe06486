use std::collections::VecDeque;
use std::future::Future;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

#[derive(Debug, Clone)]
pub struct CircuitBreakerConfig {
    /// Number of most recent calls considered when computing the failure rate.
    pub window_size: usize,
    /// Failure rate above which the circuit opens (0.5 = 50%).
    pub failure_rate_threshold: f64,
    /// How long the circuit stays open before a trial call is allowed.
    pub open_wait: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            window_size: 10,
            failure_rate_threshold: 0.5,
            open_wait: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Error)]
#[error("Circuit breaker is open")]
pub struct CircuitOpen;

#[derive(Debug)]
struct BreakerWindow {
    state: CircuitState,
    outcomes: VecDeque<bool>,
    opened_at: Option<Instant>,
}

/// Count-based sliding-window circuit breaker.
///
/// Wraps fallible async operations; once the failure rate over the last
/// `window_size` calls exceeds the threshold the circuit opens and calls are
/// short-circuited with `CircuitOpen` until `open_wait` has elapsed. The next
/// call after the wait runs as a half-open trial: success closes the circuit
/// and resets the window, failure re-opens it.
pub struct CircuitBreaker {
    config: CircuitBreakerConfig,
    window: Mutex<BreakerWindow>,
}

impl CircuitBreaker {
    pub fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            window: Mutex::new(BreakerWindow {
                state: CircuitState::Closed,
                outcomes: VecDeque::new(),
                opened_at: None,
            }),
        }
    }

    pub async fn state(&self) -> CircuitState {
        self.window.lock().await.state
    }

    /// Run `op` under the breaker.
    ///
    /// `Err(CircuitOpen)` means the call was short-circuited and `op` never
    /// ran. The inner result is the operation's own outcome, already recorded
    /// in the sliding window.
    pub async fn call<T, E, F, Fut>(&self, op: F) -> Result<Result<T, E>, CircuitOpen>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.acquire().await?;
        let result = op().await;
        self.record(result.is_ok()).await;
        Ok(result)
    }

    async fn acquire(&self) -> Result<(), CircuitOpen> {
        let mut window = self.window.lock().await;
        match window.state {
            CircuitState::Closed | CircuitState::HalfOpen => Ok(()),
            CircuitState::Open => {
                let wait_elapsed = window
                    .opened_at
                    .map(|at| at.elapsed() >= self.config.open_wait)
                    .unwrap_or(true);
                if wait_elapsed {
                    window.state = CircuitState::HalfOpen;
                    Ok(())
                } else {
                    Err(CircuitOpen)
                }
            }
        }
    }

    async fn record(&self, success: bool) {
        let mut window = self.window.lock().await;
        match window.state {
            CircuitState::HalfOpen => {
                if success {
                    window.state = CircuitState::Closed;
                    window.outcomes.clear();
                    window.opened_at = None;
                } else {
                    window.state = CircuitState::Open;
                    window.opened_at = Some(Instant::now());
                }
            }
            _ => {
                window.outcomes.push_back(success);
                while window.outcomes.len() > self.config.window_size {
                    window.outcomes.pop_front();
                }
                if window.outcomes.len() == self.config.window_size {
                    let failures = window.outcomes.iter().filter(|ok| !**ok).count();
                    let rate = failures as f64 / self.config.window_size as f64;
                    if rate > self.config.failure_rate_threshold {
                        window.state = CircuitState::Open;
                        window.opened_at = Some(Instant::now());
                    }
                }
            }
        }
    }
}
