//! Process-wide throttle for outbound provider calls.
//!
//! Enforces a minimum spacing between dispatches and backs off
//! exponentially when the provider signals throttling. Cooperative and
//! in-process only; it does not coordinate across processes.

use std::time::Duration;

use log::{debug, warn};
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Rate limiter tuning.
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Baseline minimum spacing between dispatches.
    /// 20ms targets a conservative 50 requests/second.
    pub base_spacing: Duration,
    /// Cap on the backed-off spacing.
    pub max_spacing: Duration,
    /// How long without a throttling signal before the spacing decays
    /// one step back toward the baseline.
    pub quiet_period: Duration,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            base_spacing: Duration::from_millis(20),
            max_spacing: Duration::from_secs(5),
            quiet_period: Duration::from_secs(60),
        }
    }
}

#[derive(Debug)]
struct State {
    /// Earliest instant the next dispatch may occur.
    next_permitted: Option<Instant>,
    /// Current minimum spacing between dispatches.
    spacing: Duration,
    /// When the provider last signalled throttling (or the last decay step).
    last_throttle: Option<Instant>,
}

/// Process-wide rate limiter.
///
/// Explicitly constructed and injected (behind an `Arc`) rather than a
/// hidden module-level global, so tests can build isolated instances.
/// Safe under concurrent `acquire` calls from many request tasks.
pub struct RateLimiter {
    config: RateLimiterConfig,
    state: Mutex<State>,
}

impl RateLimiter {
    /// Create a rate limiter with the given configuration.
    pub fn new(config: RateLimiterConfig) -> Self {
        let spacing = config.base_spacing;
        Self {
            config,
            state: Mutex::new(State {
                next_permitted: None,
                spacing,
                last_throttle: None,
            }),
        }
    }

    /// Suspend the caller until a dispatch is permitted.
    ///
    /// Reserves the next dispatch slot under the lock, then sleeps
    /// outside it, so concurrent callers queue up at spaced-out slots
    /// and no two dispatches occur closer together than the current
    /// spacing.
    pub async fn acquire(&self) {
        let dispatch_at = {
            let mut state = self.state.lock().await;
            let now = Instant::now();

            self.maybe_decay(&mut state, now);

            let at = match state.next_permitted {
                Some(t) if t > now => t,
                _ => now,
            };
            state.next_permitted = Some(at + state.spacing);
            at
        };

        tokio::time::sleep_until(dispatch_at).await;
    }

    /// Record a provider throttling signal.
    ///
    /// Doubles the current spacing up to the configured cap. Called by
    /// the resource client when the provider answers with a rate-limit
    /// response.
    pub async fn report_throttled(&self) {
        let mut state = self.state.lock().await;
        let doubled = state.spacing.saturating_mul(2);
        state.spacing = doubled.min(self.config.max_spacing);
        state.last_throttle = Some(Instant::now());
        warn!(
            "Provider throttling reported, spacing raised to {:?}",
            state.spacing
        );
    }

    /// Current minimum spacing between dispatches.
    pub async fn current_spacing(&self) -> Duration {
        self.state.lock().await.spacing
    }

    /// Halve the spacing toward the baseline once per quiet period
    /// without throttling signals.
    fn maybe_decay(&self, state: &mut State, now: Instant) {
        if state.spacing <= self.config.base_spacing {
            return;
        }
        let quiet_since = match state.last_throttle {
            Some(t) => now.duration_since(t),
            None => return,
        };
        if quiet_since >= self.config.quiet_period {
            state.spacing = (state.spacing / 2).max(self.config.base_spacing);
            // Restart the quiet window so decay is stepwise
            state.last_throttle = Some(now);
            debug!("Rate limiter decayed spacing to {:?}", state.spacing);
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimiterConfig::default())
    }
}
