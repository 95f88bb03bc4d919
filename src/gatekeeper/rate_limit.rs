//! Fixed-window rate limiting.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::config::RateLimitConfig;

/// One client's window: requests counted and when the window resets.
struct RateWindow {
    count: u32,
    reset_at: Instant,
}

/// Fixed-window rate limiter keyed by client identifier.
///
/// Windows are discrete, not sliding: a burst straddling a window edge
/// can see up to twice the budget in a short span. Entries reset lazily
/// on next access and are never pruned, so idle identifiers keep their
/// map slot for the process lifetime.
pub struct RateLimiter {
    windows: Mutex<HashMap<String, RateWindow>>,
    max_requests: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self::with_policy(config.max_requests, Duration::from_secs(config.window_secs))
    }

    /// Build with an explicit budget and window duration.
    pub fn with_policy(max_requests: u32, window: Duration) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            max_requests,
            window,
        }
    }

    /// Count one request against `identifier` and report whether it
    /// exceeded the window budget.
    ///
    /// On first observation, or once the window has lapsed, the count
    /// restarts at 1 and the request is allowed.
    pub fn is_rate_limited(&self, identifier: &str) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.lock().expect("rate limiter mutex poisoned");

        match windows.get_mut(identifier) {
            Some(window) if now <= window.reset_at => {
                window.count += 1;
                window.count > self.max_requests
            }
            _ => {
                windows.insert(
                    identifier.to_string(),
                    RateWindow {
                        count: 1,
                        reset_at: now + self.window,
                    },
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_up_to_budget_then_rejects() {
        let limiter = RateLimiter::with_policy(3, Duration::from_secs(60));

        for _ in 0..3 {
            assert!(!limiter.is_rate_limited("203.0.113.5"));
        }
        assert!(limiter.is_rate_limited("203.0.113.5"));
        assert!(limiter.is_rate_limited("203.0.113.5"));
    }

    #[test]
    fn test_identifiers_are_independent() {
        let limiter = RateLimiter::with_policy(1, Duration::from_secs(60));

        assert!(!limiter.is_rate_limited("203.0.113.5"));
        assert!(limiter.is_rate_limited("203.0.113.5"));
        assert!(!limiter.is_rate_limited("198.51.100.7"));
    }

    #[test]
    fn test_window_lapse_restarts_count_at_one() {
        let limiter = RateLimiter::with_policy(2, Duration::from_millis(50));

        assert!(!limiter.is_rate_limited("client"));
        assert!(!limiter.is_rate_limited("client"));
        assert!(limiter.is_rate_limited("client"));

        std::thread::sleep(Duration::from_millis(60));

        // Fresh window: the full budget is available again.
        assert!(!limiter.is_rate_limited("client"));
        assert!(!limiter.is_rate_limited("client"));
        assert!(limiter.is_rate_limited("client"));
    }

    #[test]
    fn test_default_budget_allows_sixty() {
        let limiter = RateLimiter::new(&RateLimitConfig::default());

        // Default policy is 60 requests per 60 second window.
        for _ in 0..60 {
            assert!(!limiter.is_rate_limited("client"));
        }
        assert!(limiter.is_rate_limited("client"));
    }
}
