//! Account lockout tracking.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use tokio::sync::broadcast;
use tokio::time;

use crate::config::LockoutConfig;
use crate::observability::metrics;

/// Failure history for one account.
struct LockoutRecord {
    failure_count: u32,
    /// Unix seconds of the most recent failure.
    last_failure_at: u64,
    /// Distinct origin addresses failures arrived from.
    origins: HashSet<String>,
}

/// What the caller learns about an account's lockout state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockoutStatus {
    pub is_locked: bool,

    /// Whole minutes until the lock clears, rounded up. Only present
    /// while locked.
    pub minutes_left: Option<u64>,

    /// Failures arrived from more distinct origins than the
    /// configured threshold.
    pub suspicious_activity: bool,
}

/// Tracks failed logins per account and answers lockout checks.
///
/// Records expire two ways: lazily when a check reads a record whose
/// window has lapsed, and via the background sweeper for accounts
/// nothing reads again.
pub struct LockoutTracker {
    records: DashMap<String, LockoutRecord>,
    max_failures: u32,
    window_secs: u64,
    suspicious_origin_threshold: usize,
}

/// Lockout keys are case-insensitive email addresses.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

impl LockoutTracker {
    pub fn new(config: &LockoutConfig) -> Self {
        Self {
            records: DashMap::new(),
            max_failures: config.max_failures,
            window_secs: config.window_mins * 60,
            suspicious_origin_threshold: config.suspicious_origin_threshold,
        }
    }

    /// Whether `email` is currently locked out.
    ///
    /// A record whose window has lapsed is deleted on this read and
    /// reported as not locked.
    pub fn check(&self, email: &str) -> LockoutStatus {
        let key = normalize_email(email);
        let now = unix_now();

        let status = {
            let Some(record) = self.records.get(&key) else {
                return LockoutStatus::default();
            };

            let elapsed = now.saturating_sub(record.last_failure_at);
            if elapsed >= self.window_secs {
                None
            } else {
                let is_locked = record.failure_count >= self.max_failures;
                let minutes_left =
                    is_locked.then(|| (self.window_secs - elapsed).div_ceil(60));
                Some(LockoutStatus {
                    is_locked,
                    minutes_left,
                    suspicious_activity: record.origins.len() > self.suspicious_origin_threshold,
                })
            }
        };

        // The map guard is released above; removal must not run while
        // a reference into the shard is still held.
        match status {
            Some(status) => status,
            None => {
                self.records.remove(&key);
                LockoutStatus::default()
            }
        }
    }

    /// Record one failed login attempt. The only mutator besides reset.
    pub fn track_failure(&self, email: &str, origin_address: Option<&str>) {
        let key = normalize_email(email);
        let now = unix_now();

        let mut record = self.records.entry(key).or_insert_with(|| LockoutRecord {
            failure_count: 0,
            last_failure_at: now,
            origins: HashSet::new(),
        });
        record.failure_count += 1;
        record.last_failure_at = now;
        if let Some(origin) = origin_address {
            record.origins.insert(origin.to_string());
        }
    }

    /// Clear the record after a successful authentication.
    pub fn reset(&self, email: &str) {
        self.records.remove(&normalize_email(email));
    }

    /// Drop every record whose window has lapsed; returns the number
    /// of live records left behind.
    pub fn sweep(&self) -> usize {
        let now = unix_now();
        self.records
            .retain(|_, record| now.saturating_sub(record.last_failure_at) < self.window_secs);
        self.records.len()
    }

    /// Periodic sweep loop, one per process.
    ///
    /// Each pass holds no lock beyond the single map iteration.
    pub async fn run_sweeper(
        self: Arc<Self>,
        interval: Duration,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        tracing::info!(
            interval_secs = interval.as_secs(),
            "Lockout sweeper starting"
        );

        let mut ticker = time::interval(interval);
        // The immediate first tick would sweep an empty map.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let live = self.sweep();
                    metrics::record_lockout_records(live);
                    tracing::debug!(live_records = live, "Swept expired lockout records");
                }
                _ = shutdown.recv() => {
                    tracing::info!("Lockout sweeper received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    #[cfg(test)]
    fn record_count(&self) -> usize {
        self.records.len()
    }

    #[cfg(test)]
    fn backdate(&self, email: &str, seconds: u64) {
        if let Some(mut record) = self.records.get_mut(&normalize_email(email)) {
            record.last_failure_at = record.last_failure_at.saturating_sub(seconds);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> LockoutTracker {
        LockoutTracker::new(&LockoutConfig::default())
    }

    #[test]
    fn test_unknown_account_is_not_locked() {
        let tracker = tracker();
        assert_eq!(tracker.check("user@example.com"), LockoutStatus::default());
    }

    #[test]
    fn test_locks_after_threshold_failures() {
        let tracker = tracker();
        for _ in 0..4 {
            tracker.track_failure("user@example.com", Some("203.0.113.5"));
        }
        assert!(!tracker.check("user@example.com").is_locked);

        tracker.track_failure("user@example.com", Some("203.0.113.5"));
        let status = tracker.check("user@example.com");
        assert!(status.is_locked);
        assert_eq!(status.minutes_left, Some(15));
    }

    #[test]
    fn test_reset_clears_the_lock() {
        let tracker = tracker();
        for _ in 0..5 {
            tracker.track_failure("user@example.com", None);
        }
        assert!(tracker.check("user@example.com").is_locked);

        tracker.reset("user@example.com");
        assert!(!tracker.check("user@example.com").is_locked);
    }

    #[test]
    fn test_email_casing_and_whitespace_share_one_record() {
        let tracker = tracker();
        for _ in 0..3 {
            tracker.track_failure("User@Example.com", None);
        }
        tracker.track_failure("  user@example.com ", None);
        tracker.track_failure("USER@EXAMPLE.COM", None);

        assert!(tracker.check("user@example.com").is_locked);
        assert_eq!(tracker.record_count(), 1);
    }

    #[test]
    fn test_three_origins_flag_suspicious_activity() {
        let tracker = tracker();
        tracker.track_failure("user@example.com", Some("203.0.113.1"));
        tracker.track_failure("user@example.com", Some("203.0.113.2"));
        assert!(!tracker.check("user@example.com").suspicious_activity);

        tracker.track_failure("user@example.com", Some("203.0.113.3"));
        assert!(tracker.check("user@example.com").suspicious_activity);
    }

    #[test]
    fn test_lapsed_record_is_deleted_on_read() {
        let tracker = tracker();
        for _ in 0..5 {
            tracker.track_failure("user@example.com", None);
        }
        tracker.backdate("user@example.com", 16 * 60);

        assert!(!tracker.check("user@example.com").is_locked);
        assert_eq!(tracker.record_count(), 0);
    }

    #[test]
    fn test_sweep_prunes_only_lapsed_records() {
        let tracker = tracker();
        tracker.track_failure("stale@example.com", None);
        tracker.track_failure("fresh@example.com", None);
        tracker.backdate("stale@example.com", 16 * 60);

        assert_eq!(tracker.sweep(), 1);
        assert_eq!(tracker.record_count(), 1);
        assert!(!tracker.check("fresh@example.com").is_locked);
    }

    #[test]
    fn test_minutes_left_rounds_up() {
        let tracker = tracker();
        for _ in 0..5 {
            tracker.track_failure("user@example.com", None);
        }
        // 14m30s into the window leaves 30s, reported as one minute.
        tracker.backdate("user@example.com", 14 * 60 + 30);

        let status = tracker.check("user@example.com");
        assert!(status.is_locked);
        assert_eq!(status.minutes_left, Some(1));
    }
}
