//! Per-user rate limiting for link submissions

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};
use std::time::{Duration, Instant};

use crate::constants::RATE_LIMIT_SECONDS;

/// Tracks when each user last queued a job
pub struct RateLimiter {
    interval: Duration,
    last_seen: Mutex<HashMap<u64, Instant>>,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_seen: Mutex::new(HashMap::new()),
        }
    }

    /// Check if a user may submit another link
    ///
    /// Records the submission time when allowed.
    pub fn check(&self, user_id: u64) -> bool {
        let mut last_seen = self.last_seen.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        match last_seen.get(&user_id) {
            Some(&last) if now.duration_since(last) < self.interval => false,
            _ => {
                last_seen.insert(user_id, now);
                true
            }
        }
    }
}

/// Check a user against the process-wide limiter
pub fn check_rate_limit(user_id: u64) -> bool {
    static LIMITER: OnceLock<RateLimiter> = OnceLock::new();
    LIMITER
        .get_or_init(|| RateLimiter::new(Duration::from_secs(RATE_LIMIT_SECONDS)))
        .check(user_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_rapid_submissions() {
        let limiter = RateLimiter::new(Duration::from_secs(60));
        assert!(limiter.check(123));
        assert!(!limiter.check(123));
    }

    #[test]
    fn test_users_are_independent() {
        let limiter = RateLimiter::new(Duration::from_secs(60));
        assert!(limiter.check(123));
        assert!(limiter.check(456));
    }

    #[test]
    fn test_interval_elapses() {
        let limiter = RateLimiter::new(Duration::ZERO);
        assert!(limiter.check(123));
        assert!(limiter.check(123));
    }
}
