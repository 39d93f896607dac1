use std::num::NonZeroU32;
use std::sync::Arc;

use governor::clock::DefaultClock;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter};
use tracing::warn;

/// Keyed rate limiter for login attempts, one bucket per email.
pub struct LoginRateLimiter {
    limiter: Arc<RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>>,
}

impl LoginRateLimiter {
    pub fn new(per_minute: u32, burst: u32) -> Self {
        let per_minute = NonZeroU32::new(per_minute).unwrap_or(NonZeroU32::new(5).unwrap());
        let burst = NonZeroU32::new(burst).unwrap_or(NonZeroU32::new(5).unwrap());

        let quota = Quota::per_minute(per_minute).allow_burst(burst);

        Self {
            limiter: Arc::new(RateLimiter::keyed(quota)),
        }
    }

    /// Whether another attempt for this key is allowed right now.
    pub fn check(&self, key: &str) -> bool {
        match self.limiter.check_key(&key.to_string()) {
            Ok(()) => true,
            Err(_) => {
                warn!(key, "login rate limit exceeded");
                false
            }
        }
    }
}

impl Clone for LoginRateLimiter {
    fn clone(&self) -> Self {
        Self {
            limiter: Arc::clone(&self.limiter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limiter_allows_burst_then_rejects() {
        let limiter = LoginRateLimiter::new(5, 5);

        for i in 0..5 {
            assert!(
                limiter.check("alice@example.com"),
                "attempt {i} should be within the burst"
            );
        }

        assert!(
            !limiter.check("alice@example.com"),
            "attempt after the burst should be rejected"
        );
    }

    #[test]
    fn limiter_tracks_keys_independently() {
        let limiter = LoginRateLimiter::new(5, 1);

        assert!(limiter.check("alice@example.com"));
        assert!(!limiter.check("alice@example.com"));

        assert!(
            limiter.check("bob@example.com"),
            "a different email should have its own bucket"
        );
    }
}
