use std::sync::Arc;

use crate::{
    entities::rate_limit::{Quota, RateLimitDecision, RateLimitKey},
    infrastructure::limiter::counter_store::CounterStore,
};

/// Fixed-window limiter over an injectable [`CounterStore`].
#[derive(Debug, Clone)]
pub struct RateLimiter {
    store: Arc<dyn CounterStore>,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        RateLimiter { store }
    }

    pub fn store(&self) -> &Arc<dyn CounterStore> {
        &self.store
    }

    /// Consumes one attempt for `key` if `quota` allows it.
    ///
    /// Throttled attempts are not counted, so retrying while throttled never
    /// pushes the window out. The admitting increment is conditional inside
    /// the store, so concurrent callers cannot overshoot the quota.
    pub fn check_and_consume(&self, key: &RateLimitKey, quota: &Quota) -> RateLimitDecision {
        if self.store.get(key) >= quota.max_attempts() {
            return self.throttled(key, quota);
        }

        match self.store.increment_below(key, quota.window(), quota.max_attempts()) {
            Some(count) => {
                tracing::debug!(key = %key, count, "attempt admitted");
                RateLimitDecision::Allowed {
                    remaining: quota.max_attempts().saturating_sub(count),
                }
            }
            None => self.throttled(key, quota),
        }
    }

    /// Attempts used in the live window.
    pub fn attempts(&self, key: &RateLimitKey) -> u32 {
        self.store.get(key)
    }

    fn throttled(&self, key: &RateLimitKey, quota: &Quota) -> RateLimitDecision {
        let retry_after = self.store.resets_in(key).unwrap_or(quota.window());
        tracing::warn!(
            client_ip = %key.client_id(),
            action = %key.action(),
            retry_after_secs = retry_after.as_secs(),
            "rate limit exceeded"
        );
        RateLimitDecision::Throttled { retry_after }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        entities::rate_limit::{Action, RateLimitPolicy},
        infrastructure::limiter::{clock::ManualClock, counter_store::MemoryCounterStore},
    };

    fn limiter() -> (RateLimiter, ManualClock) {
        let clock = ManualClock::default();
        let store = Arc::new(MemoryCounterStore::with_clock(clock.clone()));
        (RateLimiter::new(store), clock)
    }

    #[test]
    fn throttles_after_quota_without_counting_rejections() {
        let (limiter, _) = limiter();
        let key = RateLimitKey::new("10.0.0.1", Action::ContactSubmit);
        let quota = Quota::new(3, Duration::from_secs(3600)).unwrap();

        for expected_remaining in [2, 1, 0] {
            assert_eq!(
                limiter.check_and_consume(&key, &quota),
                RateLimitDecision::Allowed { remaining: expected_remaining }
            );
        }
        for _ in 0..5 {
            assert!(!limiter.check_and_consume(&key, &quota).is_allowed());
        }
        assert_eq!(limiter.attempts(&key), 3);
    }

    #[test]
    fn throttled_decision_reports_time_left_in_window() {
        let (limiter, clock) = limiter();
        let key = RateLimitKey::new("10.0.0.1", Action::AdminLogin);
        let quota = Quota::new(1, Duration::from_secs(900)).unwrap();

        limiter.check_and_consume(&key, &quota);
        clock.advance(Duration::from_secs(300));

        assert_eq!(
            limiter.check_and_consume(&key, &quota),
            RateLimitDecision::Throttled { retry_after: Duration::from_secs(600) }
        );
    }

    #[test]
    fn window_reset_allows_again() {
        let (limiter, clock) = limiter();
        let key = RateLimitKey::new("10.0.0.1", Action::ContactSubmit);
        let quota = Quota::new(2, Duration::from_secs(60)).unwrap();

        limiter.check_and_consume(&key, &quota);
        limiter.check_and_consume(&key, &quota);
        assert!(!limiter.check_and_consume(&key, &quota).is_allowed());

        clock.advance(Duration::from_secs(61));
        assert_eq!(limiter.attempts(&key), 0);
        assert!(limiter.check_and_consume(&key, &quota).is_allowed());
    }

    #[test]
    fn actions_do_not_share_counters() {
        let (limiter, _) = limiter();
        let policy = RateLimitPolicy::default();
        let contact = RateLimitKey::new("10.0.0.1", Action::ContactSubmit);
        let login = RateLimitKey::new("10.0.0.1", Action::AdminLogin);

        for _ in 0..3 {
            limiter.check_and_consume(&contact, &policy.contact);
        }
        assert!(!limiter.check_and_consume(&contact, &policy.contact).is_allowed());
        assert!(limiter.check_and_consume(&login, &policy.login).is_allowed());
    }

    #[test]
    fn parallel_callers_admit_exactly_the_quota() {
        let limiter = RateLimiter::new(Arc::new(MemoryCounterStore::new()));
        let key = RateLimitKey::new("10.0.0.9", Action::ContactSubmit);
        let quota = Quota::new(7, Duration::from_secs(3600)).unwrap();

        let handles: Vec<_> = (0..64)
            .map(|_| {
                let limiter = limiter.clone();
                let key = key.clone();
                std::thread::spawn(move || limiter.check_and_consume(&key, &quota).is_allowed())
            })
            .collect();
        let allowed = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|allowed| *allowed)
            .count();

        assert_eq!(allowed, 7);
        assert_eq!(limiter.attempts(&key), 7);
    }
}
