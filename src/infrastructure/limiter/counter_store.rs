use std::{
    fmt::Debug,
    time::{Duration, Instant},
};

use dashmap::{mapref::entry::Entry, DashMap};

use crate::{
    entities::rate_limit::RateLimitKey,
    infrastructure::limiter::clock::{Clock, SystemClock},
};

/// Fixed-window counter. Expired once `now > window_start + ttl`.
#[derive(Debug, Clone, Copy)]
struct Counter {
    count: u32,
    window_start: Instant,
    ttl: Duration,
}

impl Counter {
    fn start(now: Instant, ttl: Duration) -> Self {
        Counter {
            count: 1,
            window_start: now,
            ttl,
        }
    }

    /// `None` when the window end is past what `Instant` can represent.
    fn expires_at(&self) -> Option<Instant> {
        self.window_start.checked_add(self.ttl)
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at().is_some_and(|at| now > at)
    }
}

/// Keyed attempt counters shared by every request.
///
/// All mutation goes through `increment` and `increment_below`, which are
/// atomic per key. Callers never read, modify and write back a count.
pub trait CounterStore: Send + Sync + Debug {
    /// Live count for `key`; zero when absent or expired.
    fn get(&self, key: &RateLimitKey) -> u32;

    /// Starts a window of `ttl` with count 1 when absent or expired,
    /// otherwise bumps the count and leaves the window alone.
    fn increment(&self, key: &RateLimitKey, ttl: Duration) -> u32;

    /// Like `increment`, but only while the live count is below `limit`.
    /// Returns `None` without touching the counter when the limit is reached.
    fn increment_below(&self, key: &RateLimitKey, ttl: Duration, limit: u32) -> Option<u32>;

    /// Time left in the live window for `key`.
    fn resets_in(&self, key: &RateLimitKey) -> Option<Duration>;

    /// Drops expired counters, returning how many were removed.
    fn purge_expired(&self) -> usize;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug)]
pub struct MemoryCounterStore<C: Clock = SystemClock> {
    map: DashMap<RateLimitKey, Counter>,
    clock: C,
}

impl MemoryCounterStore<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for MemoryCounterStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> MemoryCounterStore<C> {
    pub fn with_clock(clock: C) -> Self {
        MemoryCounterStore {
            map: DashMap::new(),
            clock,
        }
    }
}

impl<C: Clock> CounterStore for MemoryCounterStore<C> {
    fn get(&self, key: &RateLimitKey) -> u32 {
        let now = self.clock.now();
        self.map
            .get(key)
            .filter(|counter| !counter.is_expired(now))
            .map(|counter| counter.count)
            .unwrap_or(0)
    }

    fn increment(&self, key: &RateLimitKey, ttl: Duration) -> u32 {
        let now = self.clock.now();

        // The entry guard holds the shard lock until the end of the match.
        match self.map.entry(key.clone()) {
            Entry::Occupied(mut slot) => {
                let counter = slot.get_mut();
                if counter.is_expired(now) {
                    *counter = Counter::start(now, ttl);
                } else {
                    counter.count = counter.count.saturating_add(1);
                }
                counter.count
            }
            Entry::Vacant(slot) => {
                slot.insert(Counter::start(now, ttl));
                1
            }
        }
    }

    fn increment_below(&self, key: &RateLimitKey, ttl: Duration, limit: u32) -> Option<u32> {
        if limit == 0 {
            return None;
        }
        let now = self.clock.now();

        match self.map.entry(key.clone()) {
            Entry::Occupied(mut slot) => {
                let counter = slot.get_mut();
                if counter.is_expired(now) {
                    *counter = Counter::start(now, ttl);
                    Some(counter.count)
                } else if counter.count >= limit {
                    None
                } else {
                    counter.count += 1;
                    Some(counter.count)
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(Counter::start(now, ttl));
                Some(1)
            }
        }
    }

    fn resets_in(&self, key: &RateLimitKey) -> Option<Duration> {
        let now = self.clock.now();
        self.map
            .get(key)
            .filter(|counter| !counter.is_expired(now))
            .map(|counter| {
                counter
                    .expires_at()
                    .map_or(counter.ttl, |at| at.saturating_duration_since(now))
            })
    }

    fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let before = self.map.len();
        self.map.retain(|_, counter| !counter.is_expired(now));
        before.saturating_sub(self.map.len())
    }

    fn len(&self) -> usize {
        self.map.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{entities::rate_limit::Action, infrastructure::limiter::clock::ManualClock};

    const HOUR: Duration = Duration::from_secs(3600);

    fn store() -> (MemoryCounterStore<ManualClock>, ManualClock) {
        let clock = ManualClock::default();
        (MemoryCounterStore::with_clock(clock.clone()), clock)
    }

    fn key(client: &str) -> RateLimitKey {
        RateLimitKey::new(client, Action::ContactSubmit)
    }

    #[test]
    fn get_returns_zero_for_unknown_key() {
        let (store, _) = store();
        assert_eq!(store.get(&key("1.1.1.1")), 0);
    }

    #[test]
    fn get_reflects_every_increment_in_window() {
        let (store, clock) = store();
        let k = key("1.1.1.1");

        for n in 1..=7 {
            assert_eq!(store.increment(&k, HOUR), n);
            clock.advance(Duration::from_secs(60));
        }
        assert_eq!(store.get(&k), 7);
    }

    #[test]
    fn get_is_idempotent() {
        let (store, _) = store();
        let k = key("1.1.1.1");
        store.increment(&k, HOUR);
        store.increment(&k, HOUR);

        for _ in 0..10 {
            assert_eq!(store.get(&k), 2);
        }
    }

    #[test]
    fn counter_expires_after_ttl() {
        let (store, clock) = store();
        let k = key("1.1.1.1");
        store.increment(&k, HOUR);
        store.increment(&k, HOUR);

        clock.advance(HOUR);
        assert_eq!(store.get(&k), 2, "still live exactly at the window edge");

        clock.advance(Duration::from_secs(1));
        assert_eq!(store.get(&k), 0);
        assert_eq!(store.increment(&k, HOUR), 1);
    }

    #[test]
    fn increment_keeps_original_window() {
        let (store, clock) = store();
        let k = key("1.1.1.1");
        store.increment(&k, HOUR);

        clock.advance(Duration::from_secs(3000));
        store.increment(&k, HOUR);

        assert_eq!(store.resets_in(&k), Some(Duration::from_secs(600)));
        clock.advance(Duration::from_secs(601));
        assert_eq!(store.get(&k), 0);
    }

    #[test]
    fn increment_below_stops_at_limit_without_counting() {
        let (store, _) = store();
        let k = key("1.1.1.1");

        assert_eq!(store.increment_below(&k, HOUR, 2), Some(1));
        assert_eq!(store.increment_below(&k, HOUR, 2), Some(2));
        assert_eq!(store.increment_below(&k, HOUR, 2), None);
        assert_eq!(store.get(&k), 2);
    }

    #[test]
    fn increment_below_restarts_expired_window() {
        let (store, clock) = store();
        let k = key("1.1.1.1");
        store.increment_below(&k, HOUR, 1);
        assert_eq!(store.increment_below(&k, HOUR, 1), None);

        clock.advance(HOUR + Duration::from_secs(1));
        assert_eq!(store.increment_below(&k, HOUR, 1), Some(1));
    }

    #[test]
    fn purge_removes_only_expired_counters() {
        let (store, clock) = store();
        store.increment(&key("old"), Duration::from_secs(10));
        store.increment(&key("new"), HOUR);

        clock.advance(Duration::from_secs(11));
        assert_eq!(store.purge_expired(), 1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&key("new")), 1);
    }

    #[test]
    fn unrepresentable_window_end_never_expires() {
        let (store, clock) = store();
        let k = key("1.1.1.1");

        assert_eq!(store.increment(&k, Duration::MAX), 1);
        clock.advance(HOUR * 24 * 365);

        assert_eq!(store.get(&k), 1);
        assert_eq!(store.resets_in(&k), Some(Duration::MAX));
        assert_eq!(store.purge_expired(), 0);
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        let store = Arc::new(MemoryCounterStore::new());
        let k = key("1.1.1.1");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                let k = k.clone();
                std::thread::spawn(move || {
                    for _ in 0..250 {
                        store.increment(&k, HOUR);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.get(&k), 2000);
    }
}
