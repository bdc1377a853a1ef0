use std::sync::Arc;

use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::limiter::counter_store::CounterStore;

/// Drops expired rate limit counters so idle clients do not pile up.
pub async fn start_counter_sweep(store: Arc<dyn CounterStore>, every: Duration) {
    let mut interval = interval(every);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;

        let purged = store.purge_expired();
        if purged > 0 {
            tracing::debug!(purged, remaining = store.len(), "Swept expired rate limit counters");
        }
    }
}
