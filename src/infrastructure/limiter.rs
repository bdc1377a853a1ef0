pub mod clock;
pub mod counter_store;
pub mod rate_limiter;
