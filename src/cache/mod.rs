/// Time-bounded response cache
///
/// One TTL policy per category, lazy expiry at read time, no eviction sweep.
/// Only the dispatcher writes here, and only on successful fetches.

pub mod config;
pub mod manager;

pub use config::CacheTtlConfig;
pub use manager::{CacheMetrics, TtlCache};
