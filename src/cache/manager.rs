/// In-memory TTL cache keyed by request fingerprint
///
/// Thread-safe. Expiry is evaluated lazily at read time: an expired entry is
/// reported absent but left in the map until the next successful fetch
/// overwrites it. Entries are small and categories bounded, so there is no
/// eviction sweep. Tracks metrics for monitoring.
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Instant;

use crate::cache::config::CacheTtlConfig;
use crate::logger::{self, LogTag};
use crate::types::{Category, Payload};

struct CacheEntry {
    payload: Payload,
    category: Category,
    stored_at: Instant,
}

/// Cache metrics for monitoring
#[derive(Debug, Clone, Default)]
pub struct CacheMetrics {
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
    pub inserts: u64,
}

impl CacheMetrics {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

pub struct TtlCache {
    ttls: CacheTtlConfig,
    entries: RwLock<HashMap<String, CacheEntry>>,
    metrics: RwLock<CacheMetrics>,
}

impl TtlCache {
    pub fn new(ttls: CacheTtlConfig) -> Self {
        Self {
            ttls,
            entries: RwLock::new(HashMap::new()),
            metrics: RwLock::new(CacheMetrics::default()),
        }
    }

    /// Get a cached payload. Returns None when the key is missing or the
    /// entry has outlived its category TTL; expired entries stay in place.
    pub fn get(&self, category: Category, key: &str) -> Option<Payload> {
        let entries = self.entries.read().ok()?;

        let result = match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttls.ttl_for(entry.category) => {
                Some(entry.payload.clone())
            }
            Some(_) => {
                // Expired: treated as absent, overwritten by the next put
                if let Ok(mut metrics) = self.metrics.write() {
                    metrics.expirations += 1;
                }
                None
            }
            None => None,
        };
        drop(entries);

        if let Ok(mut metrics) = self.metrics.write() {
            if result.is_some() {
                metrics.hits += 1;
            } else {
                metrics.misses += 1;
            }
        }

        if result.is_some() {
            logger::debug(LogTag::Cache, &format!("hit {} {}", category, key));
        }
        result
    }

    /// Store a payload, overwriting any previous entry under the key.
    pub fn put(&self, category: Category, key: String, payload: Payload) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(
                key,
                CacheEntry {
                    payload,
                    category,
                    stored_at: Instant::now(),
                },
            );
        }

        if let Ok(mut metrics) = self.metrics.write() {
            metrics.inserts += 1;
        }
    }

    pub fn metrics(&self) -> CacheMetrics {
        self.metrics
            .read()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    fn ticker_payload(price: f64) -> Payload {
        Payload::Ticker(crate::types::Ticker {
            source: "gateio".to_string(),
            symbol: "BTC/USDT".to_string(),
            price,
            high: price * 1.1,
            low: price * 0.9,
            volume: 1234.5,
            timestamp: 1_700_000_000_000,
        })
    }

    #[test]
    fn test_put_then_get_returns_identical_payload() {
        let cache = TtlCache::new(CacheTtlConfig::default());
        let payload = ticker_payload(65_000.0);

        cache.put(Category::Ticker, "fp1".to_string(), payload.clone());
        assert_eq!(cache.get(Category::Ticker, "fp1"), Some(payload));

        let metrics = cache.metrics();
        assert_eq!(metrics.hits, 1);
        assert_eq!(metrics.inserts, 1);
    }

    #[test]
    fn test_missing_key_is_a_miss() {
        let cache = TtlCache::new(CacheTtlConfig::default());
        assert_eq!(cache.get(Category::Ticker, "nope"), None);
        assert_eq!(cache.metrics().misses, 1);
    }

    #[test]
    fn test_expired_entry_reads_absent_but_stays_in_map() {
        let ttls = CacheTtlConfig::default().with_ttl(Category::Ticker, Duration::from_millis(50));
        let cache = TtlCache::new(ttls);

        cache.put(Category::Ticker, "fp".to_string(), ticker_payload(100.0));
        assert!(cache.get(Category::Ticker, "fp").is_some());

        thread::sleep(Duration::from_millis(80));
        assert_eq!(cache.get(Category::Ticker, "fp"), None);
        // Lazy expiry: the stale entry is still occupying its slot
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.metrics().expirations, 1);
    }

    #[test]
    fn test_put_overwrites_stale_entry() {
        let ttls = CacheTtlConfig::default().with_ttl(Category::Ticker, Duration::from_millis(50));
        let cache = TtlCache::new(ttls);

        cache.put(Category::Ticker, "fp".to_string(), ticker_payload(100.0));
        thread::sleep(Duration::from_millis(80));
        cache.put(Category::Ticker, "fp".to_string(), ticker_payload(200.0));

        match cache.get(Category::Ticker, "fp") {
            Some(Payload::Ticker(t)) => assert_eq!(t.price, 200.0),
            other => panic!("expected refreshed ticker, got {:?}", other),
        }
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_hit_rate() {
        let cache = TtlCache::new(CacheTtlConfig::default());
        cache.put(Category::Ticker, "fp".to_string(), ticker_payload(1.0));

        cache.get(Category::Ticker, "fp");
        cache.get(Category::Ticker, "other");

        let metrics = cache.metrics();
        assert!((metrics.hit_rate() - 0.5).abs() < f64::EPSILON);
    }
}
