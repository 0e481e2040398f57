/// Per-category TTL policy
///
/// Fast-moving data (tickers, order books) stays cached for seconds; slow
/// data (the exchange list) for an hour. Overridable per category through
/// `configs.json`.
use std::collections::HashMap;
use std::time::Duration;

use crate::config::Configs;
use crate::logger::{self, LogTag};
use crate::types::Category;

#[derive(Debug, Clone)]
pub struct CacheTtlConfig {
    ttls: HashMap<Category, Duration>,
}

impl CacheTtlConfig {
    fn default_ttl_secs(category: Category) -> u64 {
        match category {
            Category::ExchangeList => 3600,
            Category::ExchangeInfo => 300,
            Category::Ticker => 10,
            Category::Candles => 60,
            Category::OrderBook => 5,
            Category::Trades => 30,
            Category::ChainBalance => 300,
            Category::ChainRpc => 300,
            Category::NftCollection => 300,
        }
    }

    pub fn ttl_for(&self, category: Category) -> Duration {
        self.ttls
            .get(&category)
            .copied()
            .unwrap_or_else(|| Duration::from_secs(Self::default_ttl_secs(category)))
    }

    /// Override one category's TTL. Used by tests and by `from_configs`.
    pub fn with_ttl(mut self, category: Category, ttl: Duration) -> Self {
        self.ttls.insert(category, ttl);
        self
    }

    /// Apply `ttl_overrides` from the runtime configuration. Unknown category
    /// names are logged and skipped.
    pub fn from_configs(configs: &Configs) -> Self {
        let mut ttl_config = Self::default();
        for (name, secs) in &configs.ttl_overrides {
            match Category::parse(name) {
                Some(category) => {
                    ttl_config = ttl_config.with_ttl(category, Duration::from_secs(*secs));
                }
                None => {
                    logger::warning(
                        LogTag::Config,
                        &format!("Unknown category '{}' in ttl_overrides", name),
                    );
                }
            }
        }
        ttl_config
    }
}

impl Default for CacheTtlConfig {
    fn default() -> Self {
        Self {
            ttls: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ttls() {
        let config = CacheTtlConfig::default();
        assert_eq!(config.ttl_for(Category::ExchangeList), Duration::from_secs(3600));
        assert_eq!(config.ttl_for(Category::Ticker), Duration::from_secs(10));
        assert_eq!(config.ttl_for(Category::Candles), Duration::from_secs(60));
        assert_eq!(config.ttl_for(Category::OrderBook), Duration::from_secs(5));
        assert_eq!(config.ttl_for(Category::Trades), Duration::from_secs(30));
        assert_eq!(config.ttl_for(Category::ChainBalance), Duration::from_secs(300));
    }

    #[test]
    fn test_with_ttl_override() {
        let config = CacheTtlConfig::default().with_ttl(Category::Ticker, Duration::from_secs(2));
        assert_eq!(config.ttl_for(Category::Ticker), Duration::from_secs(2));
        // Other categories keep their defaults
        assert_eq!(config.ttl_for(Category::Candles), Duration::from_secs(60));
    }

    #[test]
    fn test_from_configs_applies_overrides() {
        let mut configs = Configs::default();
        configs.ttl_overrides.insert("ticker".to_string(), 5);
        configs.ttl_overrides.insert("bogus".to_string(), 99);

        let ttl_config = CacheTtlConfig::from_configs(&configs);
        assert_eq!(ttl_config.ttl_for(Category::Ticker), Duration::from_secs(5));
    }
}
