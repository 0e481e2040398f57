/// Static adapter registry
///
/// Maps an upstream identifier to its constructed adapter. Built once at
/// startup and read-only afterwards, so lookups need no locking. Replaces
/// any string-keyed dynamic instantiation: an identifier either resolves
/// here or the request fails with `UnknownSource` before touching cache or
/// network.
use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::adapters::ankr::AnkrAdapter;
use crate::adapters::binance::BinanceAdapter;
use crate::adapters::gateio::GateioAdapter;
use crate::adapters::okx::OkxAdapter;
use crate::adapters::reservoir::ReservoirAdapter;
use crate::adapters::{SourceAdapter, SourceDescriptor};
use crate::errors::{RelayError, RelayResult};
use crate::logger::{self, LogTag};
use crate::types::Operation;

pub struct AdapterRegistry {
    adapters: HashMap<&'static str, Arc<dyn SourceAdapter>>,
}

impl AdapterRegistry {
    /// Empty registry, for tests that assemble their own source set.
    pub fn empty() -> Self {
        Self {
            adapters: HashMap::new(),
        }
    }

    /// Registry holding every built-in source.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(GateioAdapter::new()));
        registry.register(Arc::new(BinanceAdapter::new()));
        registry.register(Arc::new(OkxAdapter::new()));
        registry.register(Arc::new(AnkrAdapter::new()));
        registry.register(Arc::new(ReservoirAdapter::new()));

        logger::info(
            LogTag::Dispatch,
            &format!("Adapter registry built with {} sources", registry.len()),
        );
        registry
    }

    pub fn register(&mut self, adapter: Arc<dyn SourceAdapter>) {
        self.adapters.insert(adapter.descriptor().id, adapter);
    }

    pub fn resolve(&self, source_id: &str) -> RelayResult<Arc<dyn SourceAdapter>> {
        self.adapters
            .get(source_id)
            .cloned()
            .ok_or_else(|| RelayError::UnknownSource {
                source_id: source_id.to_string(),
            })
    }

    pub fn contains(&self, source_id: &str) -> bool {
        self.adapters.contains_key(source_id)
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }

    pub fn sources(&self) -> Vec<&SourceDescriptor> {
        self.adapters.values().map(|a| a.descriptor()).collect()
    }

    /// Sorted ids of every source that can serve market data. Backs the
    /// `exchange-list` category.
    pub fn exchange_sources(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .adapters
            .values()
            .filter(|a| a.descriptor().supports(Operation::Ticker))
            .map(|a| a.descriptor().id.to_string())
            .collect();
        ids.sort();
        ids
    }
}

/// Process-wide default registry, for embedders that do not need isolated
/// instances. Tests construct their own via `with_defaults`/`empty`.
static GLOBAL_REGISTRY: Lazy<Arc<AdapterRegistry>> =
    Lazy::new(|| Arc::new(AdapterRegistry::with_defaults()));

pub fn get_registry() -> Arc<AdapterRegistry> {
    GLOBAL_REGISTRY.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_known_sources() {
        let registry = AdapterRegistry::with_defaults();
        for id in ["gateio", "binance", "okx", "ankr", "reservoir"] {
            assert!(registry.contains(id), "missing {}", id);
            assert_eq!(registry.resolve(id).unwrap().descriptor().id, id);
        }
    }

    #[test]
    fn test_resolve_unknown_source_names_the_id() {
        let registry = AdapterRegistry::with_defaults();
        match registry.resolve("not-a-real-exchange") {
            Err(RelayError::UnknownSource { source_id }) => {
                assert_eq!(source_id, "not-a-real-exchange");
            }
            other => panic!("expected UnknownSource, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_exchange_sources_lists_market_capable_ids() {
        let registry = AdapterRegistry::with_defaults();
        assert_eq!(registry.exchange_sources(), vec!["binance", "gateio", "okx"]);
    }

    #[test]
    fn test_declared_capabilities() {
        let registry = AdapterRegistry::with_defaults();

        let ankr = registry.resolve("ankr").unwrap();
        assert!(ankr.supports(Operation::ChainBalance));
        assert!(!ankr.supports(Operation::Ticker));

        let gateio = registry.resolve("gateio").unwrap();
        assert!(gateio.supports(Operation::Ticker));
        assert!(!gateio.supports(Operation::CollectionInfo));
    }
}
