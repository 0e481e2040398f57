/// Request dispatcher - the entry point of the relay core
///
/// Validates the requested category and source against the registry,
/// consults the cache, fetches through the relay fallback on a miss, and
/// populates the cache on success. This is the only component that writes
/// to the cache, and failed fetches are never stored.
///
/// Per-request lifecycle:
/// Received -> Resolved -> (CacheHit -> Done)
///                       | (CacheMiss -> Fetching -> (Success -> Cached -> Done)
///                                                 | (Failed -> Done))
use std::collections::HashMap;
use std::sync::Arc;

use crate::adapters::registry::{get_registry, AdapterRegistry};
use crate::cache::{CacheMetrics, CacheTtlConfig, TtlCache};
use crate::config::Configs;
use crate::errors::{RelayError, RelayResult};
use crate::fingerprint::fingerprint;
use crate::logger::{self, LogTag};
use crate::relay::{RelayFallback, SourceStats};
use crate::types::{Category, FetchRequest, ParameterSet, Payload};

pub struct Dispatcher {
    registry: Arc<AdapterRegistry>,
    cache: TtlCache,
    relay: RelayFallback,
}

impl Dispatcher {
    pub fn new(registry: Arc<AdapterRegistry>, cache: TtlCache, relay: RelayFallback) -> Self {
        Self {
            registry,
            cache,
            relay,
        }
    }

    /// Dispatcher on the process-wide registry with configuration-driven
    /// TTLs, relay endpoint, and timeout.
    pub fn from_configs(configs: &Configs) -> Result<Self, String> {
        Ok(Self::new(
            get_registry(),
            TtlCache::new(CacheTtlConfig::from_configs(configs)),
            RelayFallback::from_configs(configs)?,
        ))
    }

    /// Handle one logical request.
    pub async fn handle(
        &self,
        category: Category,
        source_id: &str,
        parameters: ParameterSet,
    ) -> RelayResult<Payload> {
        // The exchange list is registry-local: no source to resolve, no
        // upstream traffic, but cached under the category fingerprint so the
        // TTL table holds uniformly.
        if category == Category::ExchangeList {
            let key = fingerprint(category, &parameters);
            if let Some(hit) = self.cache.get(category, &key) {
                return Ok(hit);
            }
            let payload = Payload::ExchangeList(self.registry.exchange_sources());
            self.cache.put(category, key, payload.clone());
            return Ok(payload);
        }

        // Unknown sources short-circuit with no cache interaction
        let adapter = self.registry.resolve(source_id)?;

        let operation = category.operation().ok_or_else(|| {
            RelayError::invalid_parameters(format!(
                "category '{}' has no upstream operation",
                category
            ))
        })?;
        if !adapter.supports(operation) {
            return Err(RelayError::UnsupportedOperation {
                source_id: source_id.to_string(),
                operation,
            });
        }

        let key = fingerprint(category, &parameters);
        if let Some(hit) = self.cache.get(category, &key) {
            return Ok(hit);
        }

        let mut request = FetchRequest::new(category, source_id, parameters);
        let payload = self.relay.fetch(adapter.as_ref(), &mut request).await?;

        self.cache.put(category, key, payload.clone());
        logger::info(
            LogTag::Dispatch,
            &format!(
                "{} {} fetched ({} path)",
                source_id,
                category,
                request.attempt.as_str()
            ),
        );
        Ok(payload)
    }

    pub fn cache_metrics(&self) -> CacheMetrics {
        self.cache.metrics()
    }

    pub fn source_stats(&self) -> HashMap<String, SourceStats> {
        self.relay.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use crate::errors::RelayResult;
    use crate::relay::testing::{FakeTransport, GATEIO_TICKER_BODY};
    use crate::relay::TransportResponse;
    use crate::types::Ticker;

    fn dispatcher_with(
        responses: Vec<RelayResult<TransportResponse>>,
    ) -> (Dispatcher, Arc<FakeTransport>) {
        dispatcher_with_ttls(responses, CacheTtlConfig::default())
    }

    fn dispatcher_with_ttls(
        responses: Vec<RelayResult<TransportResponse>>,
        ttls: CacheTtlConfig,
    ) -> (Dispatcher, Arc<FakeTransport>) {
        let transport = FakeTransport::new(responses);
        let relay = RelayFallback::new(
            transport.clone(),
            "https://relay.example.com/raw".to_string(),
            Duration::from_secs(30),
        );
        let dispatcher = Dispatcher::new(
            Arc::new(AdapterRegistry::with_defaults()),
            TtlCache::new(ttls),
            relay,
        );
        (dispatcher, transport)
    }

    fn ticker_params() -> ParameterSet {
        ParameterSet::from_pairs([("symbol", "BTC/USDT")])
    }

    fn expect_ticker(payload: Payload) -> Ticker {
        match payload {
            Payload::Ticker(ticker) => ticker,
            other => panic!("expected ticker payload, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_miss_then_hit_serves_from_cache() {
        let (dispatcher, transport) =
            dispatcher_with(vec![FakeTransport::ok(GATEIO_TICKER_BODY)]);

        let first = dispatcher
            .handle(Category::Ticker, "gateio", ticker_params())
            .await
            .unwrap();
        let ticker = expect_ticker(first.clone());
        assert_eq!(ticker.price, 65000.5);
        assert_eq!(ticker.symbol, "BTC/USDT");
        assert_eq!(transport.calls().len(), 1);

        // Identical fingerprint: served from cache, zero further calls
        let second = dispatcher
            .handle(Category::Ticker, "gateio", ticker_params())
            .await
            .unwrap();
        assert_eq!(second, first);
        assert_eq!(transport.calls().len(), 1);
        assert_eq!(dispatcher.cache_metrics().hits, 1);
    }

    #[tokio::test]
    async fn test_parameter_order_does_not_change_the_fingerprint() {
        let (dispatcher, transport) = dispatcher_with(vec![FakeTransport::ok(
            r#"[["1700000000", "500000", "100.5", "101.0", "99.0", "100.0", "5000"]]"#,
        )]);

        let a = ParameterSet::from_pairs([("symbol", "BTC/USDT"), ("timeframe", "1m")]);
        let b = ParameterSet::from_pairs([("timeframe", "1m"), ("symbol", "BTC/USDT")]);

        dispatcher.handle(Category::Candles, "gateio", a).await.unwrap();
        dispatcher.handle(Category::Candles, "gateio", b).await.unwrap();
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_source_short_circuits_before_cache_and_network() {
        let (dispatcher, transport) = dispatcher_with(vec![]);

        let err = dispatcher
            .handle(Category::Ticker, "not-a-real-exchange", ticker_params())
            .await
            .unwrap_err();

        let body = err.body();
        assert_eq!(body.status, 404);
        assert!(body.message.contains("not-a-real-exchange"));
        assert!(transport.calls().is_empty());

        // No cache interaction at all
        let metrics = dispatcher.cache_metrics();
        assert_eq!(metrics.hits + metrics.misses + metrics.inserts, 0);
    }

    #[tokio::test]
    async fn test_unsupported_operation_is_local_and_named() {
        let (dispatcher, transport) = dispatcher_with(vec![]);

        let err = dispatcher
            .handle(Category::Ticker, "ankr", ticker_params())
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::UnsupportedOperation { .. }));
        assert_eq!(err.status_code(), 404);
        assert!(err.to_string().contains("ankr"));
        assert!(err.to_string().contains("ticker"));
        assert!(transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_expired_entry_triggers_exactly_one_refetch() {
        let ttls = CacheTtlConfig::default()
            .with_ttl(Category::Ticker, Duration::from_millis(50));
        let (dispatcher, transport) = dispatcher_with_ttls(
            vec![
                FakeTransport::ok(GATEIO_TICKER_BODY),
                FakeTransport::ok(GATEIO_TICKER_BODY),
            ],
            ttls,
        );

        dispatcher
            .handle(Category::Ticker, "gateio", ticker_params())
            .await
            .unwrap();
        assert_eq!(transport.calls().len(), 1);

        thread::sleep(Duration::from_millis(80));

        dispatcher
            .handle(Category::Ticker, "gateio", ticker_params())
            .await
            .unwrap();
        assert_eq!(transport.calls().len(), 2);
        assert_eq!(dispatcher.cache_metrics().expirations, 1);
    }

    #[tokio::test]
    async fn test_direct_failure_relay_success_populates_cache() {
        let (dispatcher, transport) = dispatcher_with(vec![
            FakeTransport::network_error(),
            FakeTransport::ok(GATEIO_TICKER_BODY),
        ]);

        let payload = dispatcher
            .handle(Category::Ticker, "gateio", ticker_params())
            .await
            .unwrap();
        expect_ticker(payload);

        // Call sequence: direct attempt then relay attempt, one of each
        let calls = transport.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].starts_with("https://api.gateio.ws"));
        assert!(calls[1].starts_with("https://relay.example.com"));

        // Relayed success is cached like a direct one
        dispatcher
            .handle(Category::Ticker, "gateio", ticker_params())
            .await
            .unwrap();
        assert_eq!(transport.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_failures_are_never_cached() {
        let (dispatcher, transport) = dispatcher_with(vec![
            FakeTransport::http_error(502),
            FakeTransport::http_error(500),
            FakeTransport::ok(GATEIO_TICKER_BODY),
        ]);

        let err = dispatcher
            .handle(Category::Ticker, "gateio", ticker_params())
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::RelayExhausted { .. }));
        assert_eq!(err.status_code(), 500);
        assert_eq!(dispatcher.cache_metrics().inserts, 0);

        // The next identical request goes upstream again and succeeds
        dispatcher
            .handle(Category::Ticker, "gateio", ticker_params())
            .await
            .unwrap();
        assert_eq!(transport.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_exchange_list_is_registry_local_and_cached() {
        let (dispatcher, transport) = dispatcher_with(vec![]);

        let payload = dispatcher
            .handle(Category::ExchangeList, "", ParameterSet::new())
            .await
            .unwrap();
        match payload {
            Payload::ExchangeList(ids) => {
                assert_eq!(ids, vec!["binance", "gateio", "okx"]);
            }
            other => panic!("expected exchange list, got {:?}", other),
        }
        assert!(transport.calls().is_empty());

        dispatcher
            .handle(Category::ExchangeList, "", ParameterSet::new())
            .await
            .unwrap();
        assert_eq!(dispatcher.cache_metrics().hits, 1);
    }

    #[tokio::test]
    async fn test_source_stats_are_exposed() {
        let (dispatcher, _) = dispatcher_with(vec![FakeTransport::ok(GATEIO_TICKER_BODY)]);

        dispatcher
            .handle(Category::Ticker, "gateio", ticker_params())
            .await
            .unwrap();

        let stats = dispatcher.source_stats();
        assert_eq!(stats.get("gateio").unwrap().requests, 1);
    }
}
