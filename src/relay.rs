/// Direct fetch with a single relayed fallback
///
/// Wraps every outbound call: the adapter's prepared request is executed
/// directly first; on a retriable failure (network error, timeout, non-2xx,
/// malformed body) the same logical request is reissued once through a
/// configured public relay proxy that fetches the target URL server-side.
/// The relayed body goes through the same adapter decoder, so a relayed
/// success is indistinguishable from a direct one except via latency. If the
/// relayed attempt also fails, the direct-path error is surfaced as the
/// primary cause. Exactly one fallback attempt, never more.
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use crate::adapters::{HttpMethod, PreparedRequest, SourceAdapter};
use crate::config::Configs;
use crate::errors::{RelayError, RelayResult};
use crate::logger::{self, LogTag};
use crate::types::{Attempt, FetchRequest, Operation, ParameterSet, Payload};

/// How much of an upstream error body to keep in the error message.
const ERROR_BODY_SNIPPET_LEN: usize = 200;

// =============================================================================
// TRANSPORT SEAM
// =============================================================================

#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Executes one prepared request. The production transport is reqwest;
/// tests inject fakes to observe call sequences without a network.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(
        &self,
        request: &PreparedRequest,
        timeout: Duration,
    ) -> RelayResult<TransportResponse>;
}

pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| format!("Failed to create HTTP client: {}", e))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(
        &self,
        request: &PreparedRequest,
        timeout: Duration,
    ) -> RelayResult<TransportResponse> {
        let builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Post => {
                let builder = self.client.post(&request.url);
                match &request.body {
                    Some(body) => builder.json(body),
                    None => builder,
                }
            }
        };

        let response = builder.timeout(timeout).send().await.map_err(|e| {
            if e.is_timeout() {
                RelayError::UpstreamTimeout {
                    endpoint: request.url.clone(),
                    timeout_ms: timeout.as_millis() as u64,
                }
            } else {
                RelayError::upstream(request.url.clone(), format!("request failed: {}", e))
            }
        })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            RelayError::upstream(request.url.clone(), format!("failed to read body: {}", e))
        })?;

        Ok(TransportResponse { status, body })
    }
}

// =============================================================================
// PER-SOURCE FETCH STATS
// =============================================================================

/// Observational counters per source, for monitoring only.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct SourceStats {
    pub requests: u64,
    pub failures: u64,
    pub relayed: u64,
    pub total_latency_ms: f64,
}

impl SourceStats {
    pub fn avg_latency_ms(&self) -> f64 {
        if self.requests == 0 {
            0.0
        } else {
            self.total_latency_ms / self.requests as f64
        }
    }
}

// =============================================================================
// RELAY FALLBACK
// =============================================================================

pub struct RelayFallback {
    transport: Arc<dyn Transport>,
    relay_url: String,
    timeout: Duration,
    stats: RwLock<HashMap<String, SourceStats>>,
}

impl RelayFallback {
    pub fn new(transport: Arc<dyn Transport>, relay_url: String, timeout: Duration) -> Self {
        Self {
            transport,
            relay_url,
            timeout,
            stats: RwLock::new(HashMap::new()),
        }
    }

    pub fn from_configs(configs: &Configs) -> Result<Self, String> {
        Ok(Self::new(
            Arc::new(HttpTransport::new()?),
            configs.relay_url.clone(),
            Duration::from_secs(configs.request_timeout_secs),
        ))
    }

    /// Fetch one logical request: direct attempt, then at most one relayed
    /// attempt. Marks the request `Relayed` when it falls back.
    pub async fn fetch(
        &self,
        adapter: &dyn SourceAdapter,
        request: &mut FetchRequest,
    ) -> RelayResult<Payload> {
        let operation = request.category.operation().ok_or_else(|| {
            RelayError::invalid_parameters(format!(
                "category '{}' has no upstream operation",
                request.category
            ))
        })?;

        let prepared = adapter.prepare(operation, &request.parameters)?;
        let start = Instant::now();

        let direct = self
            .attempt(adapter, operation, &request.parameters, &prepared)
            .await;

        let result = match direct {
            Ok(payload) => Ok(payload),
            Err(direct_err) if direct_err.is_retriable() => {
                logger::warning(
                    LogTag::Relay,
                    &format!(
                        "direct fetch failed for {} {} ({}), retrying via relay",
                        request.source_id, request.category, direct_err
                    ),
                );

                request.attempt = Attempt::Relayed;
                let relayed = self.wrap_for_relay(&prepared);
                match self
                    .attempt(adapter, operation, &request.parameters, &relayed)
                    .await
                {
                    Ok(payload) => Ok(payload),
                    Err(relay_err) => Err(RelayError::RelayExhausted {
                        primary: Box::new(direct_err),
                        relay: Box::new(relay_err),
                    }),
                }
            }
            Err(direct_err) => Err(direct_err),
        };

        self.record(request, start.elapsed(), result.is_err());
        result
    }

    /// Execute one prepared request and decode it with the adapter. Non-2xx
    /// statuses become upstream errors carrying a body snippet.
    async fn attempt(
        &self,
        adapter: &dyn SourceAdapter,
        operation: Operation,
        parameters: &ParameterSet,
        prepared: &PreparedRequest,
    ) -> RelayResult<Payload> {
        let response = self.transport.execute(prepared, self.timeout).await?;

        if !(200..300).contains(&response.status) {
            let snippet: String = response.body.chars().take(ERROR_BODY_SNIPPET_LEN).collect();
            return Err(RelayError::UpstreamError {
                endpoint: prepared.url.clone(),
                status: Some(response.status),
                message: format!("http {}: {}", response.status, snippet),
            });
        }

        adapter.decode(operation, parameters, &response.body)
    }

    /// Wrap the original fully-qualified URL as a single `url` parameter on
    /// the relay endpoint; method and JSON body are preserved.
    fn wrap_for_relay(&self, original: &PreparedRequest) -> PreparedRequest {
        let encoded: String = url::form_urlencoded::byte_serialize(original.url.as_bytes()).collect();
        let separator = if self.relay_url.contains('?') { '&' } else { '?' };
        PreparedRequest {
            method: original.method,
            url: format!("{}{}url={}", self.relay_url, separator, encoded),
            body: original.body.clone(),
        }
    }

    fn record(&self, request: &FetchRequest, elapsed: Duration, failed: bool) {
        if let Ok(mut stats) = self.stats.write() {
            let entry = stats.entry(request.source_id.clone()).or_default();
            entry.requests += 1;
            entry.total_latency_ms += elapsed.as_millis() as f64;
            if request.attempt == Attempt::Relayed {
                entry.relayed += 1;
            }
            if failed {
                entry.failures += 1;
            }
        }
    }

    /// Snapshot of per-source stats.
    pub fn stats(&self) -> HashMap<String, SourceStats> {
        self.stats
            .read()
            .map(|s| s.clone())
            .unwrap_or_default()
    }
}

/// Canned-response transport for tests, shared with the dispatcher's tests.
#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    pub(crate) const GATEIO_TICKER_BODY: &str = r#"[{
        "currency_pair": "BTC_USDT",
        "last": "65000.5",
        "high_24h": "66000",
        "low_24h": "64000",
        "base_volume": "1234.5"
    }]"#;

    /// Records every URL it is asked to hit and replays queued responses.
    pub(crate) struct FakeTransport {
        responses: Mutex<VecDeque<RelayResult<TransportResponse>>>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeTransport {
        pub(crate) fn new(responses: Vec<RelayResult<TransportResponse>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub(crate) fn ok(body: &str) -> RelayResult<TransportResponse> {
            Ok(TransportResponse {
                status: 200,
                body: body.to_string(),
            })
        }

        pub(crate) fn http_error(status: u16) -> RelayResult<TransportResponse> {
            Ok(TransportResponse {
                status,
                body: "upstream unhappy".to_string(),
            })
        }

        pub(crate) fn network_error() -> RelayResult<TransportResponse> {
            Err(RelayError::upstream("direct", "connection reset"))
        }
    }

    #[async_trait]
    impl Transport for FakeTransport {
        async fn execute(
            &self,
            request: &PreparedRequest,
            _timeout: Duration,
        ) -> RelayResult<TransportResponse> {
            self.calls.lock().unwrap().push(request.url.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected transport call")
        }
    }
}
