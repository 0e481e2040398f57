/// Upstream source adapters
///
/// One adapter per upstream family, each translating a normalized request
/// into the upstream's call convention (REST path shape, JSON-RPC envelope,
/// per-venue symbol formatting) and translating the raw response back into a
/// normalized payload. Construction is side-effect-free; the network call
/// itself happens in the relay transport, with the fixed per-call timeout.
use serde_json::Value;

use crate::errors::{RelayError, RelayResult};
use crate::types::{Operation, ParameterSet, Payload};

pub mod ankr;
pub mod binance;
pub mod gateio;
pub mod okx;
pub mod registry;
pub mod reservoir;

// =============================================================================
// DESCRIPTOR & PREPARED REQUEST
// =============================================================================

/// Identity and declared capabilities of one upstream source. Immutable
/// after registry construction.
#[derive(Debug, Clone)]
pub struct SourceDescriptor {
    pub id: &'static str,
    pub base_endpoint: &'static str,
    pub capabilities: &'static [Operation],
}

impl SourceDescriptor {
    pub fn supports(&self, operation: Operation) -> bool {
        self.capabilities.contains(&operation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// An upstream call ready for execution by any transport, direct or relayed.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub body: Option<Value>,
}

impl PreparedRequest {
    pub fn get(url: String) -> Self {
        Self {
            method: HttpMethod::Get,
            url,
            body: None,
        }
    }

    pub fn post(url: String, body: Value) -> Self {
        Self {
            method: HttpMethod::Post,
            url,
            body: Some(body),
        }
    }
}

// =============================================================================
// ADAPTER TRAIT
// =============================================================================

/// One polymorphic unit per upstream. `prepare` validates parameters and
/// builds the wire request without touching the network; `decode` turns a raw
/// response body into the normalized payload. The relay feeds relayed bodies
/// through the same `decode`, so callers cannot tell direct from relayed
/// success except via latency.
pub trait SourceAdapter: Send + Sync {
    fn descriptor(&self) -> &SourceDescriptor;

    fn prepare(&self, operation: Operation, parameters: &ParameterSet)
        -> RelayResult<PreparedRequest>;

    fn decode(
        &self,
        operation: Operation,
        parameters: &ParameterSet,
        raw: &str,
    ) -> RelayResult<Payload>;

    fn supports(&self, operation: Operation) -> bool {
        self.descriptor().supports(operation)
    }
}

// =============================================================================
// SHARED PARSING HELPERS
// =============================================================================

/// Split a `BASE/QUOTE` symbol into its uppercased parts.
pub(crate) fn parse_symbol(symbol: &str) -> RelayResult<(String, String)> {
    let mut parts = symbol.split('/');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(base), Some(quote), None) if !base.is_empty() && !quote.is_empty() => {
            Ok((base.to_uppercase(), quote.to_uppercase()))
        }
        _ => Err(RelayError::invalid_parameters(format!(
            "symbol '{}' is not in BASE/QUOTE form",
            symbol
        ))),
    }
}

/// Positive integer parameter with a default and an upper bound.
pub(crate) fn parse_limit(
    parameters: &ParameterSet,
    default: u32,
    max: u32,
) -> RelayResult<u32> {
    match parameters.get("limit") {
        None => Ok(default),
        Some(raw) => {
            let limit: u32 = raw.parse().map_err(|_| {
                RelayError::invalid_parameters(format!("limit '{}' is not a positive integer", raw))
            })?;
            if limit == 0 || limit > max {
                return Err(RelayError::invalid_parameters(format!(
                    "limit must be between 1 and {}",
                    max
                )));
            }
            Ok(limit)
        }
    }
}

/// Optional `since` parameter, ms since epoch.
pub(crate) fn parse_since(parameters: &ParameterSet) -> RelayResult<Option<i64>> {
    match parameters.get("since") {
        None => Ok(None),
        Some(raw) => raw
            .parse::<i64>()
            .map(Some)
            .map_err(|_| {
                RelayError::invalid_parameters(format!(
                    "since '{}' is not a millisecond timestamp",
                    raw
                ))
            }),
    }
}

/// Numeric field that the upstream serializes as a string.
pub(crate) fn parse_num(source: &str, what: &str, raw: &str) -> RelayResult<f64> {
    raw.parse().map_err(|_| {
        RelayError::upstream(source, format!("non-numeric {}: '{}'", what, raw))
    })
}

/// Pull an f64 out of a JSON value that may be a number or a numeric string.
/// Upstreams disagree on which; the normalized payloads always carry numbers.
pub(crate) fn value_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

pub(crate) fn value_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Indexed cell access for candle-row arrays, with a decode error naming the
/// source when the cell is missing or non-numeric.
pub(crate) fn cell_f64(source: &str, row: &[Value], index: usize) -> RelayResult<f64> {
    row.get(index).and_then(value_f64).ok_or_else(|| {
        RelayError::upstream(
            source,
            format!("malformed candle row: missing numeric cell {}", index),
        )
    })
}

pub(crate) fn cell_i64(source: &str, row: &[Value], index: usize) -> RelayResult<i64> {
    row.get(index).and_then(value_i64).ok_or_else(|| {
        RelayError::upstream(
            source,
            format!("malformed candle row: missing numeric cell {}", index),
        )
    })
}
