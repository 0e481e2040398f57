/// Raw OKX response shapes
///
/// Every v5 response is wrapped in a `{code, msg, data}` envelope; `code`
/// other than "0" signals an upstream error even under HTTP 200.
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::errors::{RelayError, RelayResult};

#[derive(Debug, Clone, Deserialize)]
pub struct OkxEnvelope<T> {
    pub code: String,
    #[serde(default)]
    pub msg: String,
    pub data: Vec<T>,
}

impl<T: DeserializeOwned> OkxEnvelope<T> {
    /// Parse an envelope and unwrap its data, surfacing OKX-level errors.
    pub fn unwrap_data(source: &str, raw: &str) -> RelayResult<Vec<T>> {
        let envelope: OkxEnvelope<T> = serde_json::from_str(raw)
            .map_err(|e| RelayError::upstream(source, format!("malformed response: {}", e)))?;

        if envelope.code != "0" {
            return Err(RelayError::upstream(
                source,
                format!("okx error code {}: {}", envelope.code, envelope.msg),
            ));
        }
        Ok(envelope.data)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OkxInstrumentRaw {
    #[serde(default)]
    pub state: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OkxTickerRaw {
    pub last: String,
    pub high24h: String,
    pub low24h: String,
    pub vol24h: String,
    pub ts: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OkxBookRaw {
    pub bids: Vec<Vec<String>>,
    pub asks: Vec<Vec<String>>,
    pub ts: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OkxTradeRaw {
    pub trade_id: String,
    pub px: String,
    pub sz: String,
    pub side: String,
    pub ts: String,
}
