/// Raw Gate.io response shapes, trimmed to the fields the normalizer reads
///
/// Gate serializes almost every numeric field as a string; candle rows are
/// heterogeneous arrays handled in the decoder.
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct GateioCurrencyPairRaw {
    #[serde(default)]
    pub trade_status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GateioTickerRaw {
    pub last: String,
    pub high_24h: String,
    pub low_24h: String,
    pub base_volume: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GateioOrderBookRaw {
    /// Server timestamp in ms.
    #[serde(default)]
    pub current: Option<i64>,
    pub bids: Vec<Vec<String>>,
    pub asks: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GateioTradeRaw {
    pub id: String,
    pub create_time: String,
    /// Millisecond precision variant of `create_time`, e.g. "1613712424.016".
    #[serde(default)]
    pub create_time_ms: Option<String>,
    pub side: String,
    pub amount: String,
    pub price: String,
}
