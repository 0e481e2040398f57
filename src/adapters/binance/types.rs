/// Raw Binance response shapes, trimmed to the fields the normalizer reads
///
/// Prices and quantities arrive as strings, timestamps and ids as numbers.
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct BinanceExchangeInfoRaw {
    pub symbols: Vec<BinanceSymbolRaw>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BinanceSymbolRaw {
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceTicker24hRaw {
    pub last_price: String,
    pub high_price: String,
    pub low_price: String,
    pub volume: String,
    pub close_time: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BinanceDepthRaw {
    pub bids: Vec<Vec<String>>,
    pub asks: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinanceTradeRaw {
    pub id: u64,
    pub price: String,
    pub qty: String,
    pub time: i64,
    pub is_buyer_maker: bool,
}
