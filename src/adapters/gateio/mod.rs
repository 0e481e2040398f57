/// Gate.io spot API adapter
///
/// API Documentation: https://www.gate.io/docs/developers/apiv4
///
/// Endpoints used:
/// 1. /spot/currency_pairs - tradable pair listing (exchange info)
/// 2. /spot/tickers?currency_pair= - 24h ticker
/// 3. /spot/candlesticks - OHLCV series
/// 4. /spot/order_book - depth snapshot
/// 5. /spot/trades - recent public trades
///
/// Symbol convention: `BTC/USDT` -> `BTC_USDT`. Candle rows are string
/// arrays ordered [ts, quote_volume, close, high, low, open, base_volume].
pub mod types;

use chrono::Utc;
use serde_json::Value;

use crate::adapters::{
    cell_f64, cell_i64, parse_limit, parse_num, parse_since, parse_symbol, PreparedRequest,
    SourceAdapter, SourceDescriptor,
};
use crate::errors::{RelayError, RelayResult};
use crate::types::{
    BookLevel, Candle, ExchangeInfo, Operation, OrderBook, ParameterSet, Payload, Ticker, Trade,
    TradeSide,
};

use self::types::{GateioCurrencyPairRaw, GateioOrderBookRaw, GateioTickerRaw, GateioTradeRaw};

const SOURCE_ID: &str = "gateio";
const BASE_URL: &str = "https://api.gateio.ws/api/v4";

const TIMEFRAMES: &[&str] = &["1m", "5m", "15m", "30m", "1h", "4h", "8h", "1d", "7d"];

const CAPABILITIES: &[Operation] = &[
    Operation::ExchangeInfo,
    Operation::Ticker,
    Operation::Candles,
    Operation::OrderBook,
    Operation::Trades,
];

static DESCRIPTOR: SourceDescriptor = SourceDescriptor {
    id: SOURCE_ID,
    base_endpoint: BASE_URL,
    capabilities: CAPABILITIES,
};

pub struct GateioAdapter;

impl GateioAdapter {
    pub fn new() -> Self {
        Self
    }

    fn format_symbol(symbol: &str) -> RelayResult<String> {
        let (base, quote) = parse_symbol(symbol)?;
        Ok(format!("{}_{}", base, quote))
    }

    fn check_timeframe(timeframe: &str) -> RelayResult<&str> {
        if TIMEFRAMES.contains(&timeframe) {
            Ok(timeframe)
        } else {
            Err(RelayError::invalid_parameters(format!(
                "gateio does not support timeframe '{}'",
                timeframe
            )))
        }
    }

    fn decode_exchange_info(raw: &str) -> RelayResult<Payload> {
        let pairs: Vec<GateioCurrencyPairRaw> = serde_json::from_str(raw)
            .map_err(|e| RelayError::upstream(SOURCE_ID, format!("malformed pair list: {}", e)))?;

        let markets_count = pairs
            .iter()
            .filter(|p| p.trade_status == "tradable" || p.trade_status.is_empty())
            .count();

        Ok(Payload::ExchangeInfo(ExchangeInfo {
            source: SOURCE_ID.to_string(),
            name: "Gate.io".to_string(),
            markets_count,
            timeframes: TIMEFRAMES.iter().map(|t| t.to_string()).collect(),
        }))
    }

    fn decode_ticker(raw: &str, symbol: &str) -> RelayResult<Payload> {
        let tickers: Vec<GateioTickerRaw> = serde_json::from_str(raw)
            .map_err(|e| RelayError::upstream(SOURCE_ID, format!("malformed ticker: {}", e)))?;
        let ticker = tickers
            .into_iter()
            .next()
            .ok_or_else(|| RelayError::upstream(SOURCE_ID, "empty ticker response"))?;

        Ok(Payload::Ticker(Ticker {
            source: SOURCE_ID.to_string(),
            symbol: symbol.to_string(),
            price: parse_num(SOURCE_ID, "last", &ticker.last)?,
            high: parse_num(SOURCE_ID, "high_24h", &ticker.high_24h)?,
            low: parse_num(SOURCE_ID, "low_24h", &ticker.low_24h)?,
            volume: parse_num(SOURCE_ID, "base_volume", &ticker.base_volume)?,
            // Gate's ticker carries no timestamp; stamp at decode time
            timestamp: Utc::now().timestamp_millis(),
        }))
    }

    fn decode_candles(raw: &str) -> RelayResult<Payload> {
        let rows: Vec<Vec<Value>> = serde_json::from_str(raw)
            .map_err(|e| RelayError::upstream(SOURCE_ID, format!("malformed candles: {}", e)))?;

        let mut candles = Vec::with_capacity(rows.len());
        for row in &rows {
            candles.push(Candle {
                // Gate timestamps are in seconds
                timestamp: cell_i64(SOURCE_ID, row, 0)? * 1000,
                open: cell_f64(SOURCE_ID, row, 5)?,
                high: cell_f64(SOURCE_ID, row, 3)?,
                low: cell_f64(SOURCE_ID, row, 4)?,
                close: cell_f64(SOURCE_ID, row, 2)?,
                volume: cell_f64(SOURCE_ID, row, 6)?,
            });
        }
        Ok(Payload::Candles(candles))
    }

    fn decode_order_book(raw: &str, symbol: &str) -> RelayResult<Payload> {
        let book: GateioOrderBookRaw = serde_json::from_str(raw)
            .map_err(|e| RelayError::upstream(SOURCE_ID, format!("malformed order book: {}", e)))?;

        Ok(Payload::OrderBook(OrderBook {
            source: SOURCE_ID.to_string(),
            symbol: symbol.to_string(),
            timestamp: book.current.unwrap_or_else(|| Utc::now().timestamp_millis()),
            bids: Self::decode_levels("bids", &book.bids)?,
            asks: Self::decode_levels("asks", &book.asks)?,
        }))
    }

    fn decode_levels(side: &str, levels: &[Vec<String>]) -> RelayResult<Vec<BookLevel>> {
        levels
            .iter()
            .map(|level| match level.as_slice() {
                [price, amount, ..] => Ok(BookLevel {
                    price: parse_num(SOURCE_ID, side, price)?,
                    amount: parse_num(SOURCE_ID, side, amount)?,
                }),
                _ => Err(RelayError::upstream(
                    SOURCE_ID,
                    format!("malformed {} level", side),
                )),
            })
            .collect()
    }

    fn decode_trades(raw: &str) -> RelayResult<Payload> {
        let trades: Vec<GateioTradeRaw> = serde_json::from_str(raw)
            .map_err(|e| RelayError::upstream(SOURCE_ID, format!("malformed trades: {}", e)))?;

        let mut out = Vec::with_capacity(trades.len());
        for trade in trades {
            let timestamp = match &trade.create_time_ms {
                Some(ms) => parse_num(SOURCE_ID, "create_time_ms", ms)? as i64,
                None => parse_num(SOURCE_ID, "create_time", &trade.create_time)? as i64 * 1000,
            };
            let side = match trade.side.as_str() {
                "buy" => TradeSide::Buy,
                "sell" => TradeSide::Sell,
                other => {
                    return Err(RelayError::upstream(
                        SOURCE_ID,
                        format!("unknown trade side '{}'", other),
                    ))
                }
            };
            out.push(Trade {
                id: Some(trade.id),
                timestamp,
                side,
                price: parse_num(SOURCE_ID, "price", &trade.price)?,
                amount: parse_num(SOURCE_ID, "amount", &trade.amount)?,
            });
        }
        Ok(Payload::Trades(out))
    }
}

impl SourceAdapter for GateioAdapter {
    fn descriptor(&self) -> &SourceDescriptor {
        &DESCRIPTOR
    }

    fn prepare(
        &self,
        operation: Operation,
        parameters: &ParameterSet,
    ) -> RelayResult<PreparedRequest> {
        match operation {
            Operation::ExchangeInfo => Ok(PreparedRequest::get(format!(
                "{}/spot/currency_pairs",
                BASE_URL
            ))),
            Operation::Ticker => {
                let pair = Self::format_symbol(parameters.require("symbol")?)?;
                Ok(PreparedRequest::get(format!(
                    "{}/spot/tickers?currency_pair={}",
                    BASE_URL, pair
                )))
            }
            Operation::Candles => {
                let pair = Self::format_symbol(parameters.require("symbol")?)?;
                let interval = Self::check_timeframe(parameters.get("timeframe").unwrap_or("1h"))?;
                let limit = parse_limit(parameters, 100, 1000)?;
                let mut url = format!(
                    "{}/spot/candlesticks?currency_pair={}&interval={}&limit={}",
                    BASE_URL, pair, interval, limit
                );
                if let Some(since) = parse_since(parameters)? {
                    // Gate expects seconds
                    url.push_str(&format!("&from={}", since / 1000));
                }
                Ok(PreparedRequest::get(url))
            }
            Operation::OrderBook => {
                let pair = Self::format_symbol(parameters.require("symbol")?)?;
                let limit = parse_limit(parameters, 20, 100)?;
                Ok(PreparedRequest::get(format!(
                    "{}/spot/order_book?currency_pair={}&limit={}",
                    BASE_URL, pair, limit
                )))
            }
            Operation::Trades => {
                let pair = Self::format_symbol(parameters.require("symbol")?)?;
                let limit = parse_limit(parameters, 100, 1000)?;
                Ok(PreparedRequest::get(format!(
                    "{}/spot/trades?currency_pair={}&limit={}",
                    BASE_URL, pair, limit
                )))
            }
            _ => Err(RelayError::UnsupportedOperation {
                source_id: SOURCE_ID.to_string(),
                operation,
            }),
        }
    }

    fn decode(
        &self,
        operation: Operation,
        parameters: &ParameterSet,
        raw: &str,
    ) -> RelayResult<Payload> {
        let symbol = parameters.get("symbol").unwrap_or_default();
        match operation {
            Operation::ExchangeInfo => Self::decode_exchange_info(raw),
            Operation::Ticker => Self::decode_ticker(raw, symbol),
            Operation::Candles => Self::decode_candles(raw),
            Operation::OrderBook => Self::decode_order_book(raw, symbol),
            Operation::Trades => Self::decode_trades(raw),
            _ => Err(RelayError::UnsupportedOperation {
                source_id: SOURCE_ID.to_string(),
                operation,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticker_params() -> ParameterSet {
        ParameterSet::from_pairs([("symbol", "BTC/USDT")])
    }

    #[test]
    fn test_symbol_formatting() {
        assert_eq!(GateioAdapter::format_symbol("BTC/USDT").unwrap(), "BTC_USDT");
        assert!(GateioAdapter::format_symbol("BTCUSDT").is_err());
    }

    #[test]
    fn test_prepare_ticker_url() {
        let adapter = GateioAdapter::new();
        let request = adapter.prepare(Operation::Ticker, &ticker_params()).unwrap();
        assert_eq!(
            request.url,
            "https://api.gateio.ws/api/v4/spot/tickers?currency_pair=BTC_USDT"
        );
        assert!(request.body.is_none());
    }

    #[test]
    fn test_prepare_candles_converts_since_to_seconds() {
        let adapter = GateioAdapter::new();
        let params = ParameterSet::from_pairs([
            ("symbol", "ETH/USDT"),
            ("timeframe", "1m"),
            ("limit", "10"),
            ("since", "1700000000000"),
        ]);
        let request = adapter.prepare(Operation::Candles, &params).unwrap();
        assert!(request.url.contains("interval=1m"));
        assert!(request.url.contains("from=1700000000"));
    }

    #[test]
    fn test_prepare_rejects_unknown_timeframe() {
        let adapter = GateioAdapter::new();
        let params = ParameterSet::from_pairs([("symbol", "BTC/USDT"), ("timeframe", "3h")]);
        assert!(matches!(
            adapter.prepare(Operation::Candles, &params),
            Err(RelayError::InvalidParameters { .. })
        ));
    }

    #[test]
    fn test_prepare_unsupported_operation() {
        let adapter = GateioAdapter::new();
        assert!(matches!(
            adapter.prepare(Operation::ChainBalance, &ParameterSet::new()),
            Err(RelayError::UnsupportedOperation { .. })
        ));
    }

    #[test]
    fn test_decode_ticker() {
        let adapter = GateioAdapter::new();
        let raw = r#"[{
            "currency_pair": "BTC_USDT",
            "last": "65000.5",
            "lowest_ask": "65001",
            "highest_bid": "65000",
            "high_24h": "66000",
            "low_24h": "64000",
            "base_volume": "1234.5",
            "quote_volume": "80000000"
        }]"#;

        match adapter.decode(Operation::Ticker, &ticker_params(), raw).unwrap() {
            Payload::Ticker(ticker) => {
                assert_eq!(ticker.source, "gateio");
                assert_eq!(ticker.symbol, "BTC/USDT");
                assert_eq!(ticker.price, 65000.5);
                assert_eq!(ticker.high, 66000.0);
                assert_eq!(ticker.low, 64000.0);
                assert_eq!(ticker.volume, 1234.5);
                assert!(ticker.timestamp > 0);
            }
            other => panic!("expected ticker payload, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_candles_reorders_fields() {
        let adapter = GateioAdapter::new();
        // [ts, quote_volume, close, high, low, open, base_volume]
        let raw = r#"[
            ["1700000000", "500000", "100.5", "101.0", "99.0", "100.0", "5000"],
            ["1700000060", "600000", "101.5", "102.0", "100.5", "100.5", "6000"]
        ]"#;

        match adapter.decode(Operation::Candles, &ticker_params(), raw).unwrap() {
            Payload::Candles(candles) => {
                assert_eq!(candles.len(), 2);
                assert_eq!(candles[0].timestamp, 1_700_000_000_000);
                assert_eq!(candles[0].open, 100.0);
                assert_eq!(candles[0].high, 101.0);
                assert_eq!(candles[0].low, 99.0);
                assert_eq!(candles[0].close, 100.5);
                assert_eq!(candles[0].volume, 5000.0);
            }
            other => panic!("expected candles payload, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_order_book() {
        let adapter = GateioAdapter::new();
        let raw = r#"{
            "current": 1700000000123,
            "update": 1700000000100,
            "bids": [["64999.5", "0.5"], ["64998.0", "1.2"]],
            "asks": [["65001.0", "0.8"]]
        }"#;

        match adapter.decode(Operation::OrderBook, &ticker_params(), raw).unwrap() {
            Payload::OrderBook(book) => {
                assert_eq!(book.timestamp, 1_700_000_000_123);
                assert_eq!(book.bids.len(), 2);
                assert_eq!(book.bids[0].price, 64999.5);
                assert_eq!(book.asks[0].amount, 0.8);
            }
            other => panic!("expected order book payload, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_trades() {
        let adapter = GateioAdapter::new();
        let raw = r#"[{
            "id": "5736713",
            "create_time": "1700000000",
            "create_time_ms": "1700000000016.228",
            "side": "sell",
            "amount": "0.25",
            "price": "65000.0"
        }]"#;

        match adapter.decode(Operation::Trades, &ticker_params(), raw).unwrap() {
            Payload::Trades(trades) => {
                assert_eq!(trades.len(), 1);
                assert_eq!(trades[0].id.as_deref(), Some("5736713"));
                assert_eq!(trades[0].side, TradeSide::Sell);
                assert_eq!(trades[0].timestamp, 1_700_000_000_016);
                assert_eq!(trades[0].amount, 0.25);
            }
            other => panic!("expected trades payload, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_malformed_body_is_upstream_error() {
        let adapter = GateioAdapter::new();
        let err = adapter
            .decode(Operation::Ticker, &ticker_params(), "<html>blocked</html>")
            .unwrap_err();
        assert!(matches!(err, RelayError::UpstreamError { .. }));
        assert!(err.is_retriable());
    }
}
