/// OKX v5 API adapter
///
/// API Documentation: https://www.okx.com/docs-v5/en/
///
/// Endpoints used:
/// 1. /public/instruments?instType=SPOT - tradable instrument listing
/// 2. /market/ticker?instId= - 24h ticker
/// 3. /market/candles - OHLCV series (returned newest-first)
/// 4. /market/books - depth snapshot
/// 5. /market/trades - recent public trades
///
/// Symbol convention: `BTC/USDT` -> `BTC-USDT`. Hour/day bars are upcased
/// (`1h` -> `1H`). Candle series are reversed to oldest-first on decode.
pub mod types;

use serde_json::Value;

use crate::adapters::{
    parse_limit, parse_num, parse_since, parse_symbol, PreparedRequest, SourceAdapter,
    SourceDescriptor,
};
use crate::errors::{RelayError, RelayResult};
use crate::types::{
    BookLevel, Candle, ExchangeInfo, Operation, OrderBook, ParameterSet, Payload, Ticker, Trade,
    TradeSide,
};

use self::types::{OkxBookRaw, OkxEnvelope, OkxInstrumentRaw, OkxTickerRaw, OkxTradeRaw};

const SOURCE_ID: &str = "okx";
const BASE_URL: &str = "https://www.okx.com/api/v5";

/// Accepted inbound timeframes; mapped to OKX bar names in `map_timeframe`.
const TIMEFRAMES: &[&str] = &[
    "1m", "3m", "5m", "15m", "30m", "1h", "2h", "4h", "6h", "12h", "1d", "1w",
];

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

pub struct OkxAdapter;

impl OkxAdapter {
    pub fn new() -> Self {
        Self
    }

    fn format_symbol(symbol: &str) -> RelayResult<String> {
        let (base, quote) = parse_symbol(symbol)?;
        Ok(format!("{}-{}", base, quote))
    }

    /// OKX bar names upcase the unit for hours and above: 1h -> 1H, 1d -> 1D.
    fn map_timeframe(timeframe: &str) -> RelayResult<String> {
        if !TIMEFRAMES.contains(&timeframe) {
            return Err(RelayError::invalid_parameters(format!(
                "okx does not support timeframe '{}'",
                timeframe
            )));
        }
        if timeframe.ends_with('m') {
            Ok(timeframe.to_string())
        } else {
            Ok(timeframe.to_uppercase())
        }
    }

    fn decode_exchange_info(raw: &str) -> RelayResult<Payload> {
        let instruments: Vec<OkxInstrumentRaw> = OkxEnvelope::unwrap_data(SOURCE_ID, raw)?;

        let markets_count = instruments
            .iter()
            .filter(|i| i.state == "live" || i.state.is_empty())
            .count();

        Ok(Payload::ExchangeInfo(ExchangeInfo {
            source: SOURCE_ID.to_string(),
            name: "OKX".to_string(),
            markets_count,
            timeframes: TIMEFRAMES.iter().map(|t| t.to_string()).collect(),
        }))
    }

    fn decode_ticker(raw: &str, symbol: &str) -> RelayResult<Payload> {
        let tickers: Vec<OkxTickerRaw> = OkxEnvelope::unwrap_data(SOURCE_ID, raw)?;
        let ticker = tickers
            .into_iter()
            .next()
            .ok_or_else(|| RelayError::upstream(SOURCE_ID, "empty ticker data"))?;

        Ok(Payload::Ticker(Ticker {
            source: SOURCE_ID.to_string(),
            symbol: symbol.to_string(),
            price: parse_num(SOURCE_ID, "last", &ticker.last)?,
            high: parse_num(SOURCE_ID, "high24h", &ticker.high24h)?,
            low: parse_num(SOURCE_ID, "low24h", &ticker.low24h)?,
            volume: parse_num(SOURCE_ID, "vol24h", &ticker.vol24h)?,
            timestamp: parse_num(SOURCE_ID, "ts", &ticker.ts)? as i64,
        }))
    }

    fn decode_candles(raw: &str) -> RelayResult<Payload> {
        let rows: Vec<Vec<Value>> = OkxEnvelope::unwrap_data(SOURCE_ID, raw)?;

        let mut candles = Vec::with_capacity(rows.len());
        // OKX returns newest-first; normalize to oldest-first
        for row in rows.iter().rev() {
            let cell = |index: usize| -> RelayResult<&str> {
                row.get(index).and_then(Value::as_str).ok_or_else(|| {
                    RelayError::upstream(
                        SOURCE_ID,
                        format!("malformed candle row: missing cell {}", index),
                    )
                })
            };
            candles.push(Candle {
                timestamp: parse_num(SOURCE_ID, "ts", cell(0)?)? as i64,
                open: parse_num(SOURCE_ID, "open", cell(1)?)?,
                high: parse_num(SOURCE_ID, "high", cell(2)?)?,
                low: parse_num(SOURCE_ID, "low", cell(3)?)?,
                close: parse_num(SOURCE_ID, "close", cell(4)?)?,
                volume: parse_num(SOURCE_ID, "vol", cell(5)?)?,
            });
        }
        Ok(Payload::Candles(candles))
    }

    fn decode_order_book(raw: &str, symbol: &str) -> RelayResult<Payload> {
        let books: Vec<OkxBookRaw> = OkxEnvelope::unwrap_data(SOURCE_ID, raw)?;
        let book = books
            .into_iter()
            .next()
            .ok_or_else(|| RelayError::upstream(SOURCE_ID, "empty order book data"))?;

        Ok(Payload::OrderBook(OrderBook {
            source: SOURCE_ID.to_string(),
            symbol: symbol.to_string(),
            timestamp: parse_num(SOURCE_ID, "ts", &book.ts)? as i64,
            bids: Self::decode_levels("bids", &book.bids)?,
            asks: Self::decode_levels("asks", &book.asks)?,
        }))
    }

    fn decode_levels(side: &str, levels: &[Vec<String>]) -> RelayResult<Vec<BookLevel>> {
        levels
            .iter()
            .map(|level| match level.as_slice() {
                [price, size, ..] => Ok(BookLevel {
                    price: parse_num(SOURCE_ID, side, price)?,
                    amount: parse_num(SOURCE_ID, side, size)?,
                }),
                _ => Err(RelayError::upstream(
                    SOURCE_ID,
                    format!("malformed {} level", side),
                )),
            })
            .collect()
    }

    fn decode_trades(raw: &str) -> RelayResult<Payload> {
        let trades: Vec<OkxTradeRaw> = OkxEnvelope::unwrap_data(SOURCE_ID, raw)?;

        let mut out = Vec::with_capacity(trades.len());
        for trade in trades {
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
                id: Some(trade.trade_id),
                timestamp: parse_num(SOURCE_ID, "ts", &trade.ts)? as i64,
                side,
                price: parse_num(SOURCE_ID, "px", &trade.px)?,
                amount: parse_num(SOURCE_ID, "sz", &trade.sz)?,
            });
        }
        Ok(Payload::Trades(out))
    }
}

impl SourceAdapter for OkxAdapter {
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
                "{}/public/instruments?instType=SPOT",
                BASE_URL
            ))),
            Operation::Ticker => {
                let inst_id = Self::format_symbol(parameters.require("symbol")?)?;
                Ok(PreparedRequest::get(format!(
                    "{}/market/ticker?instId={}",
                    BASE_URL, inst_id
                )))
            }
            Operation::Candles => {
                let inst_id = Self::format_symbol(parameters.require("symbol")?)?;
                let bar = Self::map_timeframe(parameters.get("timeframe").unwrap_or("1h"))?;
                let limit = parse_limit(parameters, 100, 300)?;
                let mut url = format!(
                    "{}/market/candles?instId={}&bar={}&limit={}",
                    BASE_URL, inst_id, bar, limit
                );
                if let Some(since) = parse_since(parameters)? {
                    // "before" asks for records newer than the timestamp
                    url.push_str(&format!("&before={}", since));
                }
                Ok(PreparedRequest::get(url))
            }
            Operation::OrderBook => {
                let inst_id = Self::format_symbol(parameters.require("symbol")?)?;
                let limit = parse_limit(parameters, 20, 400)?;
                Ok(PreparedRequest::get(format!(
                    "{}/market/books?instId={}&sz={}",
                    BASE_URL, inst_id, limit
                )))
            }
            Operation::Trades => {
                let inst_id = Self::format_symbol(parameters.require("symbol")?)?;
                let limit = parse_limit(parameters, 100, 500)?;
                Ok(PreparedRequest::get(format!(
                    "{}/market/trades?instId={}&limit={}",
                    BASE_URL, inst_id, limit
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
