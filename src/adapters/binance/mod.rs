/// Binance spot API adapter
///
/// API Documentation: https://binance-docs.github.io/apidocs/spot/en/
///
/// Endpoints used:
/// 1. /exchangeInfo - tradable symbol listing (exchange info)
/// 2. /ticker/24hr?symbol= - 24h ticker
/// 3. /klines - OHLCV series
/// 4. /depth - depth snapshot
/// 5. /trades - recent public trades
///
/// Symbol convention: `BTC/USDT` -> `BTCUSDT`. Klines are mixed
/// number/string arrays ordered [openTime, open, high, low, close, volume].
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

use self::types::{BinanceDepthRaw, BinanceExchangeInfoRaw, BinanceTicker24hRaw, BinanceTradeRaw};

const SOURCE_ID: &str = "binance";
const BASE_URL: &str = "https://api.binance.com/api/v3";

const TIMEFRAMES: &[&str] = &[
    "1m", "3m", "5m", "15m", "30m", "1h", "2h", "4h", "6h", "8h", "12h", "1d", "3d", "1w", "1M",
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

pub struct BinanceAdapter;

impl BinanceAdapter {
    pub fn new() -> Self {
        Self
    }

    fn format_symbol(symbol: &str) -> RelayResult<String> {
        let (base, quote) = parse_symbol(symbol)?;
        Ok(format!("{}{}", base, quote))
    }

    fn check_timeframe(timeframe: &str) -> RelayResult<&str> {
        if TIMEFRAMES.contains(&timeframe) {
            Ok(timeframe)
        } else {
            Err(RelayError::invalid_parameters(format!(
                "binance does not support timeframe '{}'",
                timeframe
            )))
        }
    }

    fn decode_exchange_info(raw: &str) -> RelayResult<Payload> {
        let info: BinanceExchangeInfoRaw = serde_json::from_str(raw).map_err(|e| {
            RelayError::upstream(SOURCE_ID, format!("malformed exchange info: {}", e))
        })?;

        let markets_count = info
            .symbols
            .iter()
            .filter(|s| s.status == "TRADING" || s.status.is_empty())
            .count();

        Ok(Payload::ExchangeInfo(ExchangeInfo {
            source: SOURCE_ID.to_string(),
            name: "Binance".to_string(),
            markets_count,
            timeframes: TIMEFRAMES.iter().map(|t| t.to_string()).collect(),
        }))
    }

    fn decode_ticker(raw: &str, symbol: &str) -> RelayResult<Payload> {
        let ticker: BinanceTicker24hRaw = serde_json::from_str(raw)
            .map_err(|e| RelayError::upstream(SOURCE_ID, format!("malformed ticker: {}", e)))?;

        Ok(Payload::Ticker(Ticker {
            source: SOURCE_ID.to_string(),
            symbol: symbol.to_string(),
            price: parse_num(SOURCE_ID, "lastPrice", &ticker.last_price)?,
            high: parse_num(SOURCE_ID, "highPrice", &ticker.high_price)?,
            low: parse_num(SOURCE_ID, "lowPrice", &ticker.low_price)?,
            volume: parse_num(SOURCE_ID, "volume", &ticker.volume)?,
            timestamp: ticker.close_time,
        }))
    }

    fn decode_candles(raw: &str) -> RelayResult<Payload> {
        let rows: Vec<Vec<Value>> = serde_json::from_str(raw)
            .map_err(|e| RelayError::upstream(SOURCE_ID, format!("malformed klines: {}", e)))?;

        let mut candles = Vec::with_capacity(rows.len());
        for row in &rows {
            candles.push(Candle {
                timestamp: cell_i64(SOURCE_ID, row, 0)?,
                open: cell_f64(SOURCE_ID, row, 1)?,
                high: cell_f64(SOURCE_ID, row, 2)?,
                low: cell_f64(SOURCE_ID, row, 3)?,
                close: cell_f64(SOURCE_ID, row, 4)?,
                volume: cell_f64(SOURCE_ID, row, 5)?,
            });
        }
        Ok(Payload::Candles(candles))
    }

    fn decode_order_book(raw: &str, symbol: &str) -> RelayResult<Payload> {
        let depth: BinanceDepthRaw = serde_json::from_str(raw)
            .map_err(|e| RelayError::upstream(SOURCE_ID, format!("malformed depth: {}", e)))?;

        Ok(Payload::OrderBook(OrderBook {
            source: SOURCE_ID.to_string(),
            symbol: symbol.to_string(),
            // The depth snapshot carries no timestamp; stamp at decode time
            timestamp: Utc::now().timestamp_millis(),
            bids: Self::decode_levels("bids", &depth.bids)?,
            asks: Self::decode_levels("asks", &depth.asks)?,
        }))
    }

    fn decode_levels(side: &str, levels: &[Vec<String>]) -> RelayResult<Vec<BookLevel>> {
        levels
            .iter()
            .map(|level| match level.as_slice() {
                [price, qty, ..] => Ok(BookLevel {
                    price: parse_num(SOURCE_ID, side, price)?,
                    amount: parse_num(SOURCE_ID, side, qty)?,
                }),
                _ => Err(RelayError::upstream(
                    SOURCE_ID,
                    format!("malformed {} level", side),
                )),
            })
            .collect()
    }

    fn decode_trades(raw: &str) -> RelayResult<Payload> {
        let trades: Vec<BinanceTradeRaw> = serde_json::from_str(raw)
            .map_err(|e| RelayError::upstream(SOURCE_ID, format!("malformed trades: {}", e)))?;

        Ok(Payload::Trades(
            trades
                .into_iter()
                .map(|trade| {
                    Ok(Trade {
                        id: Some(trade.id.to_string()),
                        timestamp: trade.time,
                        // Buyer-is-maker means the taker sold into the bid
                        side: if trade.is_buyer_maker {
                            TradeSide::Sell
                        } else {
                            TradeSide::Buy
                        },
                        price: parse_num(SOURCE_ID, "price", &trade.price)?,
                        amount: parse_num(SOURCE_ID, "qty", &trade.qty)?,
                    })
                })
                .collect::<RelayResult<Vec<_>>>()?,
        ))
    }
}

impl SourceAdapter for BinanceAdapter {
    fn descriptor(&self) -> &SourceDescriptor {
        &DESCRIPTOR
    }

    fn prepare(
        &self,
        operation: Operation,
        parameters: &ParameterSet,
    ) -> RelayResult<PreparedRequest> {
        match operation {
            Operation::ExchangeInfo => {
                Ok(PreparedRequest::get(format!("{}/exchangeInfo", BASE_URL)))
            }
            Operation::Ticker => {
                let symbol = Self::format_symbol(parameters.require("symbol")?)?;
                Ok(PreparedRequest::get(format!(
                    "{}/ticker/24hr?symbol={}",
                    BASE_URL, symbol
                )))
            }
            Operation::Candles => {
                let symbol = Self::format_symbol(parameters.require("symbol")?)?;
                let interval = Self::check_timeframe(parameters.get("timeframe").unwrap_or("1h"))?;
                let limit = parse_limit(parameters, 100, 1000)?;
                let mut url = format!(
                    "{}/klines?symbol={}&interval={}&limit={}",
                    BASE_URL, symbol, interval, limit
                );
                if let Some(since) = parse_since(parameters)? {
                    url.push_str(&format!("&startTime={}", since));
                }
                Ok(PreparedRequest::get(url))
            }
            Operation::OrderBook => {
                let symbol = Self::format_symbol(parameters.require("symbol")?)?;
                let limit = parse_limit(parameters, 20, 5000)?;
                Ok(PreparedRequest::get(format!(
                    "{}/depth?symbol={}&limit={}",
                    BASE_URL, symbol, limit
                )))
            }
            Operation::Trades => {
                let symbol = Self::format_symbol(parameters.require("symbol")?)?;
                let limit = parse_limit(parameters, 100, 1000)?;
                Ok(PreparedRequest::get(format!(
                    "{}/trades?symbol={}&limit={}",
                    BASE_URL, symbol, limit
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
