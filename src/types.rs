/// Shared domain types for the relay core
///
/// Everything that crosses a component boundary lives here: the request
/// categories, the parameter set that addresses a resource, and the
/// normalized payload shapes that adapters decode upstream responses into.
use serde::Serialize;

use crate::errors::{RelayError, RelayResult};

// =============================================================================
// CATEGORIES & OPERATIONS
// =============================================================================

/// Kind of data being requested. Each category has its own cache TTL policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    ExchangeList,
    ExchangeInfo,
    Ticker,
    Candles,
    OrderBook,
    Trades,
    ChainBalance,
    ChainRpc,
    NftCollection,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::ExchangeList,
        Category::ExchangeInfo,
        Category::Ticker,
        Category::Candles,
        Category::OrderBook,
        Category::Trades,
        Category::ChainBalance,
        Category::ChainRpc,
        Category::NftCollection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::ExchangeList => "exchange-list",
            Category::ExchangeInfo => "exchange-info",
            Category::Ticker => "ticker",
            Category::Candles => "candles",
            Category::OrderBook => "order-book",
            Category::Trades => "trades",
            Category::ChainBalance => "chain-balance",
            Category::ChainRpc => "chain-rpc",
            Category::NftCollection => "nft-collection",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Category::ALL.iter().copied().find(|c| c.as_str() == s)
    }

    /// Adapter operation backing this category. `ExchangeList` is served from
    /// the registry and has no upstream operation.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            Category::ExchangeList => None,
            Category::ExchangeInfo => Some(Operation::ExchangeInfo),
            Category::Ticker => Some(Operation::Ticker),
            Category::Candles => Some(Operation::Candles),
            Category::OrderBook => Some(Operation::OrderBook),
            Category::Trades => Some(Operation::Trades),
            Category::ChainBalance => Some(Operation::ChainBalance),
            Category::ChainRpc => Some(Operation::ChainRpc),
            Category::NftCollection => Some(Operation::CollectionInfo),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Operations a source adapter can expose. Declared per adapter in its
/// descriptor; invoking an undeclared operation fails before any network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ExchangeInfo,
    Ticker,
    Candles,
    OrderBook,
    Trades,
    ChainBalance,
    ChainRpc,
    CollectionInfo,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::ExchangeInfo => "exchange-info",
            Operation::Ticker => "ticker",
            Operation::Candles => "candles",
            Operation::OrderBook => "order-book",
            Operation::Trades => "trades",
            Operation::ChainBalance => "chain-balance",
            Operation::ChainRpc => "chain-rpc",
            Operation::CollectionInfo => "collection-info",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// PARAMETER SET
// =============================================================================

/// Ordered list of (name, value) pairs scoped to one category.
///
/// Insertion order is preserved but never significant: two sets holding the
/// same pairs in different order fingerprint identically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSet {
    pairs: Vec<(String, String)>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut set = Self::new();
        for (name, value) in pairs {
            set.insert(name, value);
        }
        set
    }

    /// Insert a parameter, replacing any existing value under the same name.
    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, name: K, value: V) {
        let name = name.into();
        let value = value.into();
        if let Some(existing) = self.pairs.iter_mut().find(|(n, _)| *n == name) {
            existing.1 = value;
        } else {
            self.pairs.push((name, value));
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Fetch a required parameter, failing with `InvalidParameters` naming it.
    pub fn require(&self, name: &str) -> RelayResult<&str> {
        self.get(name).ok_or_else(|| RelayError::InvalidParameters {
            message: format!("missing required parameter '{}'", name),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Pairs sorted by name, for canonical serialization.
    pub fn sorted_pairs(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<(&str, &str)> = self
            .pairs
            .iter()
            .map(|(n, v)| (n.as_str(), v.as_str()))
            .collect();
        pairs.sort();
        pairs
    }
}

// =============================================================================
// FETCH REQUEST
// =============================================================================

/// Which path produced (or is producing) a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    Direct,
    Relayed,
}

impl Attempt {
    pub fn as_str(&self) -> &'static str {
        match self {
            Attempt::Direct => "direct",
            Attempt::Relayed => "relayed",
        }
    }
}

/// One in-flight logical request. Created per dispatch, owned by the
/// dispatcher invocation that created it, discarded once a response exists.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub category: Category,
    pub source_id: String,
    pub parameters: ParameterSet,
    pub attempt: Attempt,
}

impl FetchRequest {
    pub fn new(category: Category, source_id: &str, parameters: ParameterSet) -> Self {
        Self {
            category,
            source_id: source_id.to_string(),
            parameters,
            attempt: Attempt::Direct,
        }
    }
}

// =============================================================================
// NORMALIZED PAYLOADS
// =============================================================================

/// Current market snapshot for one trading pair. Numeric fields are parsed
/// from whatever string/number mix the venue returns; timestamp is ms since
/// epoch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ticker {
    pub source: String,
    pub symbol: String,
    pub price: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
    pub timestamp: i64,
}

/// One OHLCV bar, timestamp in ms. Candle series are ordered oldest-first
/// regardless of the venue's native ordering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candle {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookLevel {
    pub price: f64,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderBook {
    pub source: String,
    pub symbol: String,
    pub timestamp: i64,
    pub bids: Vec<BookLevel>,
    pub asks: Vec<BookLevel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trade {
    pub id: Option<String>,
    pub timestamp: i64,
    pub side: TradeSide,
    pub price: f64,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExchangeInfo {
    pub source: String,
    pub name: String,
    pub markets_count: usize,
    pub timeframes: Vec<String>,
}

/// Native-coin balance for one address. `balance_wei` keeps the exact value
/// as a decimal string; `balance` is the native-unit float for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainBalance {
    pub chain: String,
    pub address: String,
    pub balance_wei: String,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionInfo {
    pub id: String,
    pub chain: String,
    pub name: String,
    pub token_count: u64,
    pub floor_price: Option<f64>,
    pub volume_24h: Option<f64>,
}

/// Normalized response payload, one variant per category family.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    ExchangeList(Vec<String>),
    ExchangeInfo(ExchangeInfo),
    Ticker(Ticker),
    Candles(Vec<Candle>),
    OrderBook(OrderBook),
    Trades(Vec<Trade>),
    ChainBalance(ChainBalance),
    CollectionInfo(CollectionInfo),
    /// Passthrough JSON-RPC result for `chain-rpc` requests.
    Raw(serde_json::Value),
}
