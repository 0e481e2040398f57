/// Ankr multi-chain JSON-RPC adapter
///
/// Public RPC documentation: https://www.ankr.com/rpc/
///
/// One endpoint per chain (`https://rpc.ankr.com/{chain}`), JSON-RPC 2.0
/// envelope. `chain-balance` issues `eth_getBalance` and normalizes the
/// hex-wei result; `chain-rpc` passes an arbitrary method through and
/// returns the raw `result` value. A JSON-RPC `error` member is an upstream
/// error even under HTTP 200.
pub mod types;

use serde_json::{json, Value};

use crate::adapters::{PreparedRequest, SourceAdapter, SourceDescriptor};
use crate::errors::{RelayError, RelayResult};
use crate::types::{ChainBalance, Operation, ParameterSet, Payload};

use self::types::JsonRpcResponseRaw;

const SOURCE_ID: &str = "ankr";
const BASE_URL: &str = "https://rpc.ankr.com";

const SUPPORTED_CHAINS: &[&str] = &[
    "eth",
    "bsc",
    "polygon",
    "arbitrum",
    "optimism",
    "avalanche",
    "base",
    "fantom",
];

const WEI_PER_NATIVE: f64 = 1e18;

const CAPABILITIES: &[Operation] = &[Operation::ChainBalance, Operation::ChainRpc];

static DESCRIPTOR: SourceDescriptor = SourceDescriptor {
    id: SOURCE_ID,
    base_endpoint: BASE_URL,
    capabilities: CAPABILITIES,
};

pub struct AnkrAdapter;

impl AnkrAdapter {
    pub fn new() -> Self {
        Self
    }

    fn check_chain<'a>(parameters: &'a ParameterSet) -> RelayResult<&'a str> {
        let chain = parameters.require("chain")?;
        if SUPPORTED_CHAINS.contains(&chain) {
            Ok(chain)
        } else {
            Err(RelayError::invalid_parameters(format!(
                "unsupported chain '{}' (expected one of {})",
                chain,
                SUPPORTED_CHAINS.join(", ")
            )))
        }
    }

    fn check_address<'a>(parameters: &'a ParameterSet) -> RelayResult<&'a str> {
        let address = parameters.require("address")?;
        let hex = address.strip_prefix("0x").unwrap_or("");
        if hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
            Ok(address)
        } else {
            Err(RelayError::invalid_parameters(format!(
                "'{}' is not a 0x-prefixed 20-byte address",
                address
            )))
        }
    }

    fn rpc_envelope(method: &str, params: Value) -> Value {
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        })
    }

    /// Unwrap a JSON-RPC body into its `result`, surfacing RPC-level errors.
    fn unwrap_result(raw: &str) -> RelayResult<Value> {
        let response: JsonRpcResponseRaw = serde_json::from_str(raw).map_err(|e| {
            RelayError::upstream(SOURCE_ID, format!("malformed json-rpc response: {}", e))
        })?;

        if let Some(error) = response.error {
            return Err(RelayError::upstream(
                SOURCE_ID,
                format!("rpc error {}: {}", error.code, error.message),
            ));
        }
        Ok(response.result.unwrap_or(Value::Null))
    }

    fn parse_hex_wei(raw: &str) -> RelayResult<u128> {
        let hex = raw.strip_prefix("0x").ok_or_else(|| {
            RelayError::upstream(SOURCE_ID, format!("balance '{}' is not hex", raw))
        })?;
        u128::from_str_radix(hex, 16).map_err(|_| {
            RelayError::upstream(SOURCE_ID, format!("balance '{}' is not hex", raw))
        })
    }

    fn decode_balance(raw: &str, parameters: &ParameterSet) -> RelayResult<Payload> {
        let result = Self::unwrap_result(raw)?;
        let hex = result.as_str().ok_or_else(|| {
            RelayError::upstream(SOURCE_ID, "eth_getBalance result is not a string")
        })?;
        let wei = Self::parse_hex_wei(hex)?;

        Ok(Payload::ChainBalance(ChainBalance {
            chain: parameters.get("chain").unwrap_or_default().to_string(),
            address: parameters.get("address").unwrap_or_default().to_string(),
            balance_wei: wei.to_string(),
            balance: wei as f64 / WEI_PER_NATIVE,
        }))
    }
}

impl SourceAdapter for AnkrAdapter {
    fn descriptor(&self) -> &SourceDescriptor {
        &DESCRIPTOR
    }

    fn prepare(
        &self,
        operation: Operation,
        parameters: &ParameterSet,
    ) -> RelayResult<PreparedRequest> {
        match operation {
            Operation::ChainBalance => {
                let chain = Self::check_chain(parameters)?;
                let address = Self::check_address(parameters)?;
                Ok(PreparedRequest::post(
                    format!("{}/{}", BASE_URL, chain),
                    Self::rpc_envelope("eth_getBalance", json!([address, "latest"])),
                ))
            }
            Operation::ChainRpc => {
                let chain = Self::check_chain(parameters)?;
                let method = parameters.require("method")?;
                if method.is_empty() {
                    return Err(RelayError::invalid_parameters("method must not be empty"));
                }
                let params = match parameters.get("params") {
                    None => Value::Array(Vec::new()),
                    Some(raw) => {
                        let parsed: Value = serde_json::from_str(raw).map_err(|_| {
                            RelayError::invalid_parameters(format!(
                                "params '{}' is not valid JSON",
                                raw
                            ))
                        })?;
                        if !parsed.is_array() {
                            return Err(RelayError::invalid_parameters(
                                "params must be a JSON array",
                            ));
                        }
                        parsed
                    }
                };
                Ok(PreparedRequest::post(
                    format!("{}/{}", BASE_URL, chain),
                    Self::rpc_envelope(method, params),
                ))
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
        match operation {
            Operation::ChainBalance => Self::decode_balance(raw, parameters),
            Operation::ChainRpc => Ok(Payload::Raw(Self::unwrap_result(raw)?)),
            _ => Err(RelayError::UnsupportedOperation {
                source_id: SOURCE_ID.to_string(),
                operation,
            }),
        }
    }
}
