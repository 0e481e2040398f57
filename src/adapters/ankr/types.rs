/// Raw JSON-RPC response shapes
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponseRaw {
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<JsonRpcErrorRaw>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcErrorRaw {
    pub code: i64,
    pub message: String,
}
