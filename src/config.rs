/// Runtime configuration
///
/// Loaded from `configs.json` in the working directory. Every field has a
/// default so a missing file yields a fully working configuration; a present
/// but malformed file is an error (silently ignoring a typo'd config is
/// worse than failing).
use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::logger::{self, LogTag};

const CONFIG_FILE: &str = "configs.json";

/// Public relay proxy that fetches a wrapped URL server-side and returns the
/// raw body. Used when a direct upstream call fails.
fn default_relay_url() -> String {
    "https://api.allorigins.win/raw".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct Configs {
    #[serde(default = "default_relay_url")]
    pub relay_url: String,

    /// Fixed per-call timeout for direct and relayed fetches, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Per-category TTL overrides in seconds, keyed by category name
    /// (e.g. `"ticker": 5`). Categories not listed keep their defaults.
    #[serde(default)]
    pub ttl_overrides: HashMap<String, u64>,
}

impl Default for Configs {
    fn default() -> Self {
        Self {
            relay_url: default_relay_url(),
            request_timeout_secs: default_request_timeout_secs(),
            ttl_overrides: HashMap::new(),
        }
    }
}

/// Read `configs.json`, falling back to defaults when the file is absent.
pub fn read_configs() -> Result<Configs, String> {
    if !Path::new(CONFIG_FILE).exists() {
        return Ok(Configs::default());
    }

    let raw = std::fs::read_to_string(CONFIG_FILE)
        .map_err(|e| format!("Failed to read {}: {}", CONFIG_FILE, e))?;
    serde_json::from_str(&raw).map_err(|e| format!("Failed to parse {}: {}", CONFIG_FILE, e))
}

pub static CONFIGS: Lazy<Configs> = Lazy::new(|| {
    read_configs().unwrap_or_else(|e| {
        logger::warning(LogTag::Config, &format!("{} - using defaults", e));
        Configs::default()
    })
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let configs = Configs::default();
        assert_eq!(configs.request_timeout_secs, 30);
        assert!(configs.relay_url.starts_with("https://"));
        assert!(configs.ttl_overrides.is_empty());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let configs: Configs =
            serde_json::from_str(r#"{"request_timeout_secs": 10}"#).unwrap();
        assert_eq!(configs.request_timeout_secs, 10);
        assert_eq!(configs.relay_url, default_relay_url());
    }

    #[test]
    fn test_ttl_overrides_parse() {
        let configs: Configs =
            serde_json::from_str(r#"{"ttl_overrides": {"ticker": 5, "candles": 120}}"#).unwrap();
        assert_eq!(configs.ttl_overrides.get("ticker"), Some(&5));
        assert_eq!(configs.ttl_overrides.get("candles"), Some(&120));
    }
}
