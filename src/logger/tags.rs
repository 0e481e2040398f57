/// Subsystem tags for log filtering and display

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogTag {
    Dispatch,
    Cache,
    Api,
    Rpc,
    Relay,
    Config,
}

impl LogTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogTag::Dispatch => "DISPATCH",
            LogTag::Cache => "CACHE",
            LogTag::Api => "API",
            LogTag::Rpc => "RPC",
            LogTag::Relay => "RELAY",
            LogTag::Config => "CONFIG",
        }
    }

    /// Key used by `--debug-<module>` / `--verbose-<module>` flags.
    pub fn to_debug_key(&self) -> String {
        self.as_str().to_lowercase()
    }
}

impl std::fmt::Display for LogTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
