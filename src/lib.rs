pub mod adapters;
pub mod cache;
pub mod config;
pub mod dispatcher;
pub mod errors; // Structured error handling
pub mod fingerprint;
pub mod logger;
pub mod relay;
pub mod types;
