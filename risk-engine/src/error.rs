//! Error types for the behavior risk engine
//!
//! Scoring itself never fails; these errors only surface at the edges
//! (configuration, replay input, metrics registration).

use thiserror::Error;

/// Risk engine error
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// I/O failure while reading configuration or replay input
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed replay record or config value
    #[error("Parse error: {0}")]
    Parse(String),

    /// Metrics registration failed
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

/// Result type
pub type Result<T> = std::result::Result<T, Error>;
