// ---------------------------------------------------------------------------
// Error types for fetching the fleet and loading feed configuration
// ---------------------------------------------------------------------------

use std::fmt;

use serde::{Deserialize, Serialize};

/// Errors an `EntitySource` can report when the feed asks it for the fleet.
///
/// The built-in static source never fails at fetch time, but a backed source
/// can, and the feed surfaces the failure through `FeedState` instead of
/// discarding the last good snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchError {
    /// The source could not be reached or refused the request.
    Unavailable(String),
    /// The source answered, but with entities that violate the data model.
    Malformed(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Unavailable(msg) => write!(f, "Source unavailable: {msg}"),
            FetchError::Malformed(msg) => write!(f, "Malformed fleet data: {msg}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Errors raised while reading a `FeedConfig` or a fleet seed file.
#[derive(Debug)]
pub enum ConfigError {
    /// I/O error reading the file.
    Io(std::io::Error),
    /// The file is not valid JSON for the expected shape.
    Parse(String),
    /// The file parsed, but a value is out of range.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "I/O error: {e}"),
            ConfigError::Parse(msg) => write!(f, "Parse error: {msg}"),
            ConfigError::Invalid(msg) => write!(f, "Invalid value: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}

impl From<FetchError> for ConfigError {
    fn from(e: FetchError) -> Self {
        ConfigError::Invalid(e.to_string())
    }
}
