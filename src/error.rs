//! Error types for the table analysis pipeline.

use std::fmt;

/// Errors raised while retrieving a page.
///
/// Every variant is fatal to the fetch attempt that produced it; there is no
/// partial result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The URL could not be parsed into an absolute URL.
    #[error("invalid URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// The server answered with a non-success status.
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// The configured time bound elapsed before the response was complete.
    #[error("timed out after {seconds}s fetching {url}")]
    Timeout { url: String, seconds: u64 },

    /// DNS, connection, TLS or redirect failure.
    #[error("failed to fetch {url}: {message}")]
    Transport { url: String, message: String },

    /// The response body could not be read as text.
    #[error("failed to read body of {url}: {message}")]
    Body { url: String, message: String },
}

/// Why a located table produced no usable data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    NoRows,
    NoColumns,
    AllMissing,
}

impl fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            EmptyReason::NoRows => "no data rows",
            EmptyReason::NoColumns => "no columns",
            EmptyReason::AllMissing => "every cell is empty",
        };
        f.write_str(text)
    }
}

/// Errors raised while turning one located table into a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    #[error("table has no usable data ({0})")]
    Empty(EmptyReason),
}

/// Invalid change of the active dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("table index {index} out of range ({len} tables loaded)")]
    OutOfRange { index: usize, len: usize },
}

/// Malformed analyzer configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
