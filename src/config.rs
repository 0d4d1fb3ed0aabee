//! Analyzer configuration
//!
//! Configuration is plain JSON so the host application can pass it through
//! the FFI layer unchanged. Every field is optional.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_MAX_REDIRECTS: u32 = 5;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub fetch: FetchConfig,
    pub extract: ExtractOptions,
}

impl AnalyzerConfig {
    /// Parse a JSON document. An empty string yields the defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_json::from_str(json)?;
        config.fetch.validate()?;
        Ok(config)
    }
}

/// HTTP settings for the fetcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Global bound on one request, connect through body
    pub timeout_secs: u64,
    pub user_agent: String,
    pub max_redirects: u32,
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// A zero timeout would mean "no bound", which a hanging server could
    /// exploit.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "fetch.timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: concat!("web_table_analyzer/", env!("CARGO_PKG_VERSION")).to_string(),
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

/// How the first row(s) of a table become column names
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeaderPolicy {
    /// `<thead>` / all-`<th>` rows, else a first row that reads like a header
    #[default]
    StructuralOrInferred,
    /// Only rows marked up as headers
    Structural,
    /// Synthetic names; every row is data
    None,
}

/// Options for the table extractor
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractOptions {
    pub header: HeaderPolicy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let config = AnalyzerConfig::from_json("").unwrap();
        assert_eq!(config, AnalyzerConfig::default());
        assert_eq!(config.fetch.timeout(), Duration::from_secs(15));
        assert!(config.fetch.user_agent.starts_with("web_table_analyzer/"));
    }

    #[test]
    fn test_partial_json() {
        let config =
            AnalyzerConfig::from_json(r#"{"fetch": {"timeout_secs": 3}, "extract": {"header": "structural"}}"#)
                .unwrap();
        assert_eq!(config.fetch.timeout_secs, 3);
        assert_eq!(config.fetch.max_redirects, DEFAULT_MAX_REDIRECTS);
        assert_eq!(config.extract.header, HeaderPolicy::Structural);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = AnalyzerConfig::from_json(r#"{"fetch": {"timeout_secs": 0}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_malformed_json() {
        let err = AnalyzerConfig::from_json("{fetch").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
