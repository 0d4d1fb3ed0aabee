//! Web Table Analyzer
//!
//! Finds the HTML tables on a web page and prepares them for exploratory
//! charts:
//! - Fetching pages over blocking HTTP with a hard timeout
//! - Locating every `<table>`, nested ones included
//! - Extracting rectangular datasets (spans, headers, ragged rows)
//! - Classifying columns as numeric, categorical or unusable
//! - Chart eligibility and chart-ready data
//! - FFI interface exchanging JSON with a host application

pub mod charts;
pub mod config;
pub mod dataset;
pub mod error;
pub mod extractor;
pub mod ffi;
pub mod fetcher;
pub mod locator;
pub mod numeric;
pub mod pipeline;
pub mod profiler;
pub mod registry;

pub use config::{AnalyzerConfig, ExtractOptions, FetchConfig, HeaderPolicy};
pub use dataset::{CellValue, Dataset, Record};
pub use error::{ConfigError, EmptyReason, ExtractError, FetchError, SelectionError};
pub use extractor::{extract, extract_all, ExtractWarning};
pub use fetcher::Fetcher;
pub use locator::{locate, RawCell, RawRow, RawTableNode};
pub use pipeline::{fetch_tables, tables_from_html, Diagnostic, FetchResult};
pub use profiler::{profile, ColumnKind, ColumnProfile, SchemaProfile};
pub use registry::Session;

/// Serialize any `Display` value as a JSON string.
pub(crate) fn serialize_display<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: std::fmt::Display,
    S: serde::Serializer,
{
    serializer.collect_str(value)
}
