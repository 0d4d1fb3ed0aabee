//! Fetch → locate → extract

use serde::Serialize;
use tracing::info;

use crate::config::ExtractOptions;
use crate::dataset::Dataset;
use crate::error::FetchError;
use crate::extractor::{extract_all, ExtractWarning};
use crate::fetcher::Fetcher;
use crate::locator::locate;

/// Why a fetch produced no datasets
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    Fetch(FetchError),
    /// The page had `located` table elements, none of them usable
    NoTables {
        located: usize,
        warnings: Vec<ExtractWarning>,
    },
}

/// Outcome of one fetch: datasets, or a diagnostic, never both.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchResult {
    Tables {
        datasets: Vec<Dataset>,
        warnings: Vec<ExtractWarning>,
    },
    Failed(Diagnostic),
}

impl FetchResult {
    pub fn datasets(&self) -> &[Dataset] {
        match self {
            FetchResult::Tables { datasets, .. } => datasets,
            FetchResult::Failed(_) => &[],
        }
    }

    pub fn warnings(&self) -> &[ExtractWarning] {
        match self {
            FetchResult::Tables { warnings, .. } => warnings,
            FetchResult::Failed(Diagnostic::NoTables { warnings, .. }) => warnings,
            FetchResult::Failed(Diagnostic::Fetch(_)) => &[],
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchResult::Tables { .. })
    }

    /// Message for the user
    pub fn summary(&self) -> String {
        match self {
            FetchResult::Tables { datasets, .. } => {
                format!("Found {} tables on this page.", datasets.len())
            }
            FetchResult::Failed(Diagnostic::NoTables { .. }) => {
                "No tables found on the provided page.".to_string()
            }
            FetchResult::Failed(Diagnostic::Fetch(err)) => format!("Error accessing the URL: {err}"),
        }
    }

    /// Serializable view with diagnostics flattened to advisory strings
    pub fn report(&self) -> FetchReport<'_> {
        let error = match self {
            FetchResult::Failed(Diagnostic::Fetch(err)) => Some(err.to_string()),
            _ => None,
        };
        FetchReport {
            success: self.is_success(),
            summary: self.summary(),
            error,
            warnings: self.warnings().iter().map(ToString::to_string).collect(),
            datasets: self.datasets(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FetchReport<'a> {
    pub success: bool,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub warnings: Vec<String>,
    pub datasets: &'a [Dataset],
}

/// Extract every usable table from an HTML document.
pub fn tables_from_html(html: &str, options: &ExtractOptions) -> FetchResult {
    let nodes = locate(html);
    let (datasets, warnings) = extract_all(&nodes, options);
    info!(
        located = nodes.len(),
        extracted = datasets.len(),
        skipped = warnings.len(),
        "extracted tables"
    );

    if datasets.is_empty() {
        return FetchResult::Failed(Diagnostic::NoTables {
            located: nodes.len(),
            warnings,
        });
    }
    FetchResult::Tables { datasets, warnings }
}

/// Fetch `url` and extract its tables. A fetch failure yields no datasets.
pub fn fetch_tables(fetcher: &Fetcher, url: &str, options: &ExtractOptions) -> FetchResult {
    match fetcher.fetch(url) {
        Ok(html) => tables_from_html(&html, options),
        Err(err) => {
            tracing::warn!(url, error = %err, "fetch failed");
            FetchResult::Failed(Diagnostic::Fetch(err))
        }
    }
}
