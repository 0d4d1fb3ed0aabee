//! Session state owned by the presentation layer
//!
//! The pipeline never touches this; a front end keeps one `Session` and swaps
//! in each new `FetchResult`.

use crate::dataset::Dataset;
use crate::error::SelectionError;
use crate::pipeline::FetchResult;
use crate::profiler::{profile, SchemaProfile};

#[derive(Debug, Clone)]
pub struct Session {
    url: String,
    /// `None` until the first fetch completes
    results: Option<FetchResult>,
    active_index: usize,
}

impl Session {
    pub fn new() -> Self {
        Self {
            url: String::new(),
            results: None,
            active_index: 0,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = url.into();
    }

    pub fn results(&self) -> Option<&FetchResult> {
        self.results.as_ref()
    }

    pub fn datasets(&self) -> &[Dataset] {
        match &self.results {
            Some(results) => results.datasets(),
            None => &[],
        }
    }

    /// Message for the user, once something has been fetched
    pub fn summary(&self) -> Option<String> {
        self.results.as_ref().map(FetchResult::summary)
    }

    /// Replace the previous result wholesale; selection goes back to the
    /// first dataset.
    pub fn replace(&mut self, results: FetchResult) {
        self.results = Some(results);
        self.active_index = 0;
    }

    pub fn active_index(&self) -> Option<usize> {
        (!self.datasets().is_empty()).then_some(self.active_index)
    }

    /// Make dataset `index` active. Out-of-range indices leave the selection
    /// unchanged.
    pub fn select(&mut self, index: usize) -> Result<&Dataset, SelectionError> {
        let len = self.datasets().len();
        if index >= len {
            return Err(SelectionError::OutOfRange { index, len });
        }
        self.active_index = index;
        Ok(&self.datasets()[index])
    }

    pub fn active(&self) -> Option<&Dataset> {
        self.datasets().get(self.active_index)
    }

    /// Profile of the active dataset, computed on demand
    pub fn active_profile(&self) -> Option<SchemaProfile> {
        self.active().map(profile)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractOptions;
    use crate::pipeline::tables_from_html;

    fn two_tables() -> FetchResult {
        tables_from_html(
            "<table><tr><td>a</td></tr></table><table><tr><td>1</td></tr></table>",
            &ExtractOptions::default(),
        )
    }

    #[test]
    fn test_empty_session() {
        let session = Session::new();
        assert!(session.results().is_none());
        assert_eq!(session.summary(), None);
        assert!(session.active().is_none());
        assert_eq!(session.active_index(), None);
        assert!(session.active_profile().is_none());
    }

    #[test]
    fn test_select_and_replace() {
        let mut session = Session::new();
        session.set_url("https://example.com/stats");
        session.replace(two_tables());
        assert_eq!(session.active_index(), Some(0));

        let selected = session.select(1).unwrap();
        assert_eq!(selected.source_index, 1);
        assert_eq!(session.active_index(), Some(1));
        assert_eq!(
            session.active_profile().unwrap().numeric_names(),
            vec!["col_0"]
        );

        assert_eq!(
            session.select(2).unwrap_err(),
            SelectionError::OutOfRange { index: 2, len: 2 }
        );
        assert_eq!(session.active_index(), Some(1));

        session.replace(two_tables());
        assert_eq!(session.active_index(), Some(0));
        assert_eq!(session.url(), "https://example.com/stats");
    }

    #[test]
    fn test_failed_fetch_clears_datasets() {
        let mut session = Session::new();
        session.replace(two_tables());
        session.replace(tables_from_html("<p>none</p>", &ExtractOptions::default()));
        assert!(session.datasets().is_empty());
        assert!(session.active().is_none());
        assert_eq!(
            session.summary().as_deref(),
            Some("No tables found on the provided page.")
        );
    }
}
