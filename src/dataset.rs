//! Extracted tabular data

use serde::{Deserialize, Serialize};

/// One cell of a dataset.
///
/// Cells stay textual after extraction; numeric coercion only happens in the
/// profiler.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Missing,
}

impl CellValue {
    /// Normalize raw cell text: trim, collapse inner whitespace, and map the
    /// empty string to `Missing`.
    pub fn from_raw(raw: &str) -> Self {
        let text = normalize_ws(raw);
        if text.is_empty() {
            CellValue::Missing
        } else {
            CellValue::Text(text)
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            CellValue::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }
}

/// Collapse runs of whitespace (including no-break spaces) into one space and
/// trim both ends.
pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for word in s.split(char::is_whitespace).filter(|w| !w.is_empty()) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// A rectangular table extracted from one `<table>` element.
///
/// Every row holds exactly `columns.len()` cells, in source document order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    /// Position of the source table among all tables located on the page
    pub source_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Dataset {
    /// Build a dataset, padding short rows with `Missing` and truncating long
    /// ones so the result is rectangular.
    pub fn new(
        source_index: usize,
        caption: Option<String>,
        columns: Vec<String>,
        rows: Vec<Vec<CellValue>>,
    ) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Missing);
                row
            })
            .collect();

        Self {
            source_index,
            caption,
            columns,
            rows,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Values of one column, top to bottom
    pub fn column(&self, index: usize) -> impl Iterator<Item = &CellValue> + '_ {
        self.rows.iter().filter_map(move |row| row.get(index))
    }

    /// Record view of one row
    pub fn record(&self, row: usize) -> Option<Record<'_>> {
        self.rows.get(row).map(|cells| Record {
            columns: &self.columns,
            cells,
        })
    }

    pub fn records(&self) -> impl Iterator<Item = Record<'_>> + '_ {
        self.rows.iter().map(|cells| Record {
            columns: &self.columns,
            cells,
        })
    }

    /// Display name: the caption when present, else the 1-based table number
    pub fn title(&self) -> String {
        match &self.caption {
            Some(caption) => caption.clone(),
            None => format!("Table {}", self.source_index + 1),
        }
    }
}

/// One row, addressable by column name
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    columns: &'a [String],
    cells: &'a [CellValue],
}

impl<'a> Record<'a> {
    pub fn get(&self, column: &str) -> Option<&'a CellValue> {
        let idx = self.columns.iter().position(|c| c == column)?;
        self.cells.get(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a CellValue)> + 'a {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.cells.iter())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_cell_normalization() {
        assert_eq!(CellValue::from_raw("  New \n  York\t"), text("New York"));
        assert_eq!(CellValue::from_raw("\u{a0}1\u{a0}234 "), text("1 234"));
        assert_eq!(CellValue::from_raw(" \n "), CellValue::Missing);
    }

    #[test]
    fn test_rows_are_made_rectangular() {
        let ds = Dataset::new(
            0,
            None,
            vec!["a".into(), "b".into()],
            vec![vec![text("1")], vec![text("1"), text("2"), text("3")]],
        );
        assert_eq!(ds.rows()[0], vec![text("1"), CellValue::Missing]);
        assert_eq!(ds.rows()[1], vec![text("1"), text("2")]);
    }

    #[test]
    fn test_record_lookup() {
        let ds = Dataset::new(
            2,
            None,
            vec!["Name".into(), "Age".into()],
            vec![vec![text("Ana"), CellValue::Missing]],
        );
        let record = ds.record(0).unwrap();
        assert_eq!(record.get("Name"), Some(&text("Ana")));
        assert_eq!(record.get("Age"), Some(&CellValue::Missing));
        assert_eq!(record.get("Height"), None);
        assert_eq!(ds.title(), "Table 3");
    }

    #[test]
    fn test_missing_serializes_as_null() {
        let json = serde_json::to_string(&vec![text("x"), CellValue::Missing]).unwrap();
        assert_eq!(json, r#"["x",null]"#);
    }
}
