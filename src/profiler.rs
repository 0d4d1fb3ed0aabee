//! Column classification
//!
//! Decides, per column, whether a dataset column can feed numeric charts,
//! count charts, or nothing at all.

use std::collections::HashMap;

use serde::Serialize;

use crate::dataset::{CellValue, Dataset};
use crate::numeric::parse_number;

/// Share of non-missing values that must parse for a column to be numeric.
/// A single unparsable value disqualifies the column.
pub const NUMERIC_THRESHOLD: f64 = 1.0;

/// Column values coerced to numbers, aligned with the dataset rows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericColumn {
    pub values: Vec<Option<f64>>,
    pub count: usize,
    pub distinct: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl NumericColumn {
    fn from_values(values: Vec<Option<f64>>) -> Option<Self> {
        let present: Vec<f64> = values.iter().flatten().copied().collect();
        if present.is_empty() {
            return None;
        }

        let mut sorted = present.clone();
        sorted.sort_by(f64::total_cmp);
        sorted.dedup();

        let sum: f64 = present.iter().sum();
        Some(Self {
            count: present.len(),
            distinct: sorted.len(),
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            mean: sum / present.len() as f64,
            values,
        })
    }

    /// Non-missing values in row order
    pub fn present(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().flatten().copied()
    }
}

/// One category and how often it occurs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    /// Text as first seen in the column
    pub label: String,
    pub count: usize,
}

/// Category universe of a text column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoricalColumn {
    /// Descending by count; ties keep first-seen order
    pub counts: Vec<CategoryCount>,
}

impl CategoricalColumn {
    fn from_texts<'a>(texts: impl Iterator<Item = &'a str>) -> Self {
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut counts: Vec<CategoryCount> = Vec::new();

        for text in texts {
            let key = text.to_lowercase();
            match positions.get(&key) {
                Some(&idx) => counts[idx].count += 1,
                None => {
                    positions.insert(key, counts.len());
                    counts.push(CategoryCount {
                        label: text.to_string(),
                        count: 1,
                    });
                }
            }
        }

        // Stable sort keeps first-seen order among equal counts.
        counts.sort_by(|a, b| b.count.cmp(&a.count));
        Self { counts }
    }

    pub fn distinct(&self) -> usize {
        self.counts.len()
    }
}

/// Classification of one column
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnKind {
    Numeric(NumericColumn),
    Categorical(CategoricalColumn),
    /// Every value is missing
    Unusable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnProfile {
    pub name: String,
    pub missing: usize,
    #[serde(flatten)]
    pub kind: ColumnKind,
}

impl ColumnProfile {
    pub fn is_numeric(&self) -> bool {
        matches!(self.kind, ColumnKind::Numeric(_))
    }

    pub fn is_categorical(&self) -> bool {
        matches!(self.kind, ColumnKind::Categorical(_))
    }

    pub fn as_numeric(&self) -> Option<&NumericColumn> {
        match &self.kind {
            ColumnKind::Numeric(col) => Some(col),
            _ => None,
        }
    }

    pub fn as_categorical(&self) -> Option<&CategoricalColumn> {
        match &self.kind {
            ColumnKind::Categorical(col) => Some(col),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            ColumnKind::Numeric(_) => "numeric",
            ColumnKind::Categorical(_) => "categorical",
            ColumnKind::Unusable => "unusable",
        }
    }
}

/// Column profiles of one dataset, in column order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaProfile {
    pub columns: Vec<ColumnProfile>,
}

impl SchemaProfile {
    pub fn get(&self, name: &str) -> Option<&ColumnProfile> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn numeric(&self) -> impl Iterator<Item = &ColumnProfile> + '_ {
        self.columns.iter().filter(|c| c.is_numeric())
    }

    pub fn categorical(&self) -> impl Iterator<Item = &ColumnProfile> + '_ {
        self.columns.iter().filter(|c| c.is_categorical())
    }

    pub fn numeric_names(&self) -> Vec<&str> {
        self.numeric().map(|c| c.name.as_str()).collect()
    }

    pub fn categorical_names(&self) -> Vec<&str> {
        self.categorical().map(|c| c.name.as_str()).collect()
    }
}

/// Classify every column of `dataset`. Pure: the same dataset always yields
/// the same profile.
pub fn profile(dataset: &Dataset) -> SchemaProfile {
    let columns = dataset
        .columns()
        .iter()
        .enumerate()
        .map(|(idx, name)| profile_column(name, dataset.column(idx)))
        .collect();

    SchemaProfile { columns }
}

fn profile_column<'a>(name: &str, cells: impl Iterator<Item = &'a CellValue>) -> ColumnProfile {
    let cells: Vec<&CellValue> = cells.collect();
    let texts: Vec<&str> = cells.iter().filter_map(|c| c.as_text()).collect();
    let missing = cells.len() - texts.len();

    let kind = if texts.is_empty() {
        ColumnKind::Unusable
    } else {
        classify(&cells, &texts)
    };

    ColumnProfile {
        name: name.to_string(),
        missing,
        kind,
    }
}

fn classify(cells: &[&CellValue], texts: &[&str]) -> ColumnKind {
    let values: Vec<Option<f64>> = cells
        .iter()
        .map(|cell| cell.as_text().and_then(parse_number))
        .collect();

    let parsed = values.iter().flatten().count();
    let ratio = parsed as f64 / texts.len() as f64;

    if ratio >= NUMERIC_THRESHOLD {
        if let Some(column) = NumericColumn::from_values(values) {
            return ColumnKind::Numeric(column);
        }
    }
    ColumnKind::Categorical(CategoricalColumn::from_texts(texts.iter().copied()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(columns: &[&str], rows: &[&[&str]]) -> Dataset {
        Dataset::new(
            0,
            None,
            columns.iter().map(|c| c.to_string()).collect(),
            rows.iter()
                .map(|row| row.iter().map(|c| CellValue::from_raw(c)).collect())
                .collect(),
        )
    }

    #[test]
    fn test_numeric_all_or_nothing() {
        let ds = dataset(&["v"], &[&["1"], &["2.5"], &["3"]]);
        let profile = profile(&ds);
        let v = profile.get("v").unwrap();
        assert_eq!(v.kind_name(), "numeric");
        assert_eq!(v.as_numeric().unwrap().values, vec![Some(1.0), Some(2.5), Some(3.0)]);

        let ds = dataset(&["v"], &[&["1"], &["n/a"], &["3"]]);
        let profile = super::profile(&ds);
        assert_eq!(profile.get("v").unwrap().kind_name(), "categorical");
    }

    #[test]
    fn test_missing_values_are_excluded_from_aggregates() {
        let ds = dataset(&["v"], &[&["2"], &[""], &["4"]]);
        let profile = profile(&ds);
        let v = profile.get("v").unwrap();
        assert_eq!(v.missing, 1);

        let numeric = v.as_numeric().unwrap();
        assert_eq!(numeric.values, vec![Some(2.0), None, Some(4.0)]);
        assert_eq!(numeric.count, 2);
        assert_eq!(numeric.mean, 3.0);
        assert_eq!((numeric.min, numeric.max), (2.0, 4.0));
    }

    #[test]
    fn test_category_counts() {
        let ds = dataset(
            &["fruit"],
            &[&["pear"], &["Apple"], &["apple"], &["fig"], &["pear"], &["kiwi"]],
        );
        let profile = profile(&ds);
        let counts = &profile.get("fruit").unwrap().as_categorical().unwrap().counts;

        let pairs: Vec<(&str, usize)> = counts.iter().map(|c| (c.label.as_str(), c.count)).collect();
        assert_eq!(pairs, vec![("pear", 2), ("Apple", 2), ("fig", 1), ("kiwi", 1)]);
    }

    #[test]
    fn test_single_category_and_unusable() {
        let ds = dataset(&["a", "b", "c"], &[&["x", "", "7"], &["x", "", "7"]]);
        let profile = profile(&ds);

        assert_eq!(profile.get("a").unwrap().as_categorical().unwrap().distinct(), 1);
        assert_eq!(profile.get("b").unwrap().kind, ColumnKind::Unusable);
        assert_eq!(profile.get("b").unwrap().missing, 2);
        assert_eq!(profile.get("c").unwrap().as_numeric().unwrap().distinct, 1);

        assert_eq!(profile.numeric_names(), vec!["c"]);
        assert_eq!(profile.categorical_names(), vec!["a"]);
    }

    #[test]
    fn test_profile_is_idempotent() {
        let ds = dataset(
            &["name", "price", "empty"],
            &[&["Widget", "$1,200.00", ""], &["Gadget", "15%", ""], &["Widget", "(3)", ""]],
        );
        assert_eq!(profile(&ds), profile(&ds));
    }

    #[test]
    fn test_profile_serializes_kind_tag() {
        let ds = dataset(&["a"], &[&[""]]);
        let json = serde_json::to_value(profile(&ds)).unwrap();
        assert_eq!(json["columns"][0]["kind"], "unusable");
        assert_eq!(json["columns"][0]["name"], "a");
    }
}
