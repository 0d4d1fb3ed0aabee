//! Conversion of located tables into rectangular datasets

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use tracing::warn;

use crate::config::{ExtractOptions, HeaderPolicy};
use crate::dataset::{normalize_ws, CellValue, Dataset};
use crate::error::{EmptyReason, ExtractError};
use crate::locator::{RawCell, RawTableNode};
use crate::numeric::looks_numeric;

/// A table that was located but could not be turned into a dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractWarning {
    /// Zero-based position of the table in the page
    pub table_index: usize,
    #[serde(serialize_with = "crate::serialize_display")]
    pub reason: ExtractError,
}

impl fmt::Display for ExtractWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "could not convert table {} into a dataset: {}",
            self.table_index + 1,
            self.reason
        )
    }
}

/// One table row after span expansion
#[derive(Debug, Clone)]
struct GridRow {
    cells: Vec<String>,
    structural_header: bool,
}

/// Extract every node. Failures become warnings; they never stop the
/// remaining tables from being processed.
pub fn extract_all(
    nodes: &[RawTableNode],
    options: &ExtractOptions,
) -> (Vec<Dataset>, Vec<ExtractWarning>) {
    let mut datasets = Vec::with_capacity(nodes.len());
    let mut warnings = Vec::new();

    for node in nodes {
        match extract(node, options) {
            Ok(dataset) => datasets.push(dataset),
            Err(reason) => {
                let warning = ExtractWarning {
                    table_index: node.index,
                    reason,
                };
                warn!(table = node.index, %reason, "skipping table");
                warnings.push(warning);
            }
        }
    }

    (datasets, warnings)
}

/// Turn one located table into a dataset.
pub fn extract(node: &RawTableNode, options: &ExtractOptions) -> Result<Dataset, ExtractError> {
    let grid = expand_spans(node);

    let header_rows = count_header_rows(&grid, options.header);
    let (head, body) = grid.split_at(header_rows);

    let data: Vec<&GridRow> = body.iter().filter(|row| !row.cells.is_empty()).collect();
    if data.is_empty() {
        return Err(ExtractError::Empty(EmptyReason::NoRows));
    }

    let width = data.iter().map(|row| row.cells.len()).max().unwrap_or(0);
    if width == 0 {
        return Err(ExtractError::Empty(EmptyReason::NoColumns));
    }

    let rows: Vec<Vec<CellValue>> = data
        .iter()
        .map(|row| {
            row.cells
                .iter()
                .take(width)
                .map(|cell| CellValue::from_raw(cell))
                .collect()
        })
        .collect();

    if rows.iter().flatten().all(CellValue::is_missing) {
        return Err(ExtractError::Empty(EmptyReason::AllMissing));
    }

    let columns = column_names(head, width);
    Ok(Dataset::new(node.index, node.caption.clone(), columns, rows))
}

/// Lay cells out on a grid, repeating spanned cells into every slot they
/// cover.
fn expand_spans(node: &RawTableNode) -> Vec<GridRow> {
    // Per column: text still spanning down, and how many more rows it covers.
    let mut carried: Vec<Option<(String, usize)>> = Vec::new();
    let mut grid = Vec::with_capacity(node.rows.len());

    for row in &node.rows {
        let mut cells: Vec<String> = Vec::new();
        let mut col = 0;

        for raw in &row.cells {
            fill_carried(&mut carried, &mut cells, &mut col, true);
            place(raw, &mut cells, &mut col, &mut carried);
        }
        if row.cells.is_empty() {
            // A cell-less row still uses up one row of every active rowspan.
            expire_one_row(&mut carried);
        } else {
            fill_carried(&mut carried, &mut cells, &mut col, false);
        }

        grid.push(GridRow {
            cells,
            structural_header: row.is_structural_header(),
        });
    }

    grid
}

/// Copy cells spanning down from earlier rows into this row, starting at
/// `col`. With `stop_at_gap` only the contiguous run is filled.
fn fill_carried(
    carried: &mut [Option<(String, usize)>],
    cells: &mut Vec<String>,
    col: &mut usize,
    stop_at_gap: bool,
) {
    while *col < carried.len() {
        match carried[*col].take() {
            Some((cell, remaining)) => {
                if remaining > 1 {
                    carried[*col] = Some((cell.clone(), remaining - 1));
                }
                cells.resize(*col, String::new());
                cells.push(cell);
                *col += 1;
            }
            None if stop_at_gap => break,
            None => *col += 1,
        }
    }
}

fn expire_one_row(carried: &mut [Option<(String, usize)>]) {
    for slot in carried.iter_mut() {
        *slot = match slot.take() {
            Some((cell, remaining)) if remaining > 1 => Some((cell, remaining - 1)),
            _ => None,
        };
    }
}

fn place(
    raw: &RawCell,
    cells: &mut Vec<String>,
    col: &mut usize,
    carried: &mut Vec<Option<(String, usize)>>,
) {
    for _ in 0..raw.colspan {
        if raw.rowspan > 1 {
            if carried.len() <= *col {
                carried.resize(*col + 1, None);
            }
            carried[*col] = Some((raw.text.clone(), raw.rowspan - 1));
        }
        cells.push(raw.text.clone());
        *col += 1;
    }
}

/// Number of leading grid rows that form the header.
fn count_header_rows(grid: &[GridRow], policy: HeaderPolicy) -> usize {
    if policy == HeaderPolicy::None {
        return 0;
    }

    let leading = grid
        .iter()
        .take_while(|row| row.structural_header || row.cells.is_empty())
        .count();
    let structural = grid[..leading]
        .iter()
        .rposition(|row| row.structural_header)
        .map_or(0, |last| last + 1);
    if structural > 0 {
        return structural;
    }

    if policy == HeaderPolicy::StructuralOrInferred {
        if let Some(first) = grid.iter().position(|row| !row.cells.is_empty()) {
            if first_row_reads_as_header(&grid[first], &grid[first + 1..]) {
                return first + 1;
            }
        }
    }
    0
}

/// A first row reads as a header when every label is non-empty text and at
/// least one of its columns holds only numbers below it.
fn first_row_reads_as_header(first: &GridRow, rest: &[GridRow]) -> bool {
    let rest: Vec<&GridRow> = rest.iter().filter(|r| !r.cells.is_empty()).collect();
    if rest.is_empty() {
        return false;
    }

    let labels: Vec<String> = first.cells.iter().map(|c| normalize_ws(c)).collect();
    if labels.iter().any(|l| l.is_empty() || looks_numeric(l)) {
        return false;
    }

    (0..labels.len()).any(|col| {
        let mut values = rest
            .iter()
            .filter_map(|row| row.cells.get(col))
            .map(|cell| normalize_ws(cell))
            .filter(|text| !text.is_empty())
            .peekable();
        values.peek().is_some() && values.all(|text| looks_numeric(&text))
    })
}

/// Build unique column names from the header rows.
fn column_names(head: &[GridRow], width: usize) -> Vec<String> {
    let mut names = Vec::with_capacity(width);
    let mut used: HashSet<String> = HashSet::with_capacity(width);

    for col in 0..width {
        let mut parts: Vec<String> = Vec::new();
        for row in head {
            if let Some(cell) = row.cells.get(col) {
                let text = normalize_ws(cell);
                if !text.is_empty() && !parts.contains(&text) {
                    parts.push(text);
                }
            }
        }

        let base = if parts.is_empty() {
            format!("col_{col}")
        } else {
            parts.join(" ")
        };

        let mut name = base.clone();
        let mut suffix = 1;
        while used.contains(&name) {
            name = format!("{base}_{suffix}");
            suffix += 1;
        }
        used.insert(name.clone());
        names.push(name);
    }

    names
}
