//! Table discovery
//!
//! Uses the scraper crate (html5ever underneath), so malformed markup is
//! recovered rather than rejected.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Node, Selector};
use serde::Serialize;
use tracing::debug;

static SELECTOR_TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("Invalid table selector"));

/// HTML caps `colspan` at 1000 and `rowspan` at 65534.
const MAX_COLSPAN: usize = 1000;
const MAX_ROWSPAN: usize = 65534;

/// One `<td>` or `<th>` as found in the markup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawCell {
    pub text: String,
    pub is_header: bool,
    pub colspan: usize,
    pub rowspan: usize,
}

impl RawCell {
    pub fn data(text: &str) -> Self {
        Self {
            text: text.to_string(),
            is_header: false,
            colspan: 1,
            rowspan: 1,
        }
    }

    pub fn header(text: &str) -> Self {
        Self {
            is_header: true,
            ..Self::data(text)
        }
    }

    pub fn with_span(mut self, colspan: usize, rowspan: usize) -> Self {
        self.colspan = colspan.clamp(1, MAX_COLSPAN);
        self.rowspan = rowspan.clamp(1, MAX_ROWSPAN);
        self
    }
}

/// One `<tr>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawRow {
    pub cells: Vec<RawCell>,
    /// Row sits inside `<thead>`
    pub in_head: bool,
}

impl RawRow {
    pub fn new(cells: Vec<RawCell>) -> Self {
        Self {
            cells,
            in_head: false,
        }
    }

    pub fn head(cells: Vec<RawCell>) -> Self {
        Self {
            cells,
            in_head: true,
        }
    }

    /// Marked up as a header row: inside `<thead>` or made only of `<th>`.
    pub fn is_structural_header(&self) -> bool {
        !self.cells.is_empty() && (self.in_head || self.cells.iter().all(|c| c.is_header))
    }
}

/// Structure of one `<table>` element, detached from the parsed document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawTableNode {
    /// Position among all tables on the page, in document order
    pub index: usize,
    pub caption: Option<String>,
    pub rows: Vec<RawRow>,
}

impl RawTableNode {
    pub fn new(index: usize, rows: Vec<RawRow>) -> Self {
        Self {
            index,
            caption: None,
            rows,
        }
    }
}

/// Find every `<table>` in `html`, nested ones included, in document order.
///
/// Never fails: a page without tables yields an empty vector.
pub fn locate(html: &str) -> Vec<RawTableNode> {
    let document = Html::parse_document(html);

    let tables: Vec<RawTableNode> = document
        .select(&SELECTOR_TABLE)
        .enumerate()
        .map(|(index, table)| read_table(index, table))
        .collect();

    debug!(tables = tables.len(), "located tables");
    tables
}

fn read_table(index: usize, table: ElementRef) -> RawTableNode {
    let mut node = RawTableNode::new(index, Vec::new());
    collect_rows(table, false, &mut node);
    node
}

/// Walk the table's own structure, stopping at nested tables.
fn collect_rows(parent: ElementRef, in_head: bool, node: &mut RawTableNode) {
    for child in parent.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "table" => {}
            "caption" => {
                if node.caption.is_none() {
                    let text = crate::dataset::normalize_ws(&cell_text(child));
                    if !text.is_empty() {
                        node.caption = Some(text);
                    }
                }
            }
            "tr" => node.rows.push(read_row(child, in_head)),
            "thead" => collect_rows(child, true, node),
            "tbody" | "tfoot" => collect_rows(child, false, node),
            _ => collect_rows(child, in_head, node),
        }
    }
}

fn read_row(tr: ElementRef, in_head: bool) -> RawRow {
    let cells = tr
        .children()
        .filter_map(ElementRef::wrap)
        .filter_map(|cell| {
            let el = cell.value();
            let is_header = match el.name() {
                "th" => true,
                "td" => false,
                _ => return None,
            };
            Some(
                RawCell {
                    text: cell_text(cell),
                    is_header,
                    colspan: 1,
                    rowspan: 1,
                }
                .with_span(span_attr(el.attr("colspan")), span_attr(el.attr("rowspan"))),
            )
        })
        .collect();

    RawRow { cells, in_head }
}

/// Missing or garbage spans count as 1; `rowspan="0"` is treated as 1.
fn span_attr(value: Option<&str>) -> usize {
    value
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(1)
}

/// Text content of a cell, skipping nested tables and scripts.
fn cell_text(el: ElementRef) -> String {
    let mut out = String::new();
    push_text(el, &mut out);
    out
}

fn push_text(el: ElementRef, out: &mut String) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(&text.text),
            Node::Element(inner) => match inner.name() {
                "table" | "script" | "style" => {}
                "br" => out.push(' '),
                _ => {
                    if let Some(inner) = ElementRef::wrap(child) {
                        push_text(inner, out);
                    }
                }
            },
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(row: &RawRow) -> Vec<&str> {
        row.cells.iter().map(|c| c.text.trim()).collect()
    }

    #[test]
    fn test_no_tables() {
        assert!(locate("<html><body><p>nothing here</p></body></html>").is_empty());
        assert!(locate("").is_empty());
    }

    #[test]
    fn test_counts_tables_in_document_order() {
        for k in 0..5 {
            let html: String = (0..k)
                .map(|i| format!("<div><table><tr><td>t{i}</td></tr></table></div>"))
                .collect();
            let tables = locate(&html);
            assert_eq!(tables.len(), k);
            for (i, table) in tables.iter().enumerate() {
                assert_eq!(table.index, i);
                assert_eq!(texts(&table.rows[0]), vec![format!("t{i}").as_str()]);
            }
        }
    }

    #[test]
    fn test_nested_tables_reported_once() {
        let html = r#"
        <table id="outer">
            <tr><td>outer cell <table><tr><td>inner</td><td>x</td></tr></table></td></tr>
            <tr><td>second</td></tr>
        </table>
        <table><tr><td>sibling</td></tr></table>
        "#;

        let tables = locate(html);
        assert_eq!(tables.len(), 3);

        // Outer first, then the nested one, then the sibling.
        assert_eq!(tables[0].rows.len(), 2);
        assert_eq!(texts(&tables[0].rows[0]), vec!["outer cell"]);
        assert_eq!(texts(&tables[1].rows[0]), vec!["inner", "x"]);
        assert_eq!(texts(&tables[2].rows[0]), vec!["sibling"]);
    }

    #[test]
    fn test_header_markup_and_caption() {
        let html = r#"
        <table>
            <caption> Population
              by city </caption>
            <thead><tr><td>City</td><td>People</td></tr></thead>
            <tbody>
                <tr><th>Lisbon</th><td>545,000</td></tr>
            </tbody>
        </table>
        "#;

        let table = &locate(html)[0];
        assert_eq!(table.caption.as_deref(), Some("Population by city"));
        assert!(table.rows[0].in_head);
        assert!(table.rows[0].is_structural_header());
        assert!(!table.rows[1].is_structural_header());
        assert!(table.rows[1].cells[0].is_header);
    }

    #[test]
    fn test_malformed_markup_is_recovered() {
        let html = "<table><tr><td>a<td>b<tr><td>c</table><p>after";
        let tables = locate(html);
        assert_eq!(tables.len(), 1);
        assert_eq!(texts(&tables[0].rows[0]), vec!["a", "b"]);
        assert_eq!(texts(&tables[0].rows[1]), vec!["c"]);
    }

    #[test]
    fn test_spans_and_line_breaks() {
        let html = r#"<table><tr><td colspan="2" rowspan="abc">a<br>b</td><td colspan="99999">c</td></tr></table>"#;
        let row = &locate(html)[0].rows[0];
        assert_eq!(row.cells[0].colspan, 2);
        assert_eq!(row.cells[0].rowspan, 1);
        assert_eq!(row.cells[0].text, "a b");
        assert_eq!(row.cells[1].colspan, MAX_COLSPAN);
    }
}
