//! Lenient number parsing for scraped cell text

use std::sync::LazyLock;

use regex::Regex;

static PLAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").expect("Invalid plain number regex")
});
/// 1,234,567.89
static GROUPED_COMMA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{1,3}(,\d{3})+(\.\d+)?$").expect("Invalid comma grouping regex")
});
/// 1.234.567,89
static GROUPED_DOT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{1,3}(\.\d{3})+(,\d+)?$").expect("Invalid dot grouping regex")
});
/// 1 234 567,89 or 1'234'567.89
static GROUPED_SPACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{1,3}([ '’]\d{3})+([.,]\d+)?$").expect("Invalid space grouping regex")
});
/// 3,14
static DECIMAL_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+,\d+$").expect("Invalid decimal comma regex"));

const CURRENCY_SYMBOLS: &[&str] = &[
    "US$", "R$", "A$", "C$", "$", "€", "£", "¥", "₹", "₩", "₽", "₺", "₴", "₦", "₱", "฿", "₫", "¢",
];
const CURRENCY_CODES: &[&str] = &[
    "USD", "EUR", "GBP", "JPY", "BRL", "CAD", "AUD", "CHF", "CNY", "INR",
];

/// Parse cell text as a number.
///
/// Accepts `.` or `,` decimals, grouped thousands, a sign, accounting
/// negatives like `(1,200)`, surrounding currency markers and a trailing `%`
/// (`"45%"` parses as `45.0`). Returns `None` for anything else, including
/// `NaN` and infinity spellings.
pub fn parse_number(text: &str) -> Option<f64> {
    let mut rest = text.trim();
    let mut negative = false;

    if let Some(inner) = rest.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        negative = true;
        rest = inner.trim();
    }

    rest = strip_sign(rest, &mut negative)?;
    if let Some(r) = rest.strip_suffix('%') {
        rest = r.trim_end();
    }
    rest = strip_currency(rest);
    rest = strip_sign(rest, &mut negative)?;

    let canonical = canonical_digits(rest)?;
    let value: f64 = canonical.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(if negative { -value } else { value })
}

pub fn looks_numeric(text: &str) -> bool {
    parse_number(text).is_some()
}

/// Strip one leading sign. A second sign makes the text invalid.
fn strip_sign<'a>(text: &'a str, negative: &mut bool) -> Option<&'a str> {
    let mut chars = text.chars();
    match chars.next() {
        Some('-') | Some('\u{2212}') => {
            if *negative {
                return None;
            }
            *negative = true;
            Some(chars.as_str().trim_start())
        }
        Some('+') => Some(chars.as_str().trim_start()),
        _ => Some(text),
    }
}

fn strip_currency(text: &str) -> &str {
    let mut rest = text;
    for marker in CURRENCY_SYMBOLS.iter().chain(CURRENCY_CODES) {
        if let Some(r) = rest.strip_prefix(marker) {
            rest = r.trim_start();
            break;
        }
    }
    for marker in CURRENCY_SYMBOLS.iter().chain(CURRENCY_CODES) {
        if let Some(r) = rest.strip_suffix(marker) {
            rest = r.trim_end();
            break;
        }
    }
    rest
}

/// Rewrite a localized number into the form `f64::from_str` understands.
fn canonical_digits(text: &str) -> Option<String> {
    if PLAIN.is_match(text) {
        return Some(text.to_string());
    }
    if GROUPED_COMMA.is_match(text) {
        return Some(text.replace(',', ""));
    }
    if GROUPED_DOT.is_match(text) {
        return Some(text.replace('.', "").replace(',', "."));
    }
    if GROUPED_SPACE.is_match(text) {
        return Some(
            text.chars()
                .filter(|c| !matches!(c, ' ' | '\'' | '’'))
                .map(|c| if c == ',' { '.' } else { c })
                .collect(),
        );
    }
    if DECIMAL_COMMA.is_match(text) {
        return Some(text.replace(',', "."));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_numbers() {
        assert_eq!(parse_number("1"), Some(1.0));
        assert_eq!(parse_number(" 2.5 "), Some(2.5));
        assert_eq!(parse_number(".5"), Some(0.5));
        assert_eq!(parse_number("-3"), Some(-3.0));
        assert_eq!(parse_number("+3"), Some(3.0));
        assert_eq!(parse_number("\u{2212}7"), Some(-7.0));
        assert_eq!(parse_number("1e3"), Some(1000.0));
    }

    #[test]
    fn test_separators() {
        assert_eq!(parse_number("1,234"), Some(1234.0));
        assert_eq!(parse_number("1,234,567.89"), Some(1234567.89));
        assert_eq!(parse_number("1.234.567,89"), Some(1234567.89));
        assert_eq!(parse_number("1.234"), Some(1.234));
        assert_eq!(parse_number("3,14"), Some(3.14));
        assert_eq!(parse_number("1 234 567"), Some(1234567.0));
        assert_eq!(parse_number("1'234.5"), Some(1234.5));
    }

    #[test]
    fn test_currency_and_percent() {
        assert_eq!(parse_number("$1,200.50"), Some(1200.5));
        assert_eq!(parse_number("R$ 1.234,56"), Some(1234.56));
        assert_eq!(parse_number("12,50 €"), Some(12.5));
        assert_eq!(parse_number("45%"), Some(45.0));
        assert_eq!(parse_number("-$5"), Some(-5.0));
        assert_eq!(parse_number("$-5"), Some(-5.0));
        assert_eq!(parse_number("(1,200)"), Some(-1200.0));
        assert_eq!(parse_number("100 USD"), Some(100.0));
    }

    #[test]
    fn test_rejects_non_numbers() {
        for text in [
            "", "n/a", "NaN", "inf", "infinity", "-", "$", "1,23,4", "12abc", "1.2.3,4,5", "--5",
            "(-5)", "1e999", "abc 5",
        ] {
            assert_eq!(parse_number(text), None, "{text:?}");
        }
    }
}
