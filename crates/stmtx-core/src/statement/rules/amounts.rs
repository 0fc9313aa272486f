//! Amount extraction for statement lines.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::{AMOUNT_ANCHOR, CURRENCY_SYMBOLS, TABLE_AMOUNT};
use super::{char_before, scan_matches, AmountToken, FieldExtractor};

/// Currency-aware amount extractor for free-form statement lines.
///
/// A candidate glued to a preceding digit, separator or slash is part of a
/// larger number or date and is skipped. A trailing-symbol candidate that is
/// immediately followed by another number is skipped too, so `100 $50.00`
/// yields `$50.00` rather than `100 $`.
pub struct AmountExtractor;

impl AmountExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    type Output = AmountToken;

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        scan_matches(&AMOUNT_ANCHOR, text, accept_amount)
            .into_iter()
            .filter_map(|m| parse_amount(m.as_str()).map(|value| AmountToken::new(value, &m)))
            .collect()
    }
}

fn accept_amount(text: &str, m: &regex::Match<'_>) -> bool {
    if glued_to_number(text, m) {
        return false;
    }

    // 15.01 in 15.01.2024 is the front of a date
    let mut after = text[m.end()..].chars();
    if matches!(after.next(), Some('.' | '/')) && after.next().is_some_and(|c| c.is_ascii_digit()) {
        return false;
    }

    let symbols = ['$', '€', '£', '¥'];
    let raw = m.as_str();
    if raw.ends_with(symbols) && !raw.trim_start_matches('-').starts_with(symbols) {
        let rest = text[m.end()..].trim_start();
        if rest.starts_with(|c: char| c.is_ascii_digit()) {
            return false;
        }
    }

    true
}

fn glued_to_number(text: &str, m: &regex::Match<'_>) -> bool {
    matches!(char_before(text, m.start()), Some(c) if c.is_ascii_digit() || matches!(c, '.' | ',' | '/'))
}

/// Extractor for the signed, space-grouped amounts printed in table rows.
///
/// Candidates starting inside a longer digit run are skipped, so a reference
/// like `12345678` next to `100.00` does not turn into `678 100.00`.
pub struct TableAmountExtractor;

impl TableAmountExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TableAmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for TableAmountExtractor {
    type Output = AmountToken;

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        scan_matches(&TABLE_AMOUNT, text, |text, m| !glued_to_number(text, m))
            .into_iter()
            .filter_map(|m| parse_amount(m.as_str()).map(|value| AmountToken::new(value, &m)))
            .collect()
    }
}

/// Parse a printed amount into a signed decimal.
///
/// Parentheses mean negative. Currency symbols, thousands separators, spaces
/// and a leading `+` are dropped. Returns `None` when nothing numeric remains.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let trimmed = s.trim();

    let (negated, body) = match trimmed.strip_prefix('(').and_then(|r| r.strip_suffix(')')) {
        Some(inner) => (true, inner),
        None => (false, trimmed),
    };

    let cleaned: String = CURRENCY_SYMBOLS
        .replace_all(body, "")
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace() && *c != '\u{00a0}')
        .collect();
    let cleaned = cleaned.strip_prefix('+').unwrap_or(cleaned.as_str());

    if cleaned.is_empty() {
        return None;
    }

    let value = Decimal::from_str(cleaned).ok()?;
    Some(if negated { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("(1,234.56)"), Some(dec("-1234.56")));
        assert_eq!(parse_amount("$1,234.56"), Some(dec("1234.56")));
        assert_eq!(parse_amount("-$87.23"), Some(dec("-87.23")));
        assert_eq!(parse_amount("1 234.56 €"), Some(dec("1234.56")));
        assert_eq!(parse_amount("+114 337.50"), Some(dec("114337.50")));
        assert_eq!(parse_amount("£ 5"), Some(dec("5")));
    }

    #[test]
    fn test_parse_amount_rejects_non_numeric() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("$"), None);
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount("()"), None);
    }

    #[test]
    fn test_extract_all_left_to_right() {
        let extractor = AmountExtractor::new();
        let found = extractor.extract_all("Fee -1.50 then $1,200.00 and (3.00)");
        let values: Vec<Decimal> = found.iter().map(|t| t.value).collect();
        assert_eq!(values, vec![dec("-1.50"), dec("1200.00"), dec("-3.00")]);
        assert_eq!(found[1].source, "$1,200.00");
    }

    #[test]
    fn test_extract_skips_suffix_symbol_followed_by_number() {
        let extractor = AmountExtractor::new();
        let first = extractor.extract("ITEM 100 $50.00").unwrap();
        assert_eq!(first.source, "$50.00");
        assert_eq!(first.value, dec("50.00"));
    }

    #[test]
    fn test_extract_suffix_symbol() {
        let extractor = AmountExtractor::new();
        let first = extractor.extract("CAFE PARIS 12.40 €").unwrap();
        assert_eq!(first.value, dec("12.40"));
    }

    #[test]
    fn test_no_amount_in_plain_words() {
        let extractor = AmountExtractor::new();
        assert!(extractor.extract("ACME CORP PAYROLL").is_none());
        assert!(extractor.extract("STORE 1234").is_none());
    }

    #[test]
    fn test_dotted_date_is_not_an_amount() {
        let extractor = AmountExtractor::new();
        assert!(extractor.extract("PAID ON 15.01.2024").is_none());
        assert_eq!(extractor.extract("PAID ON 15.01.2024 4.50").unwrap().value, dec("4.50"));
    }

    #[test]
    fn test_table_amount_not_glued_to_reference() {
        let extractor = TableAmountExtractor::new();
        let found = extractor.extract_all("12345678 100.00 +2 500.00");
        let sources: Vec<&str> = found.iter().map(|t| t.source.as_str()).collect();
        assert_eq!(sources, vec!["100.00", "+2 500.00"]);
    }

    #[test]
    fn test_table_amounts() {
        let extractor = TableAmountExtractor::new();
        let values: Vec<Decimal> = extractor
            .extract_all("REF -7.50 -10 000.00 +114 337.50")
            .into_iter()
            .map(|t| t.value)
            .collect();
        assert_eq!(values, vec![dec("-7.50"), dec("-10000.00"), dec("114337.50")]);
    }
}
