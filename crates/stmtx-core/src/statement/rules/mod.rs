//! Token-level rules shared by the line grammars.

pub mod amounts;
pub mod dates;
pub mod patterns;
pub mod reference;

pub use amounts::{parse_amount, AmountExtractor, TableAmountExtractor};
pub use dates::{normalize_date, DateExtractor, DateOrder, ShortDateExtractor, StatementDateExtractor};
pub use reference::is_reference_code;

use regex::{Match, Regex};

/// Trait for token extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the first occurrence from text.
    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    /// Extract all occurrences, left to right.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A matched token with its parsed value and byte span in the source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<T> {
    /// Parsed value.
    pub value: T,
    /// Matched substring.
    pub source: String,
    /// Byte offset of the match start.
    pub start: usize,
    /// Byte offset one past the match end.
    pub end: usize,
}

impl<T> Token<T> {
    pub fn new(value: T, m: &Match<'_>) -> Self {
        Self {
            value,
            source: m.as_str().to_string(),
            start: m.start(),
            end: m.end(),
        }
    }
}

/// A signed monetary token.
pub type AmountToken = Token<rust_decimal::Decimal>;

/// Find non-overlapping matches left to right, letting `accept` veto a
/// candidate. A vetoed candidate only advances the scan by one character, so
/// a shorter match starting later is still found.
pub(crate) fn scan_matches<'t>(
    pattern: &Regex,
    text: &'t str,
    accept: impl Fn(&str, &Match<'t>) -> bool,
) -> Vec<Match<'t>> {
    let mut found = Vec::new();
    let mut pos = 0;

    while pos < text.len() {
        let Some(m) = pattern.find_at(text, pos) else {
            break;
        };

        if m.end() > m.start() && accept(text, &m) {
            found.push(m);
            pos = m.end();
        } else {
            let step = text[m.start()..].chars().next().map_or(1, char::len_utf8);
            pos = m.start() + step;
        }
    }

    found
}

/// The character immediately before byte offset `at`.
pub(crate) fn char_before(text: &str, at: usize) -> Option<char> {
    text[..at].chars().next_back()
}

/// Remove byte spans from `text` and collapse the remaining whitespace.
///
/// Spans must be sorted and non-overlapping.
pub(crate) fn strip_spans(text: &str, spans: &[(usize, usize)]) -> String {
    let mut kept = String::with_capacity(text.len());
    let mut cursor = 0;

    for &(start, end) in spans {
        if start < cursor {
            continue;
        }
        kept.push_str(&text[cursor..start]);
        kept.push(' ');
        cursor = end;
    }
    kept.push_str(&text[cursor..]);

    collapse_whitespace(&kept)
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_matches_skips_vetoed_candidates() {
        let re = Regex::new(r"\d+").unwrap();
        let found = scan_matches(&re, "a12 b3", |text, m| char_before(text, m.start()) != Some('a'));
        let texts: Vec<&str> = found.iter().map(|m| m.as_str()).collect();
        assert_eq!(texts, vec!["2", "3"]);
    }

    #[test]
    fn test_strip_spans() {
        let text = "01/05/2024 PAYROLL  DEPOSIT 2500.00";
        assert_eq!(strip_spans(text, &[(0, 10), (28, 35)]), "PAYROLL DEPOSIT");
    }
}
