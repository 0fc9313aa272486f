//! Date extraction and normalization for statement lines.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::patterns::{DATE_ANCHOR, SHORT_DATE, STATEMENT_DATE_HEADER};
use super::{FieldExtractor, Token};
use crate::models::TextLine;

/// Multi-format date extractor. Values are kept exactly as printed.
pub struct DateExtractor;

impl DateExtractor {
    pub fn new() -> Self {
        Self
    }

    /// The first date on the line, if it starts within `window` characters.
    ///
    /// Only the leftmost date is considered: a line whose first date sits past
    /// the window has no anchor even if a later date would also be too far.
    pub fn anchor(&self, line: &str, window: usize) -> Option<Token<String>> {
        let token = self.extract(line)?;
        let offset = line[..token.start].chars().count();
        (offset < window).then_some(token)
    }
}

impl Default for DateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateExtractor {
    type Output = Token<String>;

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        DATE_ANCHOR
            .find_iter(text)
            .map(|m| Token::new(m.as_str().to_string(), &m))
            .collect()
    }
}

/// Extractor for the `DD/DD/DD` dates printed in OCR'd table rows.
pub struct ShortDateExtractor;

impl ShortDateExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ShortDateExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for ShortDateExtractor {
    type Output = Token<String>;

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        SHORT_DATE
            .find_iter(text)
            .map(|m| Token::new(m.as_str().to_string(), &m))
            .collect()
    }
}

/// Finds the statement-level date in the header lines of a statement.
#[derive(Debug, Clone)]
pub struct StatementDateExtractor {
    scan_lines: usize,
}

impl StatementDateExtractor {
    pub fn new(scan_lines: usize) -> Self {
        Self { scan_lines }
    }

    /// A keyword line ("Statement Date", "As of", ...) wins over any earlier
    /// date; otherwise the first date in the sample is returned.
    pub fn extract(&self, lines: &[TextLine]) -> Option<String> {
        let sample = &lines[..lines.len().min(self.scan_lines)];
        let dates = DateExtractor::new();

        let labeled = sample
            .iter()
            .filter(|line| STATEMENT_DATE_HEADER.is_match(&line.content))
            .find_map(|line| dates.extract(&line.content));

        labeled
            .or_else(|| sample.iter().find_map(|line| dates.extract(&line.content)))
            .map(|token| token.value)
    }
}

impl Default for StatementDateExtractor {
    fn default() -> Self {
        Self::new(10)
    }
}

/// How ambiguous all-numeric dates such as `03/04/2024` are read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateOrder {
    /// `MM/DD/YYYY`, the US layout.
    #[default]
    MonthFirst,
    /// `DD/MM/YYYY`.
    DayFirst,
}

/// Convert a printed date into a calendar date.
///
/// Numeric dates separated by `/` or `-` follow `order`, falling back to the
/// other order when the first reading is not a valid date. Dotted dates are
/// always day-first.
pub fn normalize_date(raw: &str, order: DateOrder) -> Option<NaiveDate> {
    let raw = raw.trim();

    if raw.starts_with(|c: char| c.is_ascii_alphabetic()) {
        let cleaned = raw.replace(',', " ");
        let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
        return NaiveDate::parse_from_str(&cleaned, "%b %d %Y").ok();
    }

    let separator = ['/', '-', '.'].into_iter().find(|s| raw.contains(*s))?;
    let parts: Vec<&str> = raw.split(separator).collect();
    if parts.len() != 3 || parts.iter().any(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_digit())) {
        return None;
    }

    if parts[0].len() == 4 {
        let year: i32 = parts[0].parse().ok()?;
        let month: u32 = parts[1].parse().ok()?;
        let day: u32 = parts[2].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    let first: u32 = parts[0].parse().ok()?;
    let second: u32 = parts[1].parse().ok()?;
    let year = parse_year(parts[2]);

    let order = if separator == '.' { DateOrder::DayFirst } else { order };
    let (month, day) = match order {
        DateOrder::MonthFirst => (first, second),
        DateOrder::DayFirst => (second, first),
    };

    NaiveDate::from_ymd_opt(year, month, day).or_else(|| {
        if separator == '.' {
            None
        } else {
            NaiveDate::from_ymd_opt(year, day, month)
        }
    })
}

fn parse_year(s: &str) -> i32 {
    let year: i32 = s.parse().unwrap_or(0);
    if year < 100 {
        // Two-digit year: 00-50 is 20xx, 51-99 is 19xx
        if year <= 50 {
            2000 + year
        } else {
            1900 + year
        }
    } else {
        year
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_anchor_window() {
        let extractor = DateExtractor::new();

        let token = extractor.anchor("01/05/2024 PAYROLL DEPOSIT 2500.00", 20).unwrap();
        assert_eq!(token.value, "01/05/2024");
        assert_eq!((token.start, token.end), (0, 10));

        let far = "TRANSFER FROM SAVINGS ACCOUNT 01/05/2024";
        assert!(extractor.anchor(far, 20).is_none());
        assert!(extractor.extract(far).is_some());
    }

    #[test]
    fn test_anchor_month_name() {
        let extractor = DateExtractor::new();
        let token = extractor.anchor("Jan 15, 2024 COFFEE 4.50", 20).unwrap();
        assert_eq!(token.value, "Jan 15, 2024");
    }

    #[test]
    fn test_short_dates() {
        let extractor = ShortDateExtractor::new();
        let found: Vec<String> = extractor
            .extract_all("07/06/23 08/06/23 Directors Fees 01/05/2024")
            .into_iter()
            .map(|t| t.value)
            .collect();
        assert_eq!(found, vec!["07/06/23", "08/06/23"]);
    }

    #[test]
    fn test_statement_date_prefers_header() {
        let lines = TextLine::from_strs(&[
            "FIRST NATIONAL BANK",
            "Printed 12/15/2023",
            "Account 0001234",
            "Statement Date: 01/31/2024",
            "01/05/2024 PAYROLL DEPOSIT 2500.00",
        ]);
        assert_eq!(
            StatementDateExtractor::default().extract(&lines),
            Some("01/31/2024".to_string())
        );
    }

    #[test]
    fn test_statement_date_falls_back_to_first_date() {
        let lines = TextLine::from_strs(&["BANK", "Summary 02/29/2024", "03/01/2024 X 1.00"]);
        assert_eq!(
            StatementDateExtractor::default().extract(&lines),
            Some("02/29/2024".to_string())
        );
    }

    #[test]
    fn test_statement_date_only_scans_header_lines() {
        let mut raw: Vec<String> = (0..10).map(|i| format!("header line {i}")).collect();
        raw.push("Statement Date: 01/31/2024".to_string());
        let lines = TextLine::from_strs(&raw);

        assert_eq!(StatementDateExtractor::default().extract(&lines), None);
    }

    #[test]
    fn test_normalize_numeric_orders() {
        assert_eq!(normalize_date("01/05/2024", DateOrder::MonthFirst), Some(ymd(2024, 1, 5)));
        assert_eq!(normalize_date("01/05/2024", DateOrder::DayFirst), Some(ymd(2024, 5, 1)));
        // 31 cannot be a month, so the other reading is used
        assert_eq!(normalize_date("31/01/2024", DateOrder::MonthFirst), Some(ymd(2024, 1, 31)));
        assert_eq!(normalize_date("07/06/23", DateOrder::DayFirst), Some(ymd(2023, 6, 7)));
        assert_eq!(normalize_date("1-5-99", DateOrder::MonthFirst), Some(ymd(1999, 1, 5)));
    }

    #[test]
    fn test_normalize_fixed_layouts() {
        assert_eq!(normalize_date("2024-01-15", DateOrder::DayFirst), Some(ymd(2024, 1, 15)));
        assert_eq!(normalize_date("15.01.2024", DateOrder::MonthFirst), Some(ymd(2024, 1, 15)));
        assert_eq!(normalize_date("Jan 15, 2024", DateOrder::MonthFirst), Some(ymd(2024, 1, 15)));
        assert_eq!(normalize_date("Feb  3 2024", DateOrder::MonthFirst), Some(ymd(2024, 2, 3)));
    }

    #[test]
    fn test_normalize_rejects_invalid() {
        assert_eq!(normalize_date("13/13/2024", DateOrder::MonthFirst), None);
        assert_eq!(normalize_date("31.02.2024", DateOrder::DayFirst), None);
        assert_eq!(normalize_date("not a date", DateOrder::MonthFirst), None);
        assert_eq!(normalize_date("", DateOrder::MonthFirst), None);
    }
}
