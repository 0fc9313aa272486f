//! Common regex patterns for statement line grammars.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Generic date anchor: M/D/Y, M-D-Y, Y-M-D, D.M.Y and "Jan 15, 2024"
    pub static ref DATE_ANCHOR: Regex = Regex::new(concat!(
        r"\b(?:",
        r"\d{1,2}/\d{1,2}/\d{2,4}",
        r"|\d{1,2}-\d{1,2}-\d{2,4}",
        r"|\d{4}-\d{1,2}-\d{1,2}",
        r"|\d{1,2}\.\d{1,2}\.\d{2,4}",
        r"|[A-Z][a-z]{2}\s+\d{1,2},?\s+\d{4}",
        r")\b"
    )).unwrap();

    // Generic amount anchor: $1,234.56 | 1,234.56€ | -1,234.56 | (1,234.56)
    pub static ref AMOUNT_ANCHOR: Regex = Regex::new(concat!(
        r"-?[$€£¥]\s*-?(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d{2})?",
        r"|-?(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d{2})?\s*[$€£¥]",
        r"|-?(?:\d{1,3}(?:,\d{3})+|\d+)\.\d{2}\b",
        r"|\((?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d{2})?\)"
    )).unwrap();

    // Short-year dates printed in OCR'd table rows: 07/06/23
    pub static ref SHORT_DATE: Regex = Regex::new(
        r"\b\d{2}/\d{2}/\d{2}\b"
    ).unwrap();

    // Table amounts: -7.50, -10 000.00, +114 337.50, 1,234.56
    pub static ref TABLE_AMOUNT: Regex = Regex::new(
        r"[+-]?(?:\d{1,3}(?:[ ,]\d{3})+|\d+)\.\d{2}"
    ).unwrap();

    // Header keywords that introduce the statement date
    pub static ref STATEMENT_DATE_HEADER: Regex = Regex::new(
        r"(?i)statement date|as of|period ending|date:"
    ).unwrap();

    // Rows that look like transactions but only carry running totals
    pub static ref TABLE_BOILERPLATE: Regex = Regex::new(
        r"(?i)balance brought forward|interest rate"
    ).unwrap();

    // Currency symbols stripped before numeric conversion
    pub static ref CURRENCY_SYMBOLS: Regex = Regex::new(
        r"[$€£¥]"
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_anchor_formats() {
        for sample in ["01/05/2024", "1-5-24", "2024-01-15", "15.01.2024", "Jan 15, 2024"] {
            let m = DATE_ANCHOR.find(sample).unwrap();
            assert_eq!(m.as_str(), sample);
        }
    }

    #[test]
    fn test_amount_anchor_takes_whole_digit_run() {
        let m = AMOUNT_ANCHOR.find("PAYROLL DEPOSIT 2500.00").unwrap();
        assert_eq!(m.as_str(), "2500.00");
    }

    #[test]
    fn test_table_amount_space_grouping() {
        let found: Vec<&str> = TABLE_AMOUNT
            .find_iter("-7.50 -10 000.00 +114 337.50")
            .map(|m| m.as_str())
            .collect();
        assert_eq!(found, vec!["-7.50", "-10 000.00", "+114 337.50"]);
    }
}
