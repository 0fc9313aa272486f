//! Statement and transaction data models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single physical line of acquired statement text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextLine {
    /// Document-global line number (1-indexed).
    pub number: usize,

    /// Page the line came from (1-indexed).
    pub page: usize,

    /// Raw line content, untrimmed.
    pub content: String,
}

impl TextLine {
    pub fn new(number: usize, page: usize, content: impl Into<String>) -> Self {
        Self {
            number,
            page,
            content: content.into(),
        }
    }

    /// Number a sequence of raw strings as page 1 lines.
    ///
    /// Handy for feeding already-split text straight into a line grammar.
    pub fn from_strs<S: AsRef<str>>(lines: &[S]) -> Vec<TextLine> {
        lines
            .iter()
            .enumerate()
            .map(|(i, l)| TextLine::new(i + 1, 1, l.as_ref()))
            .collect()
    }
}

/// A transaction extracted from a statement line (or merged lines).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Posting date, exactly as printed.
    pub post_date: String,

    /// Transaction date, exactly as printed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trans_date: Option<String>,

    /// Free-text description, possibly merged across lines.
    pub description: String,

    /// Bank-assigned reference code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    /// Fees charged with the transaction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fees: Option<Decimal>,

    /// Signed amount; negative is a debit.
    pub amount: Decimal,

    /// Running balance after the transaction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<Decimal>,

    /// Line the record started on.
    pub source_line_number: usize,
}

/// Why acquisition went to OCR instead of the embedded text layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrTrigger {
    /// Caller asked for OCR.
    Forced,
    /// Text-layer extraction returned an error.
    TextLayerFailed,
    /// Text layer produced no lines (scanned document).
    EmptyTextLayer,
    /// Text layer looked like mis-decoded font output.
    Garbled,
}

/// Everything extracted from one statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementExtractionResult {
    /// Statement-level date, as printed.
    pub statement_date: Option<String>,

    /// Transactions in ascending `source_line_number` order.
    pub transactions: Vec<TransactionRecord>,

    /// Whether the lines came from OCR.
    pub ocr_used: bool,

    /// Reason for OCR, when it was used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_trigger: Option<OcrTrigger>,

    /// Name of the line grammar that produced the transactions.
    pub strategy: String,
}

impl StatementExtractionResult {
    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    /// Sum of all transaction amounts.
    pub fn total_amount(&self) -> Decimal {
        self.transactions.iter().map(|t| t.amount).sum()
    }

    /// Sum of fees across transactions that carry them.
    pub fn total_fees(&self) -> Decimal {
        self.transactions.iter().filter_map(|t| t.fees).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn record(line: usize, amount: &str, fees: Option<&str>) -> TransactionRecord {
        TransactionRecord {
            post_date: "01/05/2024".to_string(),
            trans_date: Some("01/05/2024".to_string()),
            description: "TEST".to_string(),
            reference: None,
            fees: fees.map(|f| Decimal::from_str(f).unwrap()),
            amount: Decimal::from_str(amount).unwrap(),
            balance: None,
            source_line_number: line,
        }
    }

    #[test]
    fn test_totals() {
        let result = StatementExtractionResult {
            statement_date: None,
            transactions: vec![
                record(1, "2500.00", None),
                record(2, "-87.23", Some("-1.50")),
            ],
            ocr_used: false,
            ocr_trigger: None,
            strategy: "generic".to_string(),
        };

        assert_eq!(result.transaction_count(), 2);
        assert_eq!(result.total_amount(), Decimal::from_str("2412.77").unwrap());
        assert_eq!(result.total_fees(), Decimal::from_str("-1.50").unwrap());
    }

    #[test]
    fn test_record_serialization_skips_missing_fields() {
        let json = serde_json::to_value(record(3, "-87.23", None)).unwrap();
        assert!(json.get("reference").is_none());
        assert!(json.get("balance").is_none());
        assert_eq!(json["source_line_number"], 3);
    }

    #[test]
    fn test_from_strs_numbers_lines() {
        let lines = TextLine::from_strs(&["a", "b"]);
        assert_eq!(lines[0], TextLine::new(1, 1, "a"));
        assert_eq!(lines[1].number, 2);
    }
}
