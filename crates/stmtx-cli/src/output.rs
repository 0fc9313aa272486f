//! Rendering extraction results as JSON, CSV or a text report.

use clap::ValueEnum;
use console::style;

use stmtx_core::models::StatementExtractionResult;
use stmtx_core::statement::rules::{normalize_date, DateOrder};

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output, one row per transaction
    Csv,
    /// Plain text report
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub fn format_result(
    result: &StatementExtractionResult,
    format: OutputFormat,
    order: DateOrder,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Csv => format_csv(result, order),
        OutputFormat::Text => Ok(format_text(result, order)),
    }
}

/// Printed date as ISO 8601, empty when it cannot be read.
fn iso_date(raw: &str, order: DateOrder) -> String {
    normalize_date(raw, order)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn format_csv(result: &StatementExtractionResult, order: DateOrder) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "post_date",
        "post_date_iso",
        "trans_date",
        "description",
        "reference",
        "fees",
        "amount",
        "balance",
        "source_line",
    ])?;

    for t in &result.transactions {
        wtr.write_record([
            t.post_date.as_str(),
            &iso_date(&t.post_date, order),
            t.trans_date.as_deref().unwrap_or(""),
            &t.description,
            t.reference.as_deref().unwrap_or(""),
            &t.fees.map(|f| f.to_string()).unwrap_or_default(),
            &t.amount.to_string(),
            &t.balance.map(|b| b.to_string()).unwrap_or_default(),
            &t.source_line_number.to_string(),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &StatementExtractionResult, order: DateOrder) -> String {
    let mut output = String::new();

    match &result.statement_date {
        Some(date) => {
            let iso = iso_date(date, order);
            if iso.is_empty() {
                output.push_str(&format!("Statement date: {}\n", date));
            } else {
                output.push_str(&format!("Statement date: {} ({})\n", date, iso));
            }
        }
        None => output.push_str("Statement date: unknown\n"),
    }
    output.push_str(&format!("Parser: {}\n", result.strategy));
    match result.ocr_trigger {
        Some(trigger) if result.ocr_used => output.push_str(&format!("OCR: yes ({:?})\n", trigger)),
        _ if result.ocr_used => output.push_str("OCR: yes\n"),
        _ => output.push_str("OCR: no\n"),
    }
    output.push('\n');

    for t in &result.transactions {
        output.push_str(&format!(
            "{:>5}  {:<10}  {:<40}  {:>12}",
            t.source_line_number,
            t.post_date,
            truncate(&t.description, 40),
            t.amount
        ));
        if let Some(balance) = t.balance {
            output.push_str(&format!("  {:>14}", balance));
        }
        output.push('\n');
    }

    output.push('\n');
    output.push_str(&format!("Transactions: {}\n", result.transaction_count()));
    output.push_str(&format!("Total amount: {}\n", result.total_amount()));
    if result.transactions.iter().any(|t| t.fees.is_some()) {
        output.push_str(&format!("Total fees:   {}\n", result.total_fees()));
    }

    output
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars - 1).collect();
        format!("{}…", head)
    }
}

/// One-line stderr summary after a successful extraction.
pub fn print_summary(result: &StatementExtractionResult) {
    let ocr = if result.ocr_used { " via OCR" } else { "" };
    eprintln!(
        "{} {} transactions, total {} ({} parser{})",
        style("ℹ").blue(),
        result.transaction_count(),
        result.total_amount(),
        result.strategy,
        ocr
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use stmtx_core::models::{OcrTrigger, TransactionRecord};
    use std::str::FromStr;

    fn sample() -> StatementExtractionResult {
        StatementExtractionResult {
            statement_date: Some("07/06/23".to_string()),
            transactions: vec![TransactionRecord {
                post_date: "07/06/23".to_string(),
                trans_date: Some("07/06/23".to_string()),
                description: "Directors Fees, Artiligence".to_string(),
                reference: Some("A0159924".to_string()),
                fees: Some(Decimal::from_str("-7.50").unwrap()),
                amount: Decimal::from_str("-10000.00").unwrap(),
                balance: Some(Decimal::from_str("114337.50").unwrap()),
                source_line_number: 2,
            }],
            ocr_used: true,
            ocr_trigger: Some(OcrTrigger::Garbled),
            strategy: "table_aware".to_string(),
        }
    }

    #[test]
    fn test_csv_adds_iso_date_and_quotes() {
        let csv = format_result(&sample(), OutputFormat::Csv, DateOrder::DayFirst).unwrap();
        let mut lines = csv.lines();
        assert!(lines.next().unwrap().starts_with("post_date,post_date_iso,"));
        assert_eq!(
            lines.next().unwrap(),
            "07/06/23,2023-06-07,07/06/23,\"Directors Fees, Artiligence\",A0159924,-7.50,-10000.00,114337.50,2"
        );
    }

    #[test]
    fn test_text_report() {
        let text = format_result(&sample(), OutputFormat::Text, DateOrder::DayFirst).unwrap();
        assert!(text.contains("Statement date: 07/06/23 (2023-06-07)"));
        assert!(text.contains("OCR: yes (Garbled)"));
        assert!(text.contains("Transactions: 1"));
        assert!(text.contains("Total fees:   -7.50"));
    }

    #[test]
    fn test_json_round_trips_fields() {
        let json = format_result(&sample(), OutputFormat::Json, DateOrder::MonthFirst).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["strategy"], "table_aware");
        assert_eq!(value["ocr_trigger"], "garbled");
        assert_eq!(value["transactions"][0]["amount"], "-10000.00");
    }

    #[test]
    fn test_truncate_counts_chars() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("ééééé", 3), "éé…");
    }
}
