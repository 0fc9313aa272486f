//! Layout-agnostic parser driven by date and amount anchors.

use std::mem;

use rust_decimal::Decimal;
use tracing::{debug, trace};

use super::rules::{strip_spans, AmountExtractor, DateExtractor, FieldExtractor};
use super::LineGrammar;
use crate::models::config::ParsingConfig;
use crate::models::{TextLine, TransactionRecord};

/// Best-effort parser for statements of unknown layout.
///
/// A line opens a transaction when a date appears near its start. The amount
/// may sit on the same line or on the indented line right below it; short or
/// indented lines without anchors extend the open description.
#[derive(Debug, Clone)]
pub struct GenericHeuristicParser {
    date_window: usize,
    continuation_max_len: usize,
}

#[derive(Debug)]
struct OpenTransaction {
    date: String,
    description: String,
    amount: Decimal,
    line_number: usize,
}

/// A dated line without an amount, waiting for its wrapped amount line.
///
/// Lives for one line only; the open transaction stays open meanwhile.
#[derive(Debug)]
struct PendingDate {
    date: String,
    description: String,
    line_number: usize,
}

#[derive(Debug)]
enum ParserState {
    NoOpenTransaction,
    OpenTransaction(OpenTransaction),
}

impl ParserState {
    /// Close the open transaction into a record.
    fn flush(&mut self, records: &mut Vec<TransactionRecord>) {
        let ParserState::OpenTransaction(open) = mem::replace(self, ParserState::NoOpenTransaction) else {
            return;
        };

        records.push(TransactionRecord {
            trans_date: Some(open.date.clone()),
            post_date: open.date,
            description: open.description,
            reference: None,
            fees: None,
            amount: open.amount,
            balance: None,
            source_line_number: open.line_number,
        });
    }
}

/// Anchors found on one line.
struct LineAnchors {
    date: Option<String>,
    amount: Option<Decimal>,
    /// Line text with the date and every amount removed.
    remainder: String,
}

impl GenericHeuristicParser {
    pub fn new() -> Self {
        Self {
            date_window: 20,
            continuation_max_len: 30,
        }
    }

    pub fn from_config(config: &ParsingConfig) -> Self {
        Self {
            date_window: config.date_anchor_window,
            continuation_max_len: config.continuation_max_len,
        }
    }

    pub fn with_date_window(mut self, chars: usize) -> Self {
        self.date_window = chars;
        self
    }

    pub fn with_continuation_max_len(mut self, chars: usize) -> Self {
        self.continuation_max_len = chars;
        self
    }

    fn anchors(&self, line: &str) -> LineAnchors {
        let date = DateExtractor::new().anchor(line, self.date_window);

        let without_date = match &date {
            Some(token) => strip_spans(line, &[(token.start, token.end)]),
            None => line.to_string(),
        };

        let amounts = AmountExtractor::new().extract_all(&without_date);
        let spans: Vec<(usize, usize)> = amounts.iter().map(|t| (t.start, t.end)).collect();

        LineAnchors {
            date: date.map(|t| t.value),
            amount: amounts.first().map(|t| t.value),
            remainder: strip_spans(&without_date, &spans),
        }
    }

    fn is_continuation(&self, raw: &str, trimmed: &str) -> bool {
        raw.starts_with(char::is_whitespace) || trimmed.chars().count() < self.continuation_max_len
    }
}

impl Default for GenericHeuristicParser {
    fn default() -> Self {
        Self::new()
    }
}

impl LineGrammar for GenericHeuristicParser {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn parse_lines(&self, lines: &[TextLine]) -> Vec<TransactionRecord> {
        let mut records = Vec::new();
        let mut state = ParserState::NoOpenTransaction;
        let mut pending: Option<PendingDate> = None;

        for line in lines {
            let raw = line.content.as_str();
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }

            let anchors = self.anchors(trimmed);

            if let Some(dated) = pending.take() {
                match (&anchors.date, anchors.amount) {
                    (None, Some(amount)) if raw.starts_with(char::is_whitespace) => {
                        state.flush(&mut records);
                        let mut description = dated.description;
                        append(&mut description, &anchors.remainder);
                        state = ParserState::OpenTransaction(OpenTransaction {
                            date: dated.date,
                            description,
                            amount,
                            line_number: dated.line_number,
                        });
                        continue;
                    }
                    _ => trace!("Line {} discarded: date without amount", dated.line_number),
                }
            }

            match (anchors.date, anchors.amount, &mut state) {
                (Some(date), Some(amount), state) => {
                    state.flush(&mut records);
                    *state = ParserState::OpenTransaction(OpenTransaction {
                        date,
                        description: anchors.remainder,
                        amount,
                        line_number: line.number,
                    });
                }
                (Some(date), None, _) => {
                    pending = Some(PendingDate {
                        date,
                        description: anchors.remainder,
                        line_number: line.number,
                    });
                }
                (None, Some(amount), ParserState::OpenTransaction(open)) => {
                    open.amount = amount;
                    append(&mut open.description, &anchors.remainder);
                }
                (None, None, ParserState::OpenTransaction(open)) if self.is_continuation(raw, trimmed) => {
                    append(&mut open.description, trimmed);
                }
                _ => trace!("Line {} discarded", line.number),
            }
        }

        state.flush(&mut records);

        debug!("Generic parser: {} records from {} lines", records.len(), lines.len());
        records
    }
}

fn append(description: &mut String, part: &str) {
    if part.is_empty() {
        return;
    }
    if !description.is_empty() {
        description.push(' ');
    }
    description.push_str(part);
}
