//! Fixed-grammar parser for OCR'd statements with one transaction per line.
//!
//! Rows look like
//!
//! ```text
//! PostDate TransDate Description Reference [Fees] Amount Balance
//! 07/06/23 07/06/23 Directors Fees Artiligence A0159924 -7.50 -10000.00 +114337.50
//! ```

use tracing::{debug, info, trace};

use super::rules::{is_reference_code, FieldExtractor, ShortDateExtractor, TableAmountExtractor};
use super::rules::patterns::TABLE_BOILERPLATE;
use super::LineGrammar;
use crate::error::AcquisitionError;
use crate::models::{TextLine, TransactionRecord};
use crate::ocr::{Rasterizer, TextRecognizer};
use crate::pdf::{Result as PdfResult, StatementDocument, TextLayer};
use crate::text::{first_page_sample, TextAcquisition};

/// Output of a whole-document table parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableParse {
    pub records: Vec<TransactionRecord>,
    /// False when the parser declined because the text layer looked usable.
    pub ocr_used: bool,
    /// OCR lines the records were read from.
    pub lines: Vec<TextLine>,
}

/// Parser for statements whose rows carry two short dates and trailing
/// fee, amount and balance columns.
#[derive(Debug, Clone, Default)]
pub struct TableAwareParser;

impl TableAwareParser {
    pub fn new() -> Self {
        Self
    }

    /// OCR and parse a document whose first page text layer is garbled.
    ///
    /// Declines with an empty result when the first page reads cleanly, so a
    /// caller can hand the statement to the generic parser instead.
    pub fn parse_document<L, R, T>(
        &self,
        document: &StatementDocument,
        acquisition: &TextAcquisition<L, R, T>,
    ) -> Result<TableParse, AcquisitionError>
    where
        L: TextLayer,
        R: Rasterizer,
        T: TextRecognizer,
    {
        let layer = acquisition.read_text_layer(document);
        self.parse_with_layer(document, &layer, acquisition)
    }

    /// [`parse_document`](Self::parse_document) over a text layer that was
    /// already read.
    pub fn parse_with_layer<L, R, T>(
        &self,
        document: &StatementDocument,
        layer: &PdfResult<Vec<String>>,
        acquisition: &TextAcquisition<L, R, T>,
    ) -> Result<TableParse, AcquisitionError>
    where
        L: TextLayer,
        R: Rasterizer,
        T: TextRecognizer,
    {
        if !acquisition.page_detector().is_garbled(first_page_sample(layer)) {
            debug!("First page of {} reads cleanly, declining", document.display_name());
            return Ok(TableParse::default());
        }

        info!("Garbled first page in {}, reading table rows via OCR", document.display_name());
        let lines = acquisition.ocr_lines(document)?;
        let records = self.parse_lines(&lines);

        Ok(TableParse {
            records,
            ocr_used: true,
            lines,
        })
    }

    /// Parse one row, or `None` when it does not fit the grammar.
    pub fn parse_line(&self, line: &TextLine) -> Option<TransactionRecord> {
        let text = line.content.trim();

        let dates = ShortDateExtractor::new().extract_all(text);
        if dates.len() < 2 {
            return None;
        }

        let amounts = TableAmountExtractor::new().extract_all(text);
        if amounts.len() < 2 {
            trace!("Line {}: {} amounts, need 2", line.number, amounts.len());
            return None;
        }

        // Columns are positional from the right; anything before fees is ignored
        let n = amounts.len();
        let balance = &amounts[n - 1];
        let amount = &amounts[n - 2];
        let fees = (n >= 3).then(|| &amounts[n - 3]);

        let mut remainder = text.to_string();
        for date in &dates[..2] {
            remainder = remainder.replacen(&date.value, " ", 1);
        }
        for token in [Some(balance), Some(amount), fees].into_iter().flatten() {
            if let Some(idx) = remainder.rfind(&token.source) {
                remainder.replace_range(idx..idx + token.source.len(), " ");
            }
        }

        let mut reference = None;
        let mut words = Vec::new();
        for part in remainder.split_whitespace() {
            if reference.is_none() && is_reference_code(part) {
                reference = Some(part.to_string());
            } else {
                words.push(part);
            }
        }
        let description = words.join(" ");

        if description.chars().count() < 3 || TABLE_BOILERPLATE.is_match(&description) {
            trace!("Line {}: rejected description {:?}", line.number, description);
            return None;
        }

        Some(TransactionRecord {
            post_date: dates[0].value.clone(),
            trans_date: Some(dates[1].value.clone()),
            description,
            reference,
            fees: fees.map(|t| t.value),
            amount: amount.value,
            balance: Some(balance.value),
            source_line_number: line.number,
        })
    }
}

impl LineGrammar for TableAwareParser {
    fn name(&self) -> &'static str {
        "table_aware"
    }

    fn parse_lines(&self, lines: &[TextLine]) -> Vec<TransactionRecord> {
        let records: Vec<TransactionRecord> = lines.iter().filter_map(|l| self.parse_line(l)).collect();
        debug!("Table parser: {} records from {} lines", records.len(), lines.len());
        records
    }
}
