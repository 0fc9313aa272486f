//! Statement extraction facade: acquisition, grammar selection and assembly.

use tracing::{debug, info};

use super::generic::GenericHeuristicParser;
use super::rules::StatementDateExtractor;
use super::table::TableAwareParser;
use super::LineGrammar;
use crate::error::Result;
use crate::models::config::{ParsingStrategy, StmtxConfig};
use crate::models::{OcrTrigger, StatementExtractionResult, TextLine, TransactionRecord};
use crate::ocr::{Rasterizer, TextRecognizer};
use crate::pdf::{PdfTextLayer, StatementDocument, TextLayer};
use crate::text::{AcquiredText, DefaultTextAcquisition, TextAcquisition};

/// Turns statement documents into extraction results.
///
/// With [`ParsingStrategy::Auto`] the table-aware grammar is tried whenever
/// the lines came from OCR, and the generic grammar takes over when it finds
/// nothing.
pub struct StatementExtractor<L, R, T> {
    acquisition: TextAcquisition<L, R, T>,
    generic: GenericHeuristicParser,
    table: TableAwareParser,
    statement_dates: StatementDateExtractor,
    strategy: ParsingStrategy,
}

/// Extractor over real PDFs with OCR backends chosen by configuration.
pub type DefaultStatementExtractor = StatementExtractor<PdfTextLayer, Box<dyn Rasterizer>, Box<dyn TextRecognizer>>;

impl DefaultStatementExtractor {
    pub fn from_config(config: &StmtxConfig) -> Result<Self> {
        config.validate()?;
        let acquisition = DefaultTextAcquisition::from_config(config)?;

        Ok(StatementExtractor::new(acquisition)
            .with_strategy(config.parsing.strategy)
            .with_generic_parser(GenericHeuristicParser::from_config(&config.parsing))
            .with_statement_date_extractor(StatementDateExtractor::new(config.parsing.header_scan_lines)))
    }
}

impl<L: TextLayer, R: Rasterizer, T: TextRecognizer> StatementExtractor<L, R, T> {
    pub fn new(acquisition: TextAcquisition<L, R, T>) -> Self {
        Self {
            acquisition,
            generic: GenericHeuristicParser::new(),
            table: TableAwareParser::new(),
            statement_dates: StatementDateExtractor::default(),
            strategy: ParsingStrategy::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: ParsingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_generic_parser(mut self, parser: GenericHeuristicParser) -> Self {
        self.generic = parser;
        self
    }

    pub fn with_statement_date_extractor(mut self, extractor: StatementDateExtractor) -> Self {
        self.statement_dates = extractor;
        self
    }

    pub fn strategy(&self) -> ParsingStrategy {
        self.strategy
    }

    pub fn acquisition(&self) -> &TextAcquisition<L, R, T> {
        &self.acquisition
    }

    /// Extract the transactions of one statement.
    pub fn extract(&self, document: &StatementDocument, force_ocr: bool) -> Result<StatementExtractionResult> {
        let result = match self.strategy {
            ParsingStrategy::Generic => {
                let text = self.acquisition.acquire(document, force_ocr)?;
                let records = self.generic.parse_lines(&text.lines);
                self.assemble(&text.lines, records, self.generic.name(), text.ocr_used, text.trigger)
            }
            ParsingStrategy::Auto => {
                let text = self.acquisition.acquire(document, force_ocr)?;
                self.extract_from_text(&text)
            }
            ParsingStrategy::TableAware => self.extract_table_aware(document, force_ocr)?,
        };

        info!(
            "Extracted {} transactions from {} using {} parser (ocr: {})",
            result.transaction_count(),
            document.display_name(),
            result.strategy,
            result.ocr_used
        );
        Ok(result)
    }

    /// Apply the automatic grammar selection to lines acquired elsewhere.
    pub fn extract_from_text(&self, text: &AcquiredText) -> StatementExtractionResult {
        if text.ocr_used {
            let records = self.table.parse_lines(&text.lines);
            if !records.is_empty() {
                return self.assemble(&text.lines, records, self.table.name(), true, text.trigger);
            }
            debug!("No table rows in OCR text, using generic parser");
        }

        let records = self.generic.parse_lines(&text.lines);
        self.assemble(&text.lines, records, self.generic.name(), text.ocr_used, text.trigger)
    }

    fn extract_table_aware(&self, document: &StatementDocument, force_ocr: bool) -> Result<StatementExtractionResult> {
        if force_ocr {
            let text = self.acquisition.acquire(document, true)?;
            return Ok(self.extract_from_text(&text));
        }

        let layer = self.acquisition.read_text_layer(document);
        let parse = self.table.parse_with_layer(document, &layer, &self.acquisition)?;
        if parse.ocr_used {
            return Ok(self.assemble(
                &parse.lines,
                parse.records,
                self.table.name(),
                true,
                Some(OcrTrigger::Garbled),
            ));
        }

        let text = self.acquisition.acquire_from_layer(document, layer)?;
        let records = self.generic.parse_lines(&text.lines);
        Ok(self.assemble(&text.lines, records, self.generic.name(), text.ocr_used, text.trigger))
    }

    fn assemble(
        &self,
        lines: &[TextLine],
        transactions: Vec<TransactionRecord>,
        strategy: &str,
        ocr_used: bool,
        ocr_trigger: Option<OcrTrigger>,
    ) -> StatementExtractionResult {
        // Only table rows stand in for a missing header date
        let statement_date = self.statement_dates.extract(lines).or_else(|| {
            if strategy == self.table.name() {
                transactions.first().map(|t| t.post_date.clone())
            } else {
                None
            }
        });

        StatementExtractionResult {
            statement_date,
            transactions,
            ocr_used,
            ocr_trigger,
            strategy: strategy.to_string(),
        }
    }
}
