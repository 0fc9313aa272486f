//! Line grammars that turn statement text into transaction records.

pub mod extractor;
pub mod generic;
pub mod rules;
pub mod table;

pub use extractor::{DefaultStatementExtractor, StatementExtractor};
pub use generic::GenericHeuristicParser;
pub use table::{TableAwareParser, TableParse};

use crate::models::{TextLine, TransactionRecord};

/// A strategy for reading transactions out of ordered statement lines.
///
/// Implementations keep no state between calls; records come back in
/// ascending `source_line_number` order.
pub trait LineGrammar {
    /// Short name recorded in extraction results.
    fn name(&self) -> &'static str;

    fn parse_lines(&self, lines: &[TextLine]) -> Vec<TransactionRecord>;
}
