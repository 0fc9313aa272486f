//! Data models and configuration.

pub mod config;
pub mod statement;

pub use config::{
    AcquisitionConfig, OcrBackend, OcrConfig, ParsingConfig, ParsingStrategy, RasterizerKind,
    StmtxConfig,
};
pub use statement::{OcrTrigger, StatementExtractionResult, TextLine, TransactionRecord};
