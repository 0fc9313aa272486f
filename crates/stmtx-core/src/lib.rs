//! Core library for bank statement transaction extraction.
//!
//! This crate provides:
//! - PDF text-layer reading with garbled-text detection
//! - OCR fallback through pluggable rasterizers and recognizers
//! - Line grammars for generic statements and OCR'd table layouts
//! - Field rules for dates, amounts and reference codes

pub mod error;
pub mod models;
pub mod pdf;
pub mod ocr;
pub mod text;
pub mod statement;

pub use error::{AcquisitionError, OcrError, PdfError, Result, StmtxError};
pub use models::{
    OcrTrigger, StatementExtractionResult, StmtxConfig, TextLine, TransactionRecord,
};
pub use pdf::{PdfExtractor, PdfTextLayer, StatementDocument, TextLayer};
pub use ocr::{
    DynOcrPipeline, EmbeddedImageRasterizer, OcrPipeline, PdftoppmRasterizer, Rasterizer,
    RecognitionSettings, TesseractRecognizer, TextRecognizer,
};
#[cfg(feature = "onnx")]
pub use ocr::OnnxRecognizer;
pub use text::{AcquiredText, DefaultTextAcquisition, GarbledTextDetector, TextAcquisition};
pub use statement::{
    DefaultStatementExtractor, GenericHeuristicParser, LineGrammar, StatementExtractor,
    TableAwareParser,
};
