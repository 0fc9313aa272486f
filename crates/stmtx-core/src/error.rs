//! Error types for the stmtx-core library.

use thiserror::Error;

/// Main error type for the stmtx library.
#[derive(Error, Debug)]
pub enum StmtxError {
    /// No text could be obtained for the statement.
    #[error("acquisition error: {0}")]
    Acquisition(#[from] AcquisitionError),

    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration value is out of range.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF text-layer processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors related to page rasterization and text recognition.
#[derive(Error, Debug)]
pub enum OcrError {
    /// An external OCR tool could not be started.
    #[error("{tool} is not available: {reason}")]
    ToolUnavailable { tool: String, reason: String },

    /// Rendering pages to images failed.
    #[error("rasterization failed: {0}")]
    Rasterize(String),

    /// Text recognition failed.
    #[error("text recognition failed: {0}")]
    Recognition(String),

    /// Invalid image format or dimensions.
    #[error("invalid image: {0}")]
    InvalidImage(String),

    /// Failed to load OCR models.
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    /// Temporary file handling failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that leave a statement without any usable text.
///
/// These are terminal: no partial result is returned and nothing is retried.
#[derive(Error, Debug)]
pub enum AcquisitionError {
    /// The OCR path failed; there is no further fallback.
    #[error("OCR fallback failed: {0}")]
    Ocr(#[from] OcrError),

    /// Rasterization succeeded but produced no pages to recognize.
    #[error("no pages were rendered for OCR")]
    NoPages,
}

/// Result type for the stmtx library.
pub type Result<T> = std::result::Result<T, StmtxError>;
