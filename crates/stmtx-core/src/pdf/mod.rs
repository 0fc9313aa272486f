//! PDF statement documents and their embedded text layer.

mod extractor;
#[cfg(test)]
pub(crate) mod test_pdf;

pub use extractor::{PdfExtractor, PdfTextLayer};

use std::path::{Path, PathBuf};

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// A statement PDF, held in memory.
///
/// The original path is kept when known so subprocess tools can read the file
/// directly instead of a temporary copy.
#[derive(Debug, Clone)]
pub struct StatementDocument {
    path: Option<PathBuf>,
    data: Vec<u8>,
}

impl StatementDocument {
    /// Read a document from disk.
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        Ok(Self {
            path: Some(path.to_path_buf()),
            data,
        })
    }

    /// Wrap document bytes that have no backing file.
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Self {
        Self {
            path: None,
            data: data.into(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// File name for logs, or `<memory>` for byte-backed documents.
    pub fn display_name(&self) -> String {
        self.path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "<memory>".to_string())
    }
}

/// Source of the text embedded in a PDF.
pub trait TextLayer {
    /// Text of every page, in document order.
    fn page_texts(&self, document: &StatementDocument) -> Result<Vec<String>>;
}

impl<T: TextLayer + ?Sized> TextLayer for Box<T> {
    fn page_texts(&self, document: &StatementDocument) -> Result<Vec<String>> {
        (**self).page_texts(document)
    }
}

impl<T: TextLayer + ?Sized> TextLayer for &T {
    fn page_texts(&self, document: &StatementDocument) -> Result<Vec<String>> {
        (**self).page_texts(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_from_bytes() {
        let doc = StatementDocument::from_bytes(b"%PDF-1.4".to_vec());
        assert!(doc.path().is_none());
        assert_eq!(doc.data(), b"%PDF-1.4");
        assert_eq!(doc.display_name(), "<memory>");
    }

    #[test]
    fn test_document_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("march.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();

        let doc = StatementDocument::from_path(&path).unwrap();
        assert_eq!(doc.path(), Some(path.as_path()));
        assert_eq!(doc.display_name(), "march.pdf");
    }

    #[test]
    fn test_document_missing_file() {
        assert!(StatementDocument::from_path("/nonexistent/statement.pdf").is_err());
    }
}
