//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::StmtxError;
use crate::statement::rules::dates::DateOrder;

/// Main configuration for the stmtx pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StmtxConfig {
    /// OCR configuration.
    pub ocr: OcrConfig,

    /// Text acquisition configuration.
    pub acquisition: AcquisitionConfig,

    /// Line grammar configuration.
    pub parsing: ParsingConfig,
}

/// Which recognizer turns page images into text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrBackend {
    /// External `tesseract` binary.
    #[default]
    Tesseract,
    /// PaddleOCR models through pure-onnx-ocr (requires the `onnx` feature).
    Onnx,
}

/// Which rasterizer renders PDF pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RasterizerKind {
    /// External `pdftoppm` binary (poppler-utils).
    #[default]
    Pdftoppm,
    /// Images embedded in the PDF, one per page. DPI is ignored.
    EmbeddedImages,
}

/// OCR engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Recognition backend.
    pub backend: OcrBackend,

    /// Page rasterizer.
    pub rasterizer: RasterizerKind,

    /// DPI for rendering PDF pages to images.
    pub dpi: u32,

    /// Recognition language (tesseract language code).
    pub language: String,

    /// Tesseract page segmentation mode. 6 = single uniform block of text.
    pub page_segmentation_mode: u8,

    /// Tesseract OCR engine mode. 3 = default (LSTM when available).
    pub engine_mode: u8,

    /// Explicit path to the tesseract binary.
    pub tesseract_path: Option<PathBuf>,

    /// Explicit path to the pdftoppm binary.
    pub pdftoppm_path: Option<PathBuf>,

    /// Directory holding det.onnx, latin_rec.onnx and latin_dict.txt.
    pub model_dir: PathBuf,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            backend: OcrBackend::default(),
            rasterizer: RasterizerKind::default(),
            dpi: 300,
            language: "eng".to_string(),
            page_segmentation_mode: 6,
            engine_mode: 3,
            tesseract_path: None,
            pdftoppm_path: None,
            model_dir: PathBuf::from("models"),
        }
    }
}

/// Text acquisition configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Re-run through OCR when the text layer looks garbled.
    pub auto_detect_garbled: bool,

    /// Treat a text layer without any lines as a scanned document.
    pub ocr_on_empty_text_layer: bool,

    /// Number of leading lines sampled for garbled detection.
    pub sample_lines: usize,

    /// Non-ASCII ratio above which the line sample is garbled.
    pub line_sample_threshold: f64,

    /// Non-ASCII ratio above which a first-page sample is garbled.
    pub page_sample_threshold: f64,

    /// Ratio of typographic symbols above which text is garbled.
    pub symbol_threshold: f64,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            auto_detect_garbled: true,
            ocr_on_empty_text_layer: true,
            sample_lines: 20,
            line_sample_threshold: 0.3,
            page_sample_threshold: 0.2,
            symbol_threshold: 0.1,
        }
    }
}

/// Which line grammar to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParsingStrategy {
    /// Table-aware when the text came from OCR, generic otherwise.
    #[default]
    Auto,
    /// Generic heuristic parser only.
    Generic,
    /// Table-aware parser gated on a garbled first page.
    TableAware,
}

/// Line grammar configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsingConfig {
    /// Strategy selection.
    pub strategy: ParsingStrategy,

    /// A date anchor must start within this many characters.
    pub date_anchor_window: usize,

    /// Lines shorter than this may continue a description.
    pub continuation_max_len: usize,

    /// Leading lines scanned for a statement date.
    pub header_scan_lines: usize,

    /// How ambiguous numeric dates are read when normalizing.
    pub date_order: DateOrder,
}

impl Default for ParsingConfig {
    fn default() -> Self {
        Self {
            strategy: ParsingStrategy::default(),
            date_anchor_window: 20,
            continuation_max_len: 30,
            header_scan_lines: 10,
            date_order: DateOrder::default(),
        }
    }
}

impl StmtxConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), StmtxError> {
        let invalid = |msg: &str| Err(StmtxError::Config(msg.to_string()));

        if self.ocr.dpi == 0 {
            return invalid("ocr.dpi must be greater than 0");
        }
        if self.ocr.language.trim().is_empty() {
            return invalid("ocr.language must not be empty");
        }
        if self.acquisition.sample_lines == 0 {
            return invalid("acquisition.sample_lines must be greater than 0");
        }

        let ratios = [
            ("acquisition.line_sample_threshold", self.acquisition.line_sample_threshold),
            ("acquisition.page_sample_threshold", self.acquisition.page_sample_threshold),
            ("acquisition.symbol_threshold", self.acquisition.symbol_threshold),
        ];
        if let Some((key, _)) = ratios.iter().find(|(_, v)| !(0.0..=1.0).contains(v)) {
            return Err(StmtxError::Config(format!("{} must be between 0 and 1", key)));
        }

        if self.parsing.date_anchor_window == 0 {
            return invalid("parsing.date_anchor_window must be greater than 0");
        }
        Ok(())
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_tesseract_block_mode() {
        let config = StmtxConfig::default();
        assert_eq!(config.ocr.dpi, 300);
        assert_eq!(config.ocr.language, "eng");
        assert_eq!(config.ocr.page_segmentation_mode, 6);
        assert_eq!(config.acquisition.sample_lines, 20);
        assert_eq!(config.parsing.strategy, ParsingStrategy::Auto);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: StmtxConfig =
            serde_json::from_str(r#"{"ocr": {"dpi": 200}, "parsing": {"strategy": "generic"}}"#)
                .unwrap();
        assert_eq!(config.ocr.dpi, 200);
        assert_eq!(config.ocr.language, "eng");
        assert_eq!(config.parsing.strategy, ParsingStrategy::Generic);
        assert!(config.acquisition.auto_detect_garbled);
    }

    #[test]
    fn test_validate() {
        assert!(StmtxConfig::default().validate().is_ok());

        let mut config = StmtxConfig::default();
        config.ocr.dpi = 0;
        assert!(matches!(config.validate(), Err(StmtxError::Config(msg)) if msg.contains("ocr.dpi")));

        let mut config = StmtxConfig::default();
        config.acquisition.symbol_threshold = 1.5;
        assert!(matches!(
            config.validate(),
            Err(StmtxError::Config(msg)) if msg.contains("symbol_threshold")
        ));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = StmtxConfig::default();
        config.ocr.backend = OcrBackend::Onnx;
        config.parsing.date_order = DateOrder::DayFirst;
        config.save(&path).unwrap();

        let loaded = StmtxConfig::from_file(&path).unwrap();
        assert_eq!(loaded.ocr.backend, OcrBackend::Onnx);
        assert_eq!(loaded.parsing.date_order, DateOrder::DayFirst);
    }
}
