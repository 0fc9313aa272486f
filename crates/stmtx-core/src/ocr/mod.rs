//! OCR fallback: page rasterization and text recognition.
//!
//! Both halves are traits so the acquisition logic can be exercised without
//! poppler or tesseract installed. The concrete implementations shell out to
//! the usual command-line tools, read images embedded in the PDF, or (with the
//! `onnx` feature) run PaddleOCR models in-process.

mod embedded;
#[cfg(feature = "onnx")]
mod onnx;
mod poppler;
mod tesseract;

pub use embedded::EmbeddedImageRasterizer;
#[cfg(feature = "onnx")]
pub use onnx::OnnxRecognizer;
pub use poppler::PdftoppmRasterizer;
pub use tesseract::TesseractRecognizer;

use std::path::{Path, PathBuf};

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::{OcrBackend, OcrConfig, RasterizerKind};
use crate::pdf::StatementDocument;

/// Renders every page of a document to an image, in page order.
pub trait Rasterizer {
    fn rasterize(&self, document: &StatementDocument, dpi: u32) -> Result<Vec<DynamicImage>, OcrError>;
}

/// Turns one page image into plain text, lines separated by `\n`.
pub trait TextRecognizer {
    fn recognize_text(&self, image: &DynamicImage, settings: &RecognitionSettings) -> Result<String, OcrError>;
}

impl<T: Rasterizer + ?Sized> Rasterizer for Box<T> {
    fn rasterize(&self, document: &StatementDocument, dpi: u32) -> Result<Vec<DynamicImage>, OcrError> {
        (**self).rasterize(document, dpi)
    }
}

impl<T: Rasterizer + ?Sized> Rasterizer for &T {
    fn rasterize(&self, document: &StatementDocument, dpi: u32) -> Result<Vec<DynamicImage>, OcrError> {
        (**self).rasterize(document, dpi)
    }
}

impl<T: TextRecognizer + ?Sized> TextRecognizer for Box<T> {
    fn recognize_text(&self, image: &DynamicImage, settings: &RecognitionSettings) -> Result<String, OcrError> {
        (**self).recognize_text(image, settings)
    }
}

impl<T: TextRecognizer + ?Sized> TextRecognizer for &T {
    fn recognize_text(&self, image: &DynamicImage, settings: &RecognitionSettings) -> Result<String, OcrError> {
        (**self).recognize_text(image, settings)
    }
}

/// Recognition parameters passed to every page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionSettings {
    /// Language code, e.g. `eng`.
    pub language: String,
    /// Tesseract `--psm`.
    pub page_segmentation_mode: u8,
    /// Tesseract `--oem`.
    pub engine_mode: u8,
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            page_segmentation_mode: 6,
            engine_mode: 3,
        }
    }
}

impl From<&OcrConfig> for RecognitionSettings {
    fn from(config: &OcrConfig) -> Self {
        Self {
            language: config.language.clone(),
            page_segmentation_mode: config.page_segmentation_mode,
            engine_mode: config.engine_mode,
        }
    }
}

/// Recognized text of one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// Page number (1-indexed).
    pub page: usize,
    pub text: String,
}

/// A rasterizer and a recognizer run back to back over a whole document.
pub struct OcrPipeline<R, T> {
    rasterizer: R,
    recognizer: T,
    dpi: u32,
    settings: RecognitionSettings,
}

/// Pipeline with backends picked at runtime from configuration.
pub type DynOcrPipeline = OcrPipeline<Box<dyn Rasterizer>, Box<dyn TextRecognizer>>;

impl<R: Rasterizer, T: TextRecognizer> OcrPipeline<R, T> {
    pub fn new(rasterizer: R, recognizer: T) -> Self {
        Self {
            rasterizer,
            recognizer,
            dpi: 300,
            settings: RecognitionSettings::default(),
        }
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    pub fn with_settings(mut self, settings: RecognitionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    pub fn settings(&self) -> &RecognitionSettings {
        &self.settings
    }

    /// Rasterize and recognize every page. The first failure aborts the run.
    pub fn run(&self, document: &StatementDocument) -> Result<Vec<PageText>, OcrError> {
        let images = self.rasterizer.rasterize(document, self.dpi)?;
        info!(
            "Rendered {} pages of {} at {} dpi",
            images.len(),
            document.display_name(),
            self.dpi
        );

        let mut pages = Vec::with_capacity(images.len());
        for (i, image) in images.iter().enumerate() {
            let text = self.recognizer.recognize_text(image, &self.settings)?;
            debug!("Page {}: recognized {} chars", i + 1, text.len());
            pages.push(PageText { page: i + 1, text });
        }

        Ok(pages)
    }
}

impl DynOcrPipeline {
    /// Build the pipeline described by `config`.
    pub fn from_config(config: &OcrConfig) -> Result<Self, OcrError> {
        let rasterizer: Box<dyn Rasterizer> = match config.rasterizer {
            RasterizerKind::Pdftoppm => Box::new(PdftoppmRasterizer::locate(config.pdftoppm_path.as_deref())),
            RasterizerKind::EmbeddedImages => Box::new(EmbeddedImageRasterizer::new()),
        };

        let recognizer: Box<dyn TextRecognizer> = match config.backend {
            OcrBackend::Tesseract => Box::new(TesseractRecognizer::locate(config.tesseract_path.as_deref())),
            #[cfg(feature = "onnx")]
            OcrBackend::Onnx => Box::new(OnnxRecognizer::from_dir(&config.model_dir)?),
            #[cfg(not(feature = "onnx"))]
            OcrBackend::Onnx => {
                return Err(OcrError::ModelLoad(
                    "the onnx backend requires building with the `onnx` feature".to_string(),
                ));
            }
        };

        Ok(OcrPipeline::new(rasterizer, recognizer)
            .with_dpi(config.dpi)
            .with_settings(RecognitionSettings::from(config)))
    }
}

/// Locate an external tool: explicit path, then Homebrew and /usr/local, then
/// whatever `PATH` resolves at spawn time.
pub(crate) fn locate_tool(name: &str, explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }

    ["/opt/homebrew/bin", "/usr/local/bin"]
        .iter()
        .map(|dir| Path::new(dir).join(name))
        .find(|candidate| candidate.is_file())
        .unwrap_or_else(|| PathBuf::from(name))
}
