//! Text acquisition: embedded text layer first, OCR when it is unusable.

use tracing::{debug, info, warn};

use super::garbled::GarbledTextDetector;
use crate::error::{AcquisitionError, OcrError};
use crate::models::config::{AcquisitionConfig, StmtxConfig};
use crate::models::{OcrTrigger, TextLine};
use crate::ocr::{DynOcrPipeline, OcrPipeline, Rasterizer, TextRecognizer};
use crate::pdf::{PdfTextLayer, Result as PdfResult, StatementDocument, TextLayer};

/// Lines of a statement and the path that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquiredText {
    pub lines: Vec<TextLine>,
    pub ocr_used: bool,
    /// Why OCR ran; `None` when the text layer was used.
    pub trigger: Option<OcrTrigger>,
}

/// Chooses between the embedded text layer and the OCR pipeline.
pub struct TextAcquisition<L, R, T> {
    text_layer: L,
    ocr: OcrPipeline<R, T>,
    config: AcquisitionConfig,
}

/// Acquisition over the real PDF text layer with configured OCR backends.
pub type DefaultTextAcquisition = TextAcquisition<PdfTextLayer, Box<dyn Rasterizer>, Box<dyn TextRecognizer>>;

impl DefaultTextAcquisition {
    pub fn from_config(config: &StmtxConfig) -> Result<Self, OcrError> {
        let ocr = DynOcrPipeline::from_config(&config.ocr)?;
        Ok(TextAcquisition::new(PdfTextLayer::new(), ocr).with_config(config.acquisition.clone()))
    }
}

impl<L: TextLayer, R: Rasterizer, T: TextRecognizer> TextAcquisition<L, R, T> {
    pub fn new(text_layer: L, ocr: OcrPipeline<R, T>) -> Self {
        Self {
            text_layer,
            ocr,
            config: AcquisitionConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AcquisitionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &AcquisitionConfig {
        &self.config
    }

    /// Detector applied to the leading lines of a text layer.
    pub fn line_detector(&self) -> GarbledTextDetector {
        GarbledTextDetector::new(self.config.line_sample_threshold, self.config.symbol_threshold)
    }

    /// Detector applied to a whole first page.
    pub fn page_detector(&self) -> GarbledTextDetector {
        GarbledTextDetector::new(self.config.page_sample_threshold, self.config.symbol_threshold)
    }

    /// Produce the statement's lines.
    ///
    /// OCR runs when forced, when the text layer cannot be read, when it has
    /// no text, or when its leading lines look garbled. An OCR failure is
    /// terminal.
    pub fn acquire(&self, document: &StatementDocument, force_ocr: bool) -> Result<AcquiredText, AcquisitionError> {
        if force_ocr {
            info!("OCR forced for {}", document.display_name());
            return self.via_ocr(document, OcrTrigger::Forced);
        }

        self.acquire_from_layer(document, self.read_text_layer(document))
    }

    /// Page texts of the embedded text layer.
    pub fn read_text_layer(&self, document: &StatementDocument) -> PdfResult<Vec<String>> {
        self.text_layer.page_texts(document)
    }

    /// [`acquire`](Self::acquire) without forcing OCR, over a text layer the
    /// caller has already read.
    pub fn acquire_from_layer(
        &self,
        document: &StatementDocument,
        layer: PdfResult<Vec<String>>,
    ) -> Result<AcquiredText, AcquisitionError> {
        let pages = match layer {
            Ok(pages) => pages,
            Err(e) => {
                warn!("Text layer extraction failed ({}), trying OCR", e);
                return self.via_ocr(document, OcrTrigger::TextLayerFailed);
            }
        };

        let lines = number_lines(pages.iter().enumerate().map(|(i, text)| (i + 1, text.as_str())));

        if lines.is_empty() && self.config.ocr_on_empty_text_layer {
            info!("{} has no text layer, using OCR", document.display_name());
            return self.via_ocr(document, OcrTrigger::EmptyTextLayer);
        }

        if self.config.auto_detect_garbled {
            let sample = self.leading_sample(&lines);
            if self.line_detector().is_garbled(&sample) {
                warn!("Garbled text detected in {}, falling back to OCR", document.display_name());
                return self.via_ocr(document, OcrTrigger::Garbled);
            }
        }

        debug!("Using text layer: {} lines", lines.len());
        Ok(AcquiredText {
            lines,
            ocr_used: false,
            trigger: None,
        })
    }

    /// Lines from the OCR pipeline alone, numbered across pages.
    pub fn ocr_lines(&self, document: &StatementDocument) -> Result<Vec<TextLine>, AcquisitionError> {
        let pages = self.ocr.run(document)?;
        if pages.is_empty() {
            return Err(AcquisitionError::NoPages);
        }

        let lines = number_lines(pages.iter().map(|p| (p.page, p.text.as_str())));
        info!("OCR produced {} lines from {} pages", lines.len(), pages.len());
        Ok(lines)
    }

    fn via_ocr(&self, document: &StatementDocument, trigger: OcrTrigger) -> Result<AcquiredText, AcquisitionError> {
        let lines = self.ocr_lines(document)?;
        Ok(AcquiredText {
            lines,
            ocr_used: true,
            trigger: Some(trigger),
        })
    }

    fn leading_sample(&self, lines: &[TextLine]) -> String {
        lines
            .iter()
            .filter(|l| !l.content.trim().is_empty())
            .take(self.config.sample_lines)
            .map(|l| l.content.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Text of the first page, empty when the layer could not be read.
pub fn first_page_sample(layer: &PdfResult<Vec<String>>) -> &str {
    match layer {
        Ok(pages) => pages.first().map(String::as_str).unwrap_or(""),
        Err(_) => "",
    }
}

/// Split page texts into document-globally numbered lines.
///
/// Pages with no visible text contribute nothing.
fn number_lines<'a>(pages: impl Iterator<Item = (usize, &'a str)>) -> Vec<TextLine> {
    let mut lines = Vec::new();

    for (page, text) in pages {
        if text.trim().is_empty() {
            continue;
        }
        for content in text.lines() {
            lines.push(TextLine::new(lines.len() + 1, page, content));
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PdfError;
    use crate::ocr::RecognitionSettings;
    use image::{DynamicImage, RgbImage};
    use pretty_assertions::assert_eq;

    enum FakeLayer {
        Pages(Vec<&'static str>),
        Broken,
    }

    impl TextLayer for FakeLayer {
        fn page_texts(&self, _: &StatementDocument) -> crate::pdf::Result<Vec<String>> {
            match self {
                FakeLayer::Pages(pages) => Ok(pages.iter().map(|p| p.to_string()).collect()),
                FakeLayer::Broken => Err(PdfError::Parse("broken xref".to_string())),
            }
        }
    }

    struct FakeRasterizer(usize);

    impl Rasterizer for FakeRasterizer {
        fn rasterize(&self, _: &StatementDocument, _: u32) -> Result<Vec<DynamicImage>, OcrError> {
            Ok((0..self.0)
                .map(|i| DynamicImage::ImageRgb8(RgbImage::new(i as u32 + 1, 1)))
                .collect())
        }
    }

    /// Returns a fixed text per page, keyed by image width.
    struct FakeRecognizer(Vec<&'static str>);

    impl TextRecognizer for FakeRecognizer {
        fn recognize_text(&self, image: &DynamicImage, _: &RecognitionSettings) -> Result<String, OcrError> {
            Ok(self.0[image.width() as usize - 1].to_string())
        }
    }

    struct FailingRecognizer;

    impl TextRecognizer for FailingRecognizer {
        fn recognize_text(&self, _: &DynamicImage, _: &RecognitionSettings) -> Result<String, OcrError> {
            Err(OcrError::ToolUnavailable {
                tool: "tesseract".to_string(),
                reason: "not found".to_string(),
            })
        }
    }

    const OCR_PAGES: [&str; 2] = ["OCR ONE\nOCR TWO", "OCR THREE"];

    fn acquisition(layer: FakeLayer) -> TextAcquisition<FakeLayer, FakeRasterizer, FakeRecognizer> {
        TextAcquisition::new(
            layer,
            OcrPipeline::new(FakeRasterizer(OCR_PAGES.len()), FakeRecognizer(OCR_PAGES.to_vec())),
        )
    }

    fn contents(text: &AcquiredText) -> Vec<&str> {
        text.lines.iter().map(|l| l.content.as_str()).collect()
    }

    fn doc() -> StatementDocument {
        StatementDocument::from_bytes(Vec::new())
    }

    #[test]
    fn test_clean_text_layer_is_used() {
        let acq = acquisition(FakeLayer::Pages(vec!["01/05/2024 PAYROLL 2500.00\nline two", "page two"]));
        let text = acq.acquire(&doc(), false).unwrap();

        assert!(!text.ocr_used);
        assert_eq!(text.trigger, None);
        assert_eq!(contents(&text), vec!["01/05/2024 PAYROLL 2500.00", "line two", "page two"]);
        assert_eq!(text.lines[2], TextLine::new(3, 2, "page two"));
    }

    #[test]
    fn test_force_ocr_skips_text_layer() {
        let acq = acquisition(FakeLayer::Pages(vec!["clean text"]));
        let text = acq.acquire(&doc(), true).unwrap();

        assert!(text.ocr_used);
        assert_eq!(text.trigger, Some(OcrTrigger::Forced));
        assert_eq!(contents(&text), vec!["OCR ONE", "OCR TWO", "OCR THREE"]);
        assert_eq!(text.lines[2].page, 2);
    }

    #[test]
    fn test_text_layer_error_falls_back_to_ocr() {
        let text = acquisition(FakeLayer::Broken).acquire(&doc(), false).unwrap();
        assert!(text.ocr_used);
        assert_eq!(text.trigger, Some(OcrTrigger::TextLayerFailed));
    }

    #[test]
    fn test_garbled_text_layer_falls_back_to_ocr() {
        let acq = acquisition(FakeLayer::Pages(vec!["ÃÂ¢â€ ÃÂ¢â€ ÃÂ¢ 12"]));
        let text = acq.acquire(&doc(), false).unwrap();

        assert!(text.ocr_used);
        assert_eq!(text.trigger, Some(OcrTrigger::Garbled));
        assert_eq!(contents(&text)[0], "OCR ONE");
    }

    #[test]
    fn test_garbled_detection_can_be_disabled() {
        let acq = acquisition(FakeLayer::Pages(vec!["ÃÂ¢â€ ÃÂ¢â€ ÃÂ¢ 12"])).with_config(AcquisitionConfig {
            auto_detect_garbled: false,
            ..Default::default()
        });
        let text = acq.acquire(&doc(), false).unwrap();
        assert!(!text.ocr_used);
    }

    #[test]
    fn test_empty_text_layer_goes_to_ocr() {
        let acq = acquisition(FakeLayer::Pages(vec!["", "  \n "]));
        let text = acq.acquire(&doc(), false).unwrap();
        assert_eq!(text.trigger, Some(OcrTrigger::EmptyTextLayer));

        let acq = acquisition(FakeLayer::Pages(vec![""])).with_config(AcquisitionConfig {
            ocr_on_empty_text_layer: false,
            ..Default::default()
        });
        let text = acq.acquire(&doc(), false).unwrap();
        assert!(!text.ocr_used);
        assert!(text.lines.is_empty());
    }

    #[test]
    fn test_ocr_failure_is_fatal() {
        let acq = TextAcquisition::new(FakeLayer::Broken, OcrPipeline::new(FakeRasterizer(1), FailingRecognizer));
        let result = acq.acquire(&doc(), false);
        assert!(matches!(result, Err(AcquisitionError::Ocr(OcrError::ToolUnavailable { .. }))));
    }

    #[test]
    fn test_no_rendered_pages_is_fatal() {
        let acq = TextAcquisition::new(FakeLayer::Broken, OcrPipeline::new(FakeRasterizer(0), FakeRecognizer(vec![])));
        assert!(matches!(acq.acquire(&doc(), true), Err(AcquisitionError::NoPages)));
    }

    #[test]
    fn test_blank_ocr_pages_are_skipped() {
        let acq = TextAcquisition::new(
            FakeLayer::Broken,
            OcrPipeline::new(FakeRasterizer(3), FakeRecognizer(vec!["first", "  \n", "third"])),
        );
        let text = acq.acquire(&doc(), true).unwrap();
        assert_eq!(text.lines, vec![TextLine::new(1, 1, "first"), TextLine::new(2, 3, "third")]);
    }

    #[test]
    fn test_first_page_sample() {
        let acq = acquisition(FakeLayer::Pages(vec!["page one", "page two"]));
        assert_eq!(first_page_sample(&acq.read_text_layer(&doc())), "page one");
        assert_eq!(first_page_sample(&Ok(Vec::new())), "");

        let broken = acquisition(FakeLayer::Broken);
        assert_eq!(first_page_sample(&broken.read_text_layer(&doc())), "");
    }

    #[test]
    fn test_acquire_from_layer_reuses_pages() {
        let acq = acquisition(FakeLayer::Broken);
        let text = acq
            .acquire_from_layer(&doc(), Ok(vec!["01/05/2024 PAYROLL 2500.00".to_string()]))
            .unwrap();

        assert!(!text.ocr_used);
        assert_eq!(contents(&text), vec!["01/05/2024 PAYROLL 2500.00"]);
    }
}
