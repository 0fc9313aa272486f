//! Rasterizer that reuses the page images already embedded in a scanned PDF.

use image::DynamicImage;
use tracing::debug;

use super::Rasterizer;
use crate::error::OcrError;
use crate::pdf::{PdfExtractor, StatementDocument};

/// Takes the largest embedded image of each page.
///
/// Scanned statements usually carry exactly one full-page image per page, so
/// this avoids an external renderer. The requested DPI is ignored; images are
/// returned at their native resolution. Pages without a decodable image are
/// skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedImageRasterizer;

impl EmbeddedImageRasterizer {
    pub fn new() -> Self {
        Self
    }
}

impl Rasterizer for EmbeddedImageRasterizer {
    fn rasterize(&self, document: &StatementDocument, _dpi: u32) -> Result<Vec<DynamicImage>, OcrError> {
        let pdf = PdfExtractor::load(document.data()).map_err(|e| OcrError::Rasterize(e.to_string()))?;

        let mut pages = Vec::new();
        for page in 1..=pdf.page_count() {
            let images = pdf
                .page_images(page)
                .map_err(|e| OcrError::Rasterize(e.to_string()))?;

            match images.into_iter().max_by_key(|img| u64::from(img.width()) * u64::from(img.height())) {
                Some(img) => pages.push(img),
                None => debug!("Page {} has no embedded image", page),
            }
        }

        Ok(pages)
    }
}
