//! PDF text and image extraction using lopdf and pdf-extract.

use image::{DynamicImage, GrayImage, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, trace};

use super::{Result, StatementDocument, TextLayer};
use crate::error::PdfError;

/// A parsed PDF with its (decrypted) bytes.
pub struct PdfExtractor {
    document: Document,
    raw_data: Vec<u8>,
}

impl PdfExtractor {
    /// Parse a PDF, decrypting it first when it uses an empty user password.
    pub fn load(data: &[u8]) -> Result<Self> {
        let mut document = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        let raw_data = if document.is_encrypted() {
            if document.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract reads bytes, so hand it the decrypted copy
            let mut decrypted = Vec::new();
            document
                .save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            decrypted
        } else {
            data.to_vec()
        };

        let page_count = document.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        Ok(Self { document, raw_data })
    }

    pub fn page_count(&self) -> u32 {
        self.document.get_pages().len() as u32
    }

    /// Text of each page, in page order.
    pub fn page_texts(&self) -> Result<Vec<String>> {
        pdf_extract::extract_text_from_mem_by_pages(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }

    /// Decodable images referenced from a page's XObject resources.
    pub fn page_images(&self, page: u32) -> Result<Vec<DynamicImage>> {
        let doc = &self.document;
        let pages = doc.get_pages();
        let page_id = *pages.get(&page).ok_or(PdfError::InvalidPage(page))?;

        let mut images = Vec::new();

        let Some(resources) = self.page_resources(page_id) else {
            return Ok(images);
        };
        let Ok(xobjects) = resources.get(b"XObject") else {
            return Ok(images);
        };

        if let Ok((_, Object::Dictionary(xobj_dict))) = doc.dereference(xobjects) {
            for (name, obj_ref) in xobj_dict.iter() {
                if let Ok((_, obj)) = doc.dereference(obj_ref) {
                    match self.decode_image(obj) {
                        Some(img) => images.push(img),
                        None => trace!("Skipping XObject {}", String::from_utf8_lossy(name)),
                    }
                }
            }
        }

        debug!("Extracted {} images from page {}", images.len(), page);
        Ok(images)
    }

    fn decode_image(&self, obj: &Object) -> Option<DynamicImage> {
        let Object::Stream(stream) = obj else {
            return None;
        };
        let dict = &stream.dict;

        if dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
            return None;
        }

        let width = dict.get(b"Width").ok()?.as_i64().ok()? as u32;
        let height = dict.get(b"Height").ok()?.as_i64().ok()? as u32;
        trace!("Found image object: {}x{}", width, height);

        let filter = dict.get(b"Filter").ok().and_then(|f| match f {
            Object::Name(name) => Some(name.as_slice()),
            Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
            _ => None,
        });

        match filter {
            // Scanned pages are usually JPEG; the raw stream is the file
            Some(b"DCTDecode") => {
                return image::load_from_memory_with_format(&stream.content, image::ImageFormat::Jpeg).ok();
            }
            Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
                trace!("Unsupported image filter");
                return None;
            }
            _ => {}
        }

        let bits = dict
            .get(b"BitsPerComponent")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(8);
        if bits != 8 {
            trace!("Unsupported bits per component: {}", bits);
            return None;
        }

        let color_space = dict
            .get(b"ColorSpace")
            .ok()
            .and_then(|o| match o {
                Object::Name(name) => Some(name.as_slice()),
                Object::Array(arr) => arr.first().and_then(|o| o.as_name().ok()),
                Object::Reference(r) => self.document.get_object(*r).ok().and_then(|o| o.as_name().ok()),
                _ => None,
            })
            .unwrap_or(b"DeviceRGB");

        let data = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());
        let pixels = (width as usize) * (height as usize);

        match color_space {
            b"DeviceGray" | b"G" if data.len() >= pixels => {
                GrayImage::from_raw(width, height, data[..pixels].to_vec()).map(DynamicImage::ImageLuma8)
            }
            b"DeviceRGB" | b"RGB" if data.len() >= pixels * 3 => {
                RgbImage::from_raw(width, height, data[..pixels * 3].to_vec()).map(DynamicImage::ImageRgb8)
            }
            _ => {
                trace!(
                    "Could not decode image: colorspace={:?}, data_len={}",
                    String::from_utf8_lossy(color_space),
                    data.len()
                );
                None
            }
        }
    }

    /// Resources for a page, inherited from the page tree when absent.
    fn page_resources(&self, node_id: ObjectId) -> Option<Dictionary> {
        let doc = &self.document;
        let Object::Dictionary(dict) = doc.get_object(node_id).ok()? else {
            return None;
        };

        if let Ok(resources) = dict.get(b"Resources") {
            if let Ok((_, Object::Dictionary(res_dict))) = doc.dereference(resources) {
                return Some(res_dict.clone());
            }
        }

        match dict.get(b"Parent") {
            Ok(Object::Reference(parent_id)) => self.page_resources(*parent_id),
            _ => None,
        }
    }
}

/// Embedded text layer read through pdf-extract.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextLayer;

impl PdfTextLayer {
    pub fn new() -> Self {
        Self
    }
}

impl TextLayer for PdfTextLayer {
    fn page_texts(&self, document: &StatementDocument) -> Result<Vec<String>> {
        let pdf = PdfExtractor::load(document.data())?;
        let pages = pdf.page_texts()?;

        debug!(
            "Text layer of {}: {} pages, {} chars",
            document.display_name(),
            pages.len(),
            pages.iter().map(|p| p.len()).sum::<usize>()
        );
        Ok(pages)
    }
}
