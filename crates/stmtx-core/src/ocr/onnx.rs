//! In-process recognition with PaddleOCR models through `pure-onnx-ocr`.

use std::path::Path;

use image::DynamicImage;
use tracing::{debug, info};

use super::{RecognitionSettings, TextRecognizer};
use crate::error::OcrError;

/// Pixel height of a text row when grouping detected boxes into lines.
const ROW_HEIGHT: f64 = 20.0;

/// PaddleOCR detection and recognition, no external runtime needed.
///
/// Detected boxes are grouped into rows by their top edge and joined left to
/// right, so each row comes out as one text line. Language and segmentation
/// settings are fixed by the models and ignored here.
pub struct OnnxRecognizer {
    engine: pure_onnx_ocr::engine::OcrEngine,
}

impl OnnxRecognizer {
    /// Load `det.onnx`, `latin_rec.onnx` and `latin_dict.txt` from a directory.
    pub fn from_dir(model_dir: &Path) -> Result<Self, OcrError> {
        let det_path = model_dir.join("det.onnx");
        let rec_path = model_dir.join("latin_rec.onnx");
        let dict_path = model_dir.join("latin_dict.txt");

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", model_dir.display());
        Ok(Self { engine })
    }
}

impl TextRecognizer for OnnxRecognizer {
    fn recognize_text(&self, image: &DynamicImage, _settings: &RecognitionSettings) -> Result<String, OcrError> {
        let results = self
            .engine
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        debug!("pure-onnx-ocr returned {} text regions", results.len());

        let boxes: Vec<(f64, f64, String)> = results
            .iter()
            .map(|r| {
                let (x, y) = top_left(&r.bounding_box);
                (x, y, r.text.replace("[UNK]", " "))
            })
            .collect();

        Ok(join_rows(boxes))
    }
}

fn top_left(polygon: &pure_onnx_ocr::Polygon<f64>) -> (f64, f64) {
    polygon
        .exterior()
        .coords()
        .fold((f64::INFINITY, f64::INFINITY), |(x, y), c| (x.min(c.x), y.min(c.y)))
}

/// Sort boxes into reading order and join each row with spaces.
fn join_rows(mut boxes: Vec<(f64, f64, String)>) -> String {
    boxes.sort_by(|a, b| {
        let row_a = (a.1 / ROW_HEIGHT) as i64;
        let row_b = (b.1 / ROW_HEIGHT) as i64;
        row_a
            .cmp(&row_b)
            .then(a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut lines: Vec<(i64, Vec<String>)> = Vec::new();
    for (_, y, text) in boxes {
        let row = (y / ROW_HEIGHT) as i64;
        match lines.last_mut() {
            Some((current, words)) if *current == row => words.push(text),
            _ => lines.push((row, vec![text])),
        }
    }

    lines
        .into_iter()
        .map(|(_, words)| words.join(" "))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_rows_reading_order() {
        let boxes = vec![
            (300.0, 42.0, "-7.50".to_string()),
            (10.0, 45.0, "07/06/23".to_string()),
            (10.0, 5.0, "Header".to_string()),
            (120.0, 41.0, "Directors".to_string()),
        ];
        assert_eq!(join_rows(boxes), "Header\n07/06/23 Directors -7.50");
    }
}
