//! Text recognition through the `tesseract` command-line tool.

use std::path::{Path, PathBuf};
use std::process::Command;

use image::DynamicImage;
use tracing::{debug, trace};

use super::{locate_tool, RecognitionSettings, TextRecognizer};
use crate::error::OcrError;

/// Runs `tesseract <image> stdout` once per page.
#[derive(Debug, Clone)]
pub struct TesseractRecognizer {
    binary: PathBuf,
}

impl TesseractRecognizer {
    /// Use an explicit binary path, or search the usual install locations.
    pub fn locate(explicit: Option<&Path>) -> Self {
        let binary = locate_tool("tesseract", explicit);
        debug!("Using tesseract at {}", binary.display());
        Self { binary }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Whether the binary can be started at all.
    pub fn is_available(&self) -> bool {
        Command::new(&self.binary)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    fn command_args(image: &Path, settings: &RecognitionSettings) -> Vec<String> {
        vec![
            image.display().to_string(),
            "stdout".to_string(),
            "-l".to_string(),
            settings.language.clone(),
            "--oem".to_string(),
            settings.engine_mode.to_string(),
            "--psm".to_string(),
            settings.page_segmentation_mode.to_string(),
        ]
    }
}

impl Default for TesseractRecognizer {
    fn default() -> Self {
        Self::locate(None)
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn recognize_text(&self, image: &DynamicImage, settings: &RecognitionSettings) -> Result<String, OcrError> {
        let temp_dir = tempfile::tempdir()?;
        let image_path = temp_dir.path().join("page.png");
        image
            .save(&image_path)
            .map_err(|e| OcrError::InvalidImage(e.to_string()))?;

        let args = Self::command_args(&image_path, settings);
        trace!("Running {} {}", self.binary.display(), args.join(" "));

        let output = Command::new(&self.binary)
            .args(&args)
            .output()
            .map_err(|e| OcrError::ToolUnavailable {
                tool: self.binary.display().to_string(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Recognition(format!("tesseract failed: {}", stderr.trim())));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
