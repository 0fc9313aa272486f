//! Page rendering through poppler's `pdftoppm`.

use std::path::{Path, PathBuf};
use std::process::Command;

use image::DynamicImage;
use tracing::{debug, trace};

use super::{locate_tool, Rasterizer};
use crate::error::OcrError;
use crate::pdf::StatementDocument;

/// Renders pages with `pdftoppm -png -r <dpi>` into a temporary directory.
#[derive(Debug, Clone)]
pub struct PdftoppmRasterizer {
    binary: PathBuf,
}

impl PdftoppmRasterizer {
    /// Use an explicit binary path, or search the usual install locations.
    pub fn locate(explicit: Option<&Path>) -> Self {
        let binary = locate_tool("pdftoppm", explicit);
        debug!("Using pdftoppm at {}", binary.display());
        Self { binary }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl Default for PdftoppmRasterizer {
    fn default() -> Self {
        Self::locate(None)
    }
}

impl Rasterizer for PdftoppmRasterizer {
    fn rasterize(&self, document: &StatementDocument, dpi: u32) -> Result<Vec<DynamicImage>, OcrError> {
        let temp_dir = tempfile::tempdir()?;

        let input = match document.path() {
            Some(path) => path.to_path_buf(),
            None => {
                let path = temp_dir.path().join("input.pdf");
                std::fs::write(&path, document.data())?;
                path
            }
        };
        let output_prefix = temp_dir.path().join("page");

        trace!("Running {} -png -r {} {}", self.binary.display(), dpi, input.display());
        let output = Command::new(&self.binary)
            .arg("-png")
            .arg("-r")
            .arg(dpi.to_string())
            .arg(&input)
            .arg(&output_prefix)
            .output()
            .map_err(|e| OcrError::ToolUnavailable {
                tool: self.binary.display().to_string(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::Rasterize(format!("pdftoppm failed: {}", stderr.trim())));
        }

        let mut rendered: Vec<(u32, PathBuf)> = std::fs::read_dir(temp_dir.path())?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter_map(|path| page_index(&path).map(|n| (n, path)))
            .collect();
        rendered.sort_by_key(|(n, _)| *n);

        debug!("pdftoppm rendered {} pages", rendered.len());

        rendered
            .into_iter()
            .map(|(_, path)| image::open(&path).map_err(|e| OcrError::InvalidImage(e.to_string())))
            .collect()
    }
}

/// Page number from a `page-<n>.png` file name. pdftoppm zero-pads `<n>` to
/// the width of the page count, so names do not sort numerically as strings.
fn page_index(path: &Path) -> Option<u32> {
    if path.extension()? != "png" {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    stem.strip_prefix("page-")?.parse().ok()
}
