//! Document text sources and discovery.
//!
//! A [`TextSource`] turns one payslip file into raw text. The embedded text
//! layer is used when the PDF has one; scanned payslips go through `pdftoppm`
//! and `tesseract`. Sources may fail per document; callers record the
//! failure and carry on with the other documents.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tracing::{debug, info, warn};

use crate::error::{OcrError, PayrollError, Result};
use crate::models::config::{OcrConfig, PdfConfig};
use crate::pdf::{PdfExtractor, PdfProcessor, PdfType};

/// Trait for document-to-text backends.
pub trait TextSource: Send + Sync {
    /// Read the full text of a document, pages concatenated in order.
    fn read_text(&self, path: &Path) -> Result<String>;

    /// Name of this backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// Embedded PDF text layer.
#[derive(Debug, Default)]
pub struct EmbeddedTextSource;

impl EmbeddedTextSource {
    pub fn new() -> Self {
        Self
    }
}

impl TextSource for EmbeddedTextSource {
    fn read_text(&self, path: &Path) -> Result<String> {
        let data = fs::read(path)?;
        let mut extractor = PdfExtractor::new();
        extractor.load(&data)?;
        Ok(extractor.extract_text()?)
    }

    fn backend_name(&self) -> &str {
        "embedded"
    }
}

/// OCR through the `pdftoppm` and `tesseract` command-line tools.
#[derive(Debug, Clone)]
pub struct TesseractSource {
    config: OcrConfig,
}

impl TesseractSource {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    /// Check if both tools are available on the system.
    pub fn is_available(&self) -> bool {
        [&self.config.pdftoppm_command, &self.config.tesseract_command]
            .iter()
            .all(|cmd| {
                Command::new(cmd)
                    .arg("-v")
                    .output()
                    .map(|o| o.status.success() || !o.stderr.is_empty())
                    .unwrap_or(false)
            })
    }

    /// Rasterize every page to PNG files in `dir`, returned in page order.
    fn rasterize(&self, path: &Path, dir: &Path) -> Result<Vec<PathBuf>> {
        let prefix = dir.join("page");
        let output = run(
            Command::new(&self.config.pdftoppm_command)
                .arg("-r")
                .arg(self.config.render_dpi.to_string())
                .arg("-png")
                .arg(path)
                .arg(&prefix),
            &self.config.pdftoppm_command,
        )?;
        debug!("pdftoppm wrote {} bytes of diagnostics", output.stderr.len());

        let mut pages: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|e| e == "png"))
            .collect();
        // pdftoppm zero-pads page numbers, so names sort in page order
        pages.sort();

        if pages.is_empty() {
            return Err(OcrError::NoPages(path.to_path_buf()).into());
        }
        Ok(pages)
    }

    fn recognize(&self, image: &Path) -> Result<String> {
        let output = run(
            Command::new(&self.config.tesseract_command)
                .arg(image)
                .arg("stdout")
                .arg("--psm")
                .arg(self.config.page_segmentation_mode.to_string())
                .arg("-l")
                .arg(&self.config.language),
            &self.config.tesseract_command,
        )?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl TextSource for TesseractSource {
    fn read_text(&self, path: &Path) -> Result<String> {
        let tmpdir = tempfile::TempDir::with_prefix("busta")?;
        let pages = self.rasterize(path, tmpdir.path())?;

        info!("Running OCR on {} pages of {}", pages.len(), path.display());

        let mut text = String::new();
        for page in &pages {
            text.push_str(&self.recognize(page)?);
        }

        if text.trim().is_empty() {
            return Err(OcrError::NoText(path.to_path_buf()).into());
        }
        Ok(text)
    }

    fn backend_name(&self) -> &str {
        "tesseract"
    }
}

/// Embedded text when the PDF has enough of it, OCR otherwise.
pub struct AutoTextSource {
    pdf: PdfConfig,
    ocr: TesseractSource,
}

impl AutoTextSource {
    pub fn new(pdf: PdfConfig, ocr: OcrConfig) -> Self {
        Self {
            pdf,
            ocr: TesseractSource::new(ocr),
        }
    }
}

impl TextSource for AutoTextSource {
    fn read_text(&self, path: &Path) -> Result<String> {
        if self.pdf.prefer_embedded_text {
            let data = fs::read(path)?;
            let mut extractor = PdfExtractor::new().with_min_text_length(self.pdf.min_text_length);
            extractor.load(&data)?;
            debug!("{} has {} pages", path.display(), extractor.page_count());

            let text = extractor.extract_text().unwrap_or_else(|e| {
                warn!("No embedded text in {}: {}", path.display(), e);
                String::new()
            });

            match extractor.classify(&text) {
                PdfType::Text | PdfType::Hybrid => {
                    debug!("Using embedded text of {}", path.display());
                    return Ok(text);
                }
                pdf_type => debug!("{} is {:?}, running OCR", path.display(), pdf_type),
            }
        }

        self.ocr.read_text(path)
    }

    fn backend_name(&self) -> &str {
        "auto"
    }
}

/// Lazily list documents under `root` matching a glob `pattern` (e.g. `**/*.pdf`).
pub fn discover(root: &Path, pattern: &str) -> Result<impl Iterator<Item = PathBuf>> {
    let full = root.join(pattern);
    let full = full
        .to_str()
        .ok_or_else(|| PayrollError::Config(format!("non UTF-8 path: {}", full.display())))?;

    let paths = glob::glob(full).map_err(|e| PayrollError::Config(e.to_string()))?;
    Ok(paths.filter_map(|entry| match entry {
        Ok(path) if path.is_file() => Some(path),
        Ok(_) => None,
        Err(e) => {
            warn!("Skipping unreadable path: {}", e);
            None
        }
    }))
}

fn run(command: &mut Command, name: &str) -> Result<Output> {
    let output = command.output().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            PayrollError::from(OcrError::CommandNotFound(name.to_string()))
        } else {
            PayrollError::Io(e)
        }
    })?;

    if !output.status.success() {
        return Err(OcrError::CommandFailed {
            command: name.to_string(),
            code: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
        .into());
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_finds_nested_pdfs() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("2019/03")).unwrap();
        fs::write(dir.path().join("2019/03/busta.pdf"), b"%PDF").unwrap();
        fs::write(dir.path().join("top.pdf"), b"%PDF").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let mut found: Vec<PathBuf> = discover(dir.path(), "**/*.pdf").unwrap().collect();
        found.sort();

        assert_eq!(
            found,
            vec![dir.path().join("2019/03/busta.pdf"), dir.path().join("top.pdf")]
        );
    }

    #[test]
    fn test_embedded_source_rejects_non_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.pdf");
        fs::write(&path, b"not a pdf").unwrap();

        let err = EmbeddedTextSource::new().read_text(&path).unwrap_err();
        assert!(matches!(err, PayrollError::Pdf(_)));
    }

    #[test]
    fn test_missing_ocr_command() {
        let source = TesseractSource::new(OcrConfig {
            pdftoppm_command: "busta-no-such-rasterizer".to_string(),
            ..OcrConfig::default()
        });
        let err = source.read_text(Path::new("any.pdf")).unwrap_err();
        assert!(matches!(err, PayrollError::Ocr(OcrError::CommandNotFound(_))));
        assert!(!source.is_available());
    }
}
