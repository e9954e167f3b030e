//! Configuration structures for the payslip pipeline.

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::error::{PayrollError, Result};
use crate::ledger::LedgerLayout;

use super::profile::Profile;
use super::tickets::TicketValuePolicy;

/// Main configuration for the busta pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PayrollConfig {
    /// Payslip text extraction configuration.
    pub extraction: ExtractionConfig,

    /// Tracked pay elements and code classification.
    pub profile: Profile,

    /// Ticket unit value bands.
    pub tickets: TicketValuePolicy,

    /// Ledger layout configuration.
    pub ledger: LedgerConfig,

    /// External OCR tools configuration.
    pub ocr: OcrConfig,

    /// PDF processing configuration.
    pub pdf: PdfConfig,
}

/// Payslip extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// First year a payslip can belong to; also the first ledger block.
    pub first_year: i32,

    /// Last plausible year (default: the current year).
    pub max_year: Option<i32>,

    /// Month names, January first, as printed on the payslip.
    pub month_names: Vec<String>,

    /// Phrase preceding the period in the payslip header.
    pub period_anchor: Option<String>,

    /// Maximum characters between the month name and the year.
    pub period_window: usize,

    /// Marker of the leave summary holding attendances and vacancies.
    pub leave_marker: String,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            first_year: 2007,
            max_year: None,
            month_names: [
                "Gennaio",
                "Febbraio",
                "Marzo",
                "Aprile",
                "Maggio",
                "Giugno",
                "Luglio",
                "Agosto",
                "Settembre",
                "Ottobre",
                "Novembre",
                "Dicembre",
            ]
            .iter()
            .map(|m| m.to_string())
            .collect(),
            period_anchor: Some("Stipendio".to_string()),
            period_window: 40,
            leave_marker: "Ferie anno".to_string(),
        }
    }
}

impl ExtractionConfig {
    /// Upper bound for period years.
    pub fn year_ceiling(&self) -> i32 {
        self.max_year
            .unwrap_or_else(|| chrono::Local::now().year())
    }
}

/// Ledger layout configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Row of the first element of the first year block.
    pub base_row: u32,

    /// Column preceding January (January lands at `base_column + 1`).
    pub base_column: u32,

    /// Empty rows after each year block, reserved for print layout.
    pub block_spacing: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            base_row: 5,
            base_column: 8,
            block_spacing: 7,
        }
    }
}

/// External OCR tools configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// DPI for rasterizing PDF pages.
    pub render_dpi: u32,

    /// Tesseract language code.
    pub language: String,

    /// Tesseract page segmentation mode.
    pub page_segmentation_mode: u8,

    /// Rasterizer command (poppler's pdftoppm).
    pub pdftoppm_command: String,

    /// OCR command.
    pub tesseract_command: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            render_dpi: 300,
            language: "ita".to_string(),
            page_segmentation_mode: 4,
            pdftoppm_command: "pdftoppm".to_string(),
            tesseract_command: "tesseract".to_string(),
        }
    }
}

/// PDF processing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Try to extract embedded text before falling back to OCR.
    pub prefer_embedded_text: bool,

    /// Minimum text length to consider PDF as text-based.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            prefer_embedded_text: true,
            min_text_length: 50,
        }
    }
}

impl PayrollConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| PayrollError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| PayrollError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check the configuration before building a parser from it.
    pub fn validate(&self) -> Result<()> {
        if self.extraction.month_names.len() != 12 {
            return Err(PayrollError::Config(format!(
                "expected 12 month names, found {}",
                self.extraction.month_names.len()
            )));
        }

        if self.extraction.year_ceiling() < self.extraction.first_year {
            return Err(PayrollError::Config(format!(
                "max_year {} is before first_year {}",
                self.extraction.year_ceiling(),
                self.extraction.first_year
            )));
        }

        self.profile.validate()
    }

    /// Ledger layout for the configured profile.
    pub fn layout(&self) -> LedgerLayout {
        LedgerLayout {
            base_row: self.ledger.base_row,
            base_column: self.ledger.base_column,
            first_year: self.extraction.first_year,
            block_spacing: self.ledger.block_spacing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = PayrollConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.layout().elements_per_block(&config.profile), 14);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: PayrollConfig =
            serde_json::from_str(r#"{"extraction": {"first_year": 2010}}"#).unwrap();

        assert_eq!(config.extraction.first_year, 2010);
        assert_eq!(config.extraction.leave_marker, "Ferie anno");
        assert_eq!(config.profile.name, "standard");
        assert_eq!(config.ledger.base_row, 5);
    }

    #[test]
    fn test_wrong_month_count_is_rejected() {
        let mut config = PayrollConfig::default();
        config.extraction.month_names.pop();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ceiling_before_first_year_is_rejected() {
        let mut config = PayrollConfig::default();
        config.extraction.max_year = Some(2000);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = PayrollConfig::default();
        config.ocr.language = "eng".to_string();
        config.save(&path).unwrap();

        let loaded = PayrollConfig::from_file(&path).unwrap();
        assert_eq!(loaded.ocr.language, "eng");
        assert_eq!(loaded.tickets, config.tickets);
    }
}
