//! Error types for the busta-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the busta library.
#[derive(Error, Debug)]
pub enum PayrollError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// OCR processing error.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// Payslip extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Ledger placement or grid error.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Errors raised by the external rasterizer and OCR tools.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The external command is not installed.
    #[error("{0} not found. Install poppler-utils and tesseract-ocr (with the language pack you configured)")]
    CommandNotFound(String),

    /// The external command exited with a failure status.
    #[error("{command} failed with exit code {code}: {stderr}")]
    CommandFailed {
        command: String,
        code: i32,
        stderr: String,
    },

    /// The rasterizer produced no page images.
    #[error("no pages rendered from {0}")]
    NoPages(PathBuf),

    /// OCR ran but produced no text.
    #[error("no text recognized in {0}")]
    NoText(PathBuf),
}

/// Errors related to payslip field extraction.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// No month name followed by a plausible year was found.
    #[error("pay period (month and year) not found")]
    PeriodNotFound,

    /// A captured token is not a decimal number.
    #[error("malformed number: {token:?}")]
    MalformedNumber { token: String },

    /// A configured code or marker could not be turned into a pattern.
    #[error("invalid pattern for {name}: {reason}")]
    InvalidPattern { name: String, reason: String },
}

/// Errors related to ledger placement and the ledger grid.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// The year lies before the first year of the ledger.
    #[error("year {year} is before the first ledger year {first_year}")]
    YearOutOfRange { year: i32, first_year: i32 },

    /// The file extension is not a supported ledger format.
    #[error("unsupported ledger format: {0}")]
    UnsupportedFormat(PathBuf),

    /// The spreadsheet could not be read.
    #[error("failed to load ledger from {path}: {reason}")]
    Load { path: PathBuf, reason: String },

    /// CSV reading or writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for the busta library.
pub type Result<T> = std::result::Result<T, PayrollError>;
