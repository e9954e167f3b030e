//! Core library for compiling payslips into a multi-year ledger.
//!
//! This crate provides:
//! - Document text sources (embedded PDF text, `pdftoppm` + `tesseract` OCR)
//! - Payslip field extraction (pay period, leave summary, pay codes)
//! - Payslip records with derived holidays and meal-ticket values
//! - Ledger placement into one block of rows per year
//! - Batch bookkeeping with per-document failure isolation

pub mod batch;
pub mod error;
pub mod ledger;
pub mod models;
pub mod payslip;
pub mod pdf;
pub mod source;

pub use batch::{extract_document, ApplySummary, BatchReport};
pub use error::{PayrollError, Result};
pub use ledger::{cell_for, place_record, Grid, LedgerLayout, LedgerSink};
pub use models::{PayPeriod, PayrollConfig, PayslipRecord, Profile, TicketValuePolicy};
pub use payslip::{ExtractionResult, PayslipExtractor, PayslipParser, RulePayslipParser};
pub use pdf::{PdfProcessor, PdfType};
pub use source::{discover, AutoTextSource, EmbeddedTextSource, TesseractSource, TextSource};
