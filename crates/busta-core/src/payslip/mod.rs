//! Payslip field extraction module.
//!
//! The regex heuristics live behind [`PayslipExtractor`] so a different
//! payslip template can swap them out without touching the record model or
//! the ledger.

mod parser;
pub mod rules;

pub use parser::{ExtractionResult, PayslipParser, RulePayslipParser};

use crate::error::ExtractionError;
use crate::models::payslip::PayslipRecord;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Trait for payslip extractors.
pub trait PayslipExtractor: Send + Sync {
    /// Build a record from the raw text of one payslip.
    ///
    /// Fails only when no pay period can be located.
    fn extract(&self, text: &str) -> Result<PayslipRecord>;
}
