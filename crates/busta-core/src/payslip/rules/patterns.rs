//! Common regex patterns for payslip extraction.
//!
//! Patterns that depend on configuration (month names, codes, markers) are
//! compiled when the parser is built.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Decimal token, comma or dot separator, optional sign
    pub static ref DECIMAL_TOKEN: Regex = Regex::new(
        r"^-?\d+(?:[.,]\d+)?$"
    ).unwrap();

    // Leave summary figure: "10,00"
    pub static ref LEAVE_FIGURE: Regex = Regex::new(
        r"\d{1,2},\d{2}"
    ).unwrap();

    // Candidate year
    pub static ref YEAR: Regex = Regex::new(
        r"\b(\d{4})\b"
    ).unwrap();
}

/// Numeric token as it appears after a pay-element code.
pub const NUMBER: &str = r"\d+(?:[.,]\d+)?";
