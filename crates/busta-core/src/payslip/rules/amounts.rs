//! Numeric normalization for payslip figures.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::DECIMAL_TOKEN;
use crate::error::ExtractionError;
use crate::models::payslip::round_amount;

/// Parse a payslip number written with a decimal comma or dot ("12,34", "12.34").
///
/// Thousands separators are not supported; payslip figures are small amounts
/// and hour counts.
pub fn normalize(raw: &str) -> Result<Decimal, ExtractionError> {
    let trimmed = raw.trim();
    let malformed = || ExtractionError::MalformedNumber {
        token: raw.to_string(),
    };

    if !DECIMAL_TOKEN.is_match(trimmed) {
        return Err(malformed());
    }

    Decimal::from_str(&trimmed.replace(',', ".")).map_err(|_| malformed())
}

/// Format an amount with two decimals and a decimal comma ("1234,50").
pub fn format_amount(amount: Decimal) -> String {
    format!("{:.2}", round_amount(amount)).replace('.', ",")
}
