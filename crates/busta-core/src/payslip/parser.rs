//! Rule-based payslip parser.

use std::borrow::Cow;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::models::config::PayrollConfig;
use crate::models::payslip::PayslipRecord;
use crate::models::profile::{ATTENDANCES, VACANCIES};

use super::rules::{
    amounts::normalize, CodeMatcher, CodeShape, FieldExtractor, LeaveSummaryExtractor,
    PeriodExtractor,
};
use super::{PayslipExtractor, Result};
use crate::error::ExtractionError;

/// Result of payslip extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted record, derivates not yet computed.
    pub record: PayslipRecord,
    /// Text the period was read from.
    pub period_source: String,
    /// Skipped tokens and other non-fatal issues.
    pub warnings: Vec<String>,
    /// Number of code lines that contributed to the record.
    pub matched_lines: usize,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Trait for payslip parsing with diagnostics.
pub trait PayslipParser: Send + Sync {
    /// Parse a payslip from text.
    fn parse(&self, text: &str) -> Result<ExtractionResult>;
}

/// Payslip parser built from configuration.
///
/// All patterns are compiled once here; parsing is then a pure function of
/// the input text, so one parser can be shared across worker threads.
pub struct RulePayslipParser {
    period: PeriodExtractor,
    leave: LeaveSummaryExtractor,
    codes: Vec<CodeMatcher>,
}

impl RulePayslipParser {
    /// Build a parser for the configured period rules and profile.
    pub fn new(config: &PayrollConfig) -> Result<Self> {
        let profile = &config.profile;

        let codes = profile
            .codes
            .iter()
            .map(|code| {
                let shape = if profile.is_ticket_code(code) {
                    CodeShape::FirstAfterCode
                } else {
                    CodeShape::LastOnLine
                };
                CodeMatcher::new(code, shape)
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Built payslip parser for profile '{}' with {} codes",
            profile.name,
            codes.len()
        );

        Ok(Self {
            period: PeriodExtractor::new(&config.extraction)?,
            leave: LeaveSummaryExtractor::new(&config.extraction.leave_marker)?,
            codes,
        })
    }
}

impl PayslipParser for RulePayslipParser {
    fn parse(&self, text: &str) -> Result<ExtractionResult> {
        let start = Instant::now();
        let mut warnings = Vec::new();

        let text: Cow<'_, str> = if text.contains('\r') {
            Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
        } else {
            Cow::Borrowed(text)
        };

        info!("Parsing payslip from {} characters of text", text.len());

        let period = self
            .period
            .extract(&text)
            .ok_or(ExtractionError::PeriodNotFound)?;
        debug!("Found period {} in {:?}", period.value, period.source);

        let mut record = PayslipRecord::new(period.value);

        let leave = self.leave.extract(&text);
        warnings.extend(leave.warnings);
        if let Some(attendances) = leave.attendances {
            record.accumulate(ATTENDANCES, attendances.value);
        } else {
            debug!("No attendances figure found");
        }
        if let Some(vacancies) = leave.vacancies {
            record.accumulate(VACANCIES, vacancies.value);
        } else {
            debug!("No vacancies figure found");
        }

        let mut matched_lines = 0;
        for matcher in &self.codes {
            for token in matcher.extract_all(&text) {
                match normalize(&token.value) {
                    Ok(value) => {
                        record.accumulate(matcher.code(), value);
                        matched_lines += 1;
                    }
                    Err(e) => {
                        warn!("Skipping value of code {}: {}", matcher.code(), e);
                        warnings.push(format!("code {}: {}", matcher.code(), e));
                    }
                }
            }
        }

        debug!(
            "Extracted {} elements from {} code lines for {}",
            record.elements().len(),
            matched_lines,
            record.period()
        );

        Ok(ExtractionResult {
            record,
            period_source: period.source,
            warnings,
            matched_lines,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}

impl PayslipExtractor for RulePayslipParser {
    fn extract(&self, text: &str) -> Result<PayslipRecord> {
        self.parse(text).map(|r| r.record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Month;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::models::period::PayPeriod;
    use crate::models::profile::{HOLIDAYS, TICKETS};
    use crate::models::tickets::TicketValuePolicy;

    const PAYSLIP: &str = "\
AZIENDA SANITARIA LOCALE
Cedolino Stipendio Ottobre
2023 Matricola 004512
Codice Descrizione Quantita Importo
0131 Retribuzione tabellare 1.850,00 1850,00
0200 Ferie godute 8,00 64,00
0293 Buoni pasto 20 7,00 0,00
0352 Festivita soppresse 2,00 16,00
0421 Indennita di esclusivita 410,24
0200 Ferie godute 4,00 32,00
Ferie anno 2023
Spettanti Godute Residue
  18,00 12,00 6,00
";

    fn parser() -> RulePayslipParser {
        let mut config = PayrollConfig::default();
        config.extraction.max_year = Some(2025);
        RulePayslipParser::new(&config).unwrap()
    }

    #[test]
    fn test_parse_full_payslip() {
        let result = parser().parse(PAYSLIP).unwrap();
        let record = &result.record;

        assert_eq!(record.period(), PayPeriod::new(2023, Month::October));
        assert_eq!(record.value_of("0131"), dec!(1850.00));
        assert_eq!(record.value_of("0200"), dec!(96.00));
        assert_eq!(record.value_of("0293"), dec!(20));
        assert_eq!(record.value_of("0352"), dec!(16.00));
        assert_eq!(record.value_of("0421"), dec!(410.24));
        assert_eq!(record.value_of(ATTENDANCES), dec!(18.00));
        assert_eq!(record.value_of(VACANCIES), dec!(6.00));
        assert_eq!(result.matched_lines, 6);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_derivates_are_not_computed() {
        let record = parser().extract(PAYSLIP).unwrap();
        assert!(!record.contains(HOLIDAYS));
        assert!(!record.contains(TICKETS));
    }

    #[test]
    fn test_derivates_after_extraction() {
        let config = PayrollConfig::default();
        let mut record = parser().extract(PAYSLIP).unwrap();
        record.compute_derivates(&config.profile, &TicketValuePolicy::default());

        assert_eq!(record.value_of(HOLIDAYS), dec!(112.00));
        assert_eq!(record.value_of(TICKETS), dec!(210.00));
    }

    #[test]
    fn test_missing_period_fails() {
        let err = parser()
            .extract("0131 Retribuzione 1850,00\nFerie anno 2024 10,00")
            .unwrap_err();
        assert!(matches!(err, ExtractionError::PeriodNotFound));
    }

    #[test]
    fn test_missing_signals_degrade_to_zero() {
        let record = parser().extract("Stipendio Gennaio 2015").unwrap();

        assert_eq!(record.period(), PayPeriod::new(2015, Month::January));
        assert!(record.elements().is_empty());
        assert_eq!(record.value_of(ATTENDANCES), Decimal::ZERO);
        assert_eq!(record.value_of("0131"), Decimal::ZERO);
    }

    #[test]
    fn test_leave_summary_discards_second_figure() {
        let text = "Stipendio Maggio 2024\nFerie anno 2024\nGiorni\n10,00\n99,99\n20,50";
        let record = parser().extract(text).unwrap();

        assert_eq!(record.value_of(ATTENDANCES), dec!(10.00));
        assert_eq!(record.value_of(VACANCIES), dec!(20.50));
    }

    #[test]
    fn test_crlf_text() {
        let text = "Stipendio Marzo 2012\r\n0457 Contributo 12,50\r\n0457 Contributo 2,50\r\n";
        let record = parser().extract(text).unwrap();
        assert_eq!(record.value_of("0457"), dec!(15.00));
    }

    #[test]
    fn test_unknown_codes_are_ignored() {
        let text = "Stipendio Marzo 2012\n9999 Sconosciuto 12,50";
        let record = parser().extract(text).unwrap();
        assert!(record.elements().is_empty());
    }
}
