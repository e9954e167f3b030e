//! Attendances and vacancies from the leave summary.
//!
//! The leave summary follows a "Ferie anno" header and lists figures written
//! as `d,dd` or `dd,dd`. The first figure is the attendances, the third the
//! vacancies. The second figure is not used. Figures are matched anywhere,
//! so `160,00` reads as `60,00`.

use regex::Regex;
use rust_decimal::Decimal;
use tracing::warn;

use super::amounts::normalize;
use super::patterns::LEAVE_FIGURE;
use super::ExtractionMatch;
use crate::error::ExtractionError;

/// Figures read from the leave summary. Missing figures stay `None`.
#[derive(Debug, Clone, Default)]
pub struct LeaveSummary {
    /// First figure after the marker.
    pub attendances: Option<ExtractionMatch<Decimal>>,
    /// Third figure after the marker.
    pub vacancies: Option<ExtractionMatch<Decimal>>,
    /// Tokens that could not be normalized.
    pub warnings: Vec<String>,
}

/// Leave summary extractor.
pub struct LeaveSummaryExtractor {
    marker: Regex,
}

impl LeaveSummaryExtractor {
    pub fn new(marker: &str) -> Result<Self, ExtractionError> {
        let marker = Regex::new(&format!("(?i){}", regex::escape(marker))).map_err(|e| {
            ExtractionError::InvalidPattern {
                name: marker.to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self { marker })
    }

    /// Read the summary. Absence of the marker or of figures is not an error.
    pub fn extract(&self, text: &str) -> LeaveSummary {
        let mut summary = LeaveSummary::default();

        let Some(marker) = self.marker.find(text) else {
            return summary;
        };
        let rest = &text[marker.end()..];

        let figures: Vec<regex::Match<'_>> = LEAVE_FIGURE.find_iter(rest).take(3).collect();

        let mut read = |m: Option<&regex::Match<'_>>| {
            let m = m?;
            match normalize(m.as_str()) {
                Ok(value) => Some(
                    ExtractionMatch::new(value, m.as_str())
                        .with_position(marker.end() + m.start(), marker.end() + m.end()),
                ),
                Err(e) => {
                    warn!("Skipping leave summary figure: {}", e);
                    summary.warnings.push(e.to_string());
                    None
                }
            }
        };

        let attendances = read(figures.first());
        let vacancies = read(figures.get(2));
        summary.attendances = attendances;
        summary.vacancies = vacancies;

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn extractor() -> LeaveSummaryExtractor {
        LeaveSummaryExtractor::new("Ferie anno").unwrap()
    }

    #[test]
    fn test_first_and_third_figures() {
        let text = "Riepilogo\nFerie anno 2024 Residuo\n  10,00  99,99\n20,50 3,00";
        let summary = extractor().extract(text);

        assert_eq!(summary.attendances.unwrap().value, dec!(10.00));
        assert_eq!(summary.vacancies.unwrap().value, dec!(20.50));
        assert!(summary.warnings.is_empty());
    }

    #[test]
    fn test_three_digit_figure_keeps_its_slot() {
        let text = "Stipendio Maggio 2024\nFerie anno 2024\n160,00 10,00 99,99 20,50";
        let summary = extractor().extract(text);

        assert_eq!(summary.attendances.unwrap().value, dec!(60.00));
        assert_eq!(summary.vacancies.unwrap().value, dec!(99.99));
    }

    #[test]
    fn test_marker_is_case_insensitive() {
        let summary = extractor().extract("FERIE ANNO 1,50 2,00 3,25");
        assert_eq!(summary.attendances.unwrap().value, dec!(1.50));
        assert_eq!(summary.vacancies.unwrap().value, dec!(3.25));
    }

    #[test]
    fn test_figures_before_marker_are_ignored() {
        let summary = extractor().extract("5,00 6,00 7,00\nFerie anno 8,00");
        assert_eq!(summary.attendances.unwrap().value, dec!(8.00));
        assert!(summary.vacancies.is_none());
    }

    #[test]
    fn test_two_figures_only() {
        let summary = extractor().extract("Ferie anno 12,00 4,00");
        assert_eq!(summary.attendances.unwrap().value, dec!(12.00));
        assert!(summary.vacancies.is_none());
    }

    #[test]
    fn test_missing_marker() {
        let summary = extractor().extract("10,00 99,99 20,50");
        assert!(summary.attendances.is_none());
        assert!(summary.vacancies.is_none());
    }

    #[test]
    fn test_position_is_absolute() {
        let text = "Ferie anno 10,00";
        let found = extractor().extract(text).attendances.unwrap();
        assert_eq!(found.position, Some((11, 16)));
        assert_eq!(found.source, "10,00");
    }
}
