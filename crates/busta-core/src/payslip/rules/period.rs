//! Pay period detection: a month name followed closely by a year.

use chrono::Month;
use regex::Regex;

use super::patterns::YEAR;
use super::{ExtractionMatch, FieldExtractor};
use crate::error::ExtractionError;
use crate::models::config::ExtractionConfig;
use crate::models::period::PayPeriod;

/// Finds the pay period of a payslip.
///
/// A candidate is a whole-word month name (case-insensitive) followed, within
/// `window` characters including line breaks, by a 4-digit year in
/// `first_year..=max_year`. When the anchor phrase is present the search
/// starts there; otherwise the first candidate in the text wins.
pub struct PeriodExtractor {
    month_pattern: Regex,
    months: Vec<(String, Month)>,
    anchor: Option<Regex>,
    window: usize,
    first_year: i32,
    max_year: i32,
}

impl PeriodExtractor {
    pub fn new(config: &ExtractionConfig) -> Result<Self, ExtractionError> {
        let mut months = Vec::with_capacity(12);
        for (i, name) in config.month_names.iter().enumerate() {
            let month = u8::try_from(i + 1)
                .ok()
                .and_then(|n| Month::try_from(n).ok())
                .ok_or_else(|| ExtractionError::InvalidPattern {
                    name: name.clone(),
                    reason: "more than 12 month names".to_string(),
                })?;
            months.push((name.to_lowercase(), month));
        }

        let alternation = config
            .month_names
            .iter()
            .map(|m| regex::escape(m))
            .collect::<Vec<_>>()
            .join("|");
        let month_pattern = compile("month names", &format!(r"(?i)\b(?:{})\b", alternation))?;

        let anchor = config
            .period_anchor
            .as_deref()
            .filter(|a| !a.trim().is_empty())
            .map(|a| compile("period anchor", &format!("(?i){}", regex::escape(a))))
            .transpose()?;

        Ok(Self {
            month_pattern,
            months,
            anchor,
            window: config.period_window,
            first_year: config.first_year,
            max_year: config.year_ceiling(),
        })
    }

    fn month_named(&self, name: &str) -> Option<Month> {
        let name = name.to_lowercase();
        self.months
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, m)| *m)
    }

    /// First plausible year starting within the window after `from`.
    fn year_after<'t>(&self, text: &'t str, from: usize) -> Option<regex::Match<'t>> {
        let rest = &text[from..];
        // Only the start must fall inside the window, the digits may run past it
        let limit = rest
            .char_indices()
            .nth(self.window)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());

        YEAR.captures_iter(rest)
            .filter_map(|caps| caps.get(1))
            .take_while(|m| m.start() <= limit)
            .find(|m| {
                m.as_str()
                    .parse::<i32>()
                    .map(|y| (self.first_year..=self.max_year).contains(&y))
                    .unwrap_or(false)
            })
    }
}

impl FieldExtractor for PeriodExtractor {
    type Output = ExtractionMatch<PayPeriod>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        if let Some(anchor) = self.anchor.as_ref().and_then(|a| a.find(text)) {
            let start = anchor.start();
            if let Some(found) = self.extract_all(&text[start..]).into_iter().next() {
                return Some(found.offset(start));
            }
        }

        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        let mut results = Vec::new();

        for month_match in self.month_pattern.find_iter(text) {
            let Some(month) = self.month_named(month_match.as_str()) else {
                continue;
            };
            let Some(year_match) = self.year_after(text, month_match.end()) else {
                continue;
            };

            // YEAR only matches ASCII digits, so this parse cannot fail.
            let year: i32 = year_match.as_str().parse().unwrap_or_default();
            let start = month_match.start();
            let end = month_match.end() + year_match.end();

            results.push(
                ExtractionMatch::new(PayPeriod::new(year, month), &text[start..end])
                    .with_position(start, end),
            );
        }

        results
    }
}

fn compile(name: &str, pattern: &str) -> Result<Regex, ExtractionError> {
    Regex::new(pattern).map_err(|e| ExtractionError::InvalidPattern {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn extractor() -> PeriodExtractor {
        let config = ExtractionConfig {
            max_year: Some(2025),
            ..ExtractionConfig::default()
        };
        PeriodExtractor::new(&config).unwrap()
    }

    #[test]
    fn test_month_followed_by_year() {
        let found = extractor().extract("Stipendio Marzo 2009").unwrap();
        assert_eq!(found.value, PayPeriod::new(2009, Month::March));
        assert_eq!(found.source, "Marzo 2009");
    }

    #[test]
    fn test_case_insensitive_across_lines() {
        let found = extractor()
            .extract("CEDOLINO\nmese di OTTOBRE\n  \n2023\nMatricola 1234")
            .unwrap();
        assert_eq!(found.value, PayPeriod::new(2023, Month::October));
    }

    #[test]
    fn test_year_out_of_range_is_skipped() {
        let found = extractor()
            .extract("Giugno 1999 rif. 2019")
            .unwrap();
        assert_eq!(found.value, PayPeriod::new(2019, Month::June));
    }

    #[test]
    fn test_year_beyond_window_is_ignored() {
        let text = format!("Luglio{}2015", " ".repeat(60));
        assert!(extractor().extract(&text).is_none());
    }

    #[test]
    fn test_year_at_window_edge() {
        let text = format!("Luglio{}2015", " ".repeat(40));
        let found = extractor().extract(&text).unwrap();
        assert_eq!(found.value, PayPeriod::new(2015, Month::July));
    }

    #[test]
    fn test_longer_number_at_window_edge_is_not_a_year() {
        let text = format!("Luglio{}201512", " ".repeat(40));
        assert!(extractor().extract(&text).is_none());
    }

    #[test]
    fn test_month_inside_word_is_ignored() {
        assert!(extractor().extract("Marzolino 2010").is_none());
    }

    #[test]
    fn test_anchor_takes_precedence() {
        let text = "Assunto il 1 Marzo 2008\nStipendio Novembre 2016";
        let found = extractor().extract(text).unwrap();
        assert_eq!(found.value, PayPeriod::new(2016, Month::November));
        assert_eq!(found.position, Some((text.find("Novembre").unwrap(), text.len())));
    }

    #[test]
    fn test_first_match_without_anchor() {
        let text = "Assunto il 1 Marzo 2008\nPeriodo Novembre 2016";
        let found = extractor().extract(text).unwrap();
        assert_eq!(found.value, PayPeriod::new(2008, Month::March));
    }

    #[test]
    fn test_anchor_without_period_falls_back() {
        let text = "Periodo Aprile 2012\nStipendio base";
        let found = extractor().extract(text).unwrap();
        assert_eq!(found.value, PayPeriod::new(2012, Month::April));
    }

    #[test]
    fn test_no_period() {
        assert!(extractor().extract("Ferie anno 2024 10,00").is_none());
    }

    #[test]
    fn test_extract_all_candidates() {
        let all = extractor().extract_all("Gennaio 2010 / Febbraio 2011 / Maggio");
        let periods: Vec<PayPeriod> = all.into_iter().map(|m| m.value).collect();
        assert_eq!(
            periods,
            vec![
                PayPeriod::new(2010, Month::January),
                PayPeriod::new(2011, Month::February),
            ]
        );
    }
}
