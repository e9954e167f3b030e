//! Pay-element code lines.
//!
//! Each pay element is printed on its own line starting with its code. The
//! payslip template puts the authoritative figure at the end of the line,
//! except for meal tickets whose quantity sits mid-line before an unrelated
//! trailing figure.

use regex::Regex;

use super::patterns::NUMBER;
use super::{ExtractionMatch, FieldExtractor};
use crate::error::ExtractionError;

/// Where the value sits on a code line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeShape {
    /// First number after the code, separated by spaces (ticket quantities).
    FirstAfterCode,
    /// Last number on the line.
    LastOnLine,
}

/// Line-anchored matcher for one pay-element code.
#[derive(Debug, Clone)]
pub struct CodeMatcher {
    code: String,
    pattern: Regex,
}

impl CodeMatcher {
    pub fn new(code: &str, shape: CodeShape) -> Result<Self, ExtractionError> {
        let code_pattern = regex::escape(code);
        let pattern = match shape {
            CodeShape::FirstAfterCode => {
                format!(r"(?m)^[ \t]*{code_pattern}\b.*?[ \t]({NUMBER})")
            }
            CodeShape::LastOnLine => {
                format!(r"(?m)^[ \t]*{code_pattern}\b.*?({NUMBER})[ \t]*$")
            }
        };

        let pattern = Regex::new(&pattern).map_err(|e| ExtractionError::InvalidPattern {
            name: code.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            code: code.to_string(),
            pattern,
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }
}

impl FieldExtractor for CodeMatcher {
    /// Raw numeric token; normalization is left to the caller.
    type Output = ExtractionMatch<String>;

    fn extract(&self, text: &str) -> Option<Self::Output> {
        self.extract_all(text).into_iter().next()
    }

    fn extract_all(&self, text: &str) -> Vec<Self::Output> {
        self.pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| {
                ExtractionMatch::new(m.as_str().to_string(), m.as_str())
                    .with_position(m.start(), m.end())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tokens(matcher: &CodeMatcher, text: &str) -> Vec<String> {
        matcher.extract_all(text).into_iter().map(|m| m.value).collect()
    }

    #[test]
    fn test_last_number_on_line() {
        let m = CodeMatcher::new("0131", CodeShape::LastOnLine).unwrap();
        assert_eq!(tokens(&m, "0131 Straordinario 15% 4,00 12,5 52,30"), vec!["52,30"]);
    }

    #[test]
    fn test_last_number_tolerates_trailing_spaces() {
        let m = CodeMatcher::new("0421", CodeShape::LastOnLine).unwrap();
        assert_eq!(tokens(&m, "0421 Indennita 18.75   \n"), vec!["18.75"]);
    }

    #[test]
    fn test_first_number_after_code() {
        let m = CodeMatcher::new("0293", CodeShape::FirstAfterCode).unwrap();
        assert_eq!(tokens(&m, "0293 Buoni pasto 20,00 7,00 140,00"), vec!["20,00"]);
    }

    #[test]
    fn test_first_number_needs_whitespace_before() {
        let m = CodeMatcher::new("0299", CodeShape::FirstAfterCode).unwrap();
        assert_eq!(tokens(&m, "0299 Ticket-E2 elettr. 18 1,00"), vec!["18"]);
    }

    #[test]
    fn test_first_number_stays_on_line() {
        let m = CodeMatcher::new("0293", CodeShape::FirstAfterCode).unwrap();
        assert!(tokens(&m, "0293 Buoni pasto\n20,00").is_empty());
    }

    #[test]
    fn test_code_must_start_the_line() {
        let m = CodeMatcher::new("0200", CodeShape::LastOnLine).unwrap();
        assert!(tokens(&m, "Rif. 0200 Ferie 8,00").is_empty());
        assert!(tokens(&m, "02001 Altro 8,00").is_empty());
        assert_eq!(tokens(&m, "   0200 Ferie 8,00"), vec!["8,00"]);
    }

    #[test]
    fn test_every_line_matches() {
        let m = CodeMatcher::new("0200", CodeShape::LastOnLine).unwrap();
        let text = "0200 Ferie 8,00\n0131 Altro 1,00\n0200 Ferie 4,00";
        assert_eq!(tokens(&m, text), vec!["8,00", "4,00"]);
    }

    #[test]
    fn test_line_without_number() {
        let m = CodeMatcher::new("0457", CodeShape::LastOnLine).unwrap();
        assert!(m.extract("0457 Trattenuta sindacale").is_none());
    }
}
