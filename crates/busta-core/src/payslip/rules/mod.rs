//! Rule-based field extractors for payslip text.

pub mod amounts;
pub mod attendance;
pub mod codes;
pub mod patterns;
pub mod period;

pub use amounts::{format_amount, normalize};
pub use attendance::{LeaveSummary, LeaveSummaryExtractor};
pub use codes::{CodeMatcher, CodeShape};
pub use period::PeriodExtractor;

/// Trait for field extractors.
pub trait FieldExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract the field from text.
    fn extract(&self, text: &str) -> Option<Self::Output>;

    /// Extract all occurrences of the field.
    fn extract_all(&self, text: &str) -> Vec<Self::Output>;
}

/// A value found in the text, with where it was found.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionMatch<T> {
    /// Extracted value.
    pub value: T,
    /// Byte range in source text.
    pub position: Option<(usize, usize)>,
    /// Source text that was matched.
    pub source: String,
}

impl<T> ExtractionMatch<T> {
    pub fn new(value: T, source: impl Into<String>) -> Self {
        Self {
            value,
            position: None,
            source: source.into(),
        }
    }

    pub fn with_position(mut self, start: usize, end: usize) -> Self {
        self.position = Some((start, end));
        self
    }

    /// Shift the recorded position, for matches found in a slice of the text.
    pub fn offset(mut self, by: usize) -> Self {
        self.position = self.position.map(|(s, e)| (s + by, e + by));
        self
    }
}
