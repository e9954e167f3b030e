//! Pay period (year and month) covered by a payslip.

use std::cmp::Ordering;
use std::fmt;

use chrono::Month;
use serde::{Deserialize, Serialize};

/// The (year, month) a payslip covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayPeriod {
    /// Calendar year.
    pub year: i32,
    /// Calendar month.
    pub month: Month,
}

impl PayPeriod {
    pub fn new(year: i32, month: Month) -> Self {
        Self { year, month }
    }

    /// Month number, January = 1 … December = 12.
    pub fn month_number(&self) -> u32 {
        self.month.number_from_month()
    }

    fn key(&self) -> (i32, u32) {
        (self.year, self.month_number())
    }
}

impl PartialOrd for PayPeriod {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PayPeriod {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl fmt::Display for PayPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month.name(), self.year)
    }
}
